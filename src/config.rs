use std::path::PathBuf;

use crate::effects::EffectKind;
use crate::error::{NewsreelError, NewsreelResult};
use crate::transitions::TransitionKind;

/// TTS voice selection. Defaults mirror the Spanish news narration the tool
/// was originally built for.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VoiceConfig {
    pub language_code: String,
    pub name: String,
    pub gender: VoiceGender,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            language_code: "es-US".to_string(),
            name: "es-US-Polyglot-1".to_string(),
            gender: VoiceGender::Male,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
}

impl VoiceGender {
    pub fn api_name(self) -> &'static str {
        match self {
            VoiceGender::Male => "MALE",
            VoiceGender::Female => "FEMALE",
            VoiceGender::Neutral => "NEUTRAL",
        }
    }
}

/// Output canvas and frame rate handed to the encoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputProfile {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for OutputProfile {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fps: 30,
        }
    }
}

impl OutputProfile {
    pub fn validate(&self) -> NewsreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(NewsreelError::validation(
                "output width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // We target yuv420p mp4 output for maximum player compatibility.
            return Err(NewsreelError::validation(
                "output width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if self.fps == 0 {
            return Err(NewsreelError::validation("output fps must be non-zero"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionConfig {
    pub kind: TransitionKind,
    pub duration_secs: f64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            kind: TransitionKind::CircleOpen,
            duration_secs: 1.0,
        }
    }
}

impl TransitionConfig {
    pub fn validate(&self) -> NewsreelResult<()> {
        if !self.duration_secs.is_finite() || self.duration_secs < 0.0 {
            return Err(NewsreelError::validation(
                "transition duration must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Per-run settings. Passed into the orchestrator at construction so
/// independent runs with different settings can coexist; nothing here is
/// process-global.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub voice: VoiceConfig,
    /// Instructions prepended to the article text for the summarizer.
    pub summary_prompt: String,
    pub output: OutputProfile,
    /// Directory for the narration audio, subtitle file, and encoder
    /// intermediates of one run.
    pub workdir: PathBuf,
    /// Slots shorter than this are rejected as flicker.
    pub min_slot_secs: f64,
    /// Maximum caption length when grouping word timings.
    pub caption_bin_secs: f64,
    /// Effect assignment cycle, applied round-robin over slot indices.
    pub effect_cycle: Vec<EffectKind>,
    pub transition: TransitionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            summary_prompt: default_summary_prompt(),
            output: OutputProfile::default(),
            workdir: PathBuf::from("."),
            min_slot_secs: 0.5,
            caption_bin_secs: 3.0,
            effect_cycle: vec![EffectKind::Zoom, EffectKind::Pan],
            transition: TransitionConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> NewsreelResult<()> {
        if self.summary_prompt.trim().is_empty() {
            return Err(NewsreelError::validation("summary prompt must be non-empty"));
        }
        if !self.min_slot_secs.is_finite() || self.min_slot_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "min_slot_secs must be finite and > 0",
            ));
        }
        if !self.caption_bin_secs.is_finite() || self.caption_bin_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "caption_bin_secs must be finite and > 0",
            ));
        }
        if self.effect_cycle.is_empty() {
            return Err(NewsreelError::validation("effect cycle must be non-empty"));
        }
        self.output.validate()?;
        self.transition.validate()?;
        Ok(())
    }
}

pub fn default_summary_prompt() -> String {
    concat!(
        "Write a summary of the following article, under these constraints: ",
        "1. The summary must contain between 400 and 600 words. ",
        "2. The summary must not mention the article's author. ",
        "3. The summary must open with a sentence that hooks the reader and relates to the article's content. ",
        "4. The summary must close with a concluding sentence. ",
        "5. Any numbers or statistics in the article must be kept in the summary. ",
        "6. The summary must contain more than 2 sentences. ",
        "7. The summary must contain at most 6 sentences. ",
        "The article to summarize follows:"
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        PipelineConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = PipelineConfig::default();
        cfg.min_slot_secs = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.effect_cycle.clear();
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.output.width = 1281;
        assert!(cfg.validate().is_err());

        let mut cfg = PipelineConfig::default();
        cfg.transition.duration_secs = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_json_roundtrip() {
        let cfg = PipelineConfig::default();
        let s = serde_json::to_string_pretty(&cfg).unwrap();
        let de: PipelineConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(de, cfg);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let de: PipelineConfig = serde_json::from_str(r#"{ "min_slot_secs": 0.75 }"#).unwrap();
        assert!((de.min_slot_secs - 0.75).abs() < 1e-9);
        assert_eq!(de.output, OutputProfile::default());
    }
}
