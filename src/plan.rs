use std::path::PathBuf;

use crate::effects::EffectDescriptor;
use crate::error::{NewsreelError, NewsreelResult};
use crate::model::{AudioTrack, CaptionUnit, ImageSlot, DURATION_TOLERANCE_SECS};

/// One scheduled image paired with its resolved effect.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlanEntry {
    pub slot: ImageSlot,
    pub effect: EffectDescriptor,
}

/// Immutable timeline description handed to the encoder. Built only
/// through [`RenderPlanBuilder::build`], which is the single validation
/// gate before encoding; no partial or best-effort plans exist.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderPlan {
    entries: Vec<PlanEntry>,
    audio: AudioTrack,
    captions: Vec<CaptionUnit>,
}

impl RenderPlan {
    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn audio(&self) -> &AudioTrack {
        &self.audio
    }

    pub fn captions(&self) -> &[CaptionUnit] {
        &self.captions
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.audio.duration_secs
    }

    /// Flatten into the ordered instruction list consumed by encoders:
    /// every image in timeline order, then the caption overlays, then the
    /// audio track from zero.
    pub fn instructions(&self) -> Vec<RenderInstruction> {
        let mut out = Vec::with_capacity(self.entries.len() + self.captions.len() + 1);
        for entry in &self.entries {
            out.push(RenderInstruction::ShowImage {
                source: entry.slot.image.path.clone(),
                start_secs: entry.slot.start_secs,
                end_secs: entry.slot.end_secs(),
                effect: entry.effect.clone(),
            });
        }
        for caption in &self.captions {
            out.push(RenderInstruction::OverlayCaption {
                text: caption.text.clone(),
                start_secs: caption.start_secs,
                end_secs: caption.end_secs,
            });
        }
        out.push(RenderInstruction::PlayAudio {
            source: self.audio.source.clone(),
            start_secs: 0.0,
        });
        out
    }

    pub fn to_json(&self) -> NewsreelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NewsreelError::validation(format!("failed to serialize render plan: {e}")))
    }
}

/// One flat encoder instruction.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderInstruction {
    ShowImage {
        source: PathBuf,
        start_secs: f64,
        end_secs: f64,
        effect: EffectDescriptor,
    },
    OverlayCaption {
        text: String,
        start_secs: f64,
        end_secs: f64,
    },
    PlayAudio {
        source: PathBuf,
        start_secs: f64,
    },
}

pub struct RenderPlanBuilder;

impl RenderPlanBuilder {
    /// Cross-entity invariant checks, then assembly. A violation is a
    /// defect in upstream scheduling logic, never bad user input, so it is
    /// logged with full context and surfaced as [`NewsreelError::PlanInconsistency`].
    pub fn build(
        slots: Vec<ImageSlot>,
        effects: Vec<EffectDescriptor>,
        audio: AudioTrack,
        captions: Vec<CaptionUnit>,
    ) -> NewsreelResult<RenderPlan> {
        if slots.is_empty() {
            return Err(inconsistency("slot_count", ">= 1", "0"));
        }
        if effects.len() != slots.len() {
            return Err(inconsistency(
                "effect_count",
                slots.len(),
                effects.len(),
            ));
        }

        if slots[0].start_secs.abs() > DURATION_TOLERANCE_SECS {
            return Err(inconsistency(
                "schedule_origin",
                "0.000",
                format!("{:.3}", slots[0].start_secs),
            ));
        }
        for slot in &slots {
            if !slot.duration_secs.is_finite() || slot.duration_secs <= 0.0 {
                return Err(inconsistency(
                    "slot_duration",
                    "> 0",
                    format!("{:.3} (slot {})", slot.duration_secs, slot.index),
                ));
            }
        }
        for pair in slots.windows(2) {
            if (pair[0].end_secs() - pair[1].start_secs).abs() > DURATION_TOLERANCE_SECS {
                return Err(inconsistency(
                    "slot_contiguity",
                    format!("{:.3}", pair[0].end_secs()),
                    format!("{:.3} (slot {})", pair[1].start_secs, pair[1].index),
                ));
            }
        }

        let schedule_total: f64 = slots.iter().map(|s| s.duration_secs).sum();
        if (schedule_total - audio.duration_secs).abs() > DURATION_TOLERANCE_SECS {
            return Err(inconsistency(
                "schedule_total",
                format!("{:.3}", audio.duration_secs),
                format!("{:.3}", schedule_total),
            ));
        }

        for pair in captions.windows(2) {
            if pair[1].start_secs + DURATION_TOLERANCE_SECS < pair[0].end_secs {
                return Err(inconsistency(
                    "caption_overlap",
                    format!("start >= {:.3}", pair[0].end_secs),
                    format!("{:.3}", pair[1].start_secs),
                ));
            }
        }
        if let Some(last) = captions.last() {
            if last.end_secs > audio.duration_secs + DURATION_TOLERANCE_SECS {
                return Err(inconsistency(
                    "caption_end",
                    format!("<= {:.3}", audio.duration_secs),
                    format!("{:.3}", last.end_secs),
                ));
            }
        }

        let entries = slots
            .into_iter()
            .zip(effects)
            .map(|(slot, effect)| PlanEntry { slot, effect })
            .collect();

        Ok(RenderPlan {
            entries,
            audio,
            captions,
        })
    }
}

fn inconsistency(invariant: &str, expected: impl ToString, actual: impl ToString) -> NewsreelError {
    let expected = expected.to_string();
    let actual = actual.to_string();
    tracing::error!(invariant, %expected, %actual, "render plan invariant violated");
    NewsreelError::plan_inconsistency(invariant, expected, actual)
}
