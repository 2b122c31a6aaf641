use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::captions::CaptionSegmenter;
use crate::config::PipelineConfig;
use crate::effects::EffectPlanner;
use crate::encode::{self, Encoder};
use crate::error::{NewsreelError, NewsreelResult};
use crate::model::{Article, AudioTrack, WordTiming};
use crate::plan::RenderPlanBuilder;
use crate::schedule::ImageScheduler;
use crate::speech::{SpeechSynthesizer, Transcriber};
use crate::subtitles;
use crate::summarize::Summarizer;

/// Pipeline stages, in execution order. Used to label errors with the
/// stage they surfaced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    Summarize,
    Synthesize,
    Segment,
    Schedule,
    Plan,
    Render,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Summarize => "summarize",
            Stage::Synthesize => "synthesize",
            Stage::Segment => "segment",
            Stage::Schedule => "schedule",
            Stage::Plan => "plan",
            Stage::Render => "render",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one successful run produced.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub output: PathBuf,
    pub subtitles: PathBuf,
    pub audio_duration_secs: f64,
    pub summary_chars: usize,
    pub caption_count: usize,
    pub slot_count: usize,
}

/// Sequences one run: summarize, synthesize, segment captions, schedule
/// images, plan effects, build the render plan, invoke the encoder.
///
/// Strictly linear; every stage is a pure function of the previous stage's
/// output plus at most one collaborator call. A failure at any stage
/// aborts the run labelled with that stage; no partial video output, no
/// hidden retries. All per-run state lives in this struct and its config,
/// so independent runs with different settings can coexist.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    summarizer: Box<dyn Summarizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    transcriber: Option<Box<dyn Transcriber>>,
    encoder: Box<dyn Encoder>,
}

impl PipelineOrchestrator {
    pub fn new(
        config: PipelineConfig,
        summarizer: Box<dyn Summarizer>,
        synthesizer: Box<dyn SpeechSynthesizer>,
        encoder: Box<dyn Encoder>,
    ) -> NewsreelResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            summarizer,
            synthesizer,
            transcriber: None,
            encoder,
        })
    }

    /// Use word-level transcription for caption timing when the
    /// synthesizer does not report timings itself.
    pub fn with_transcriber(mut self, transcriber: Box<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    #[tracing::instrument(skip_all, fields(out = %out_path.display()))]
    pub fn run(&self, article: Article, out_path: &Path) -> NewsreelResult<RunReport> {
        article.validate().map_err(at(Stage::Load))?;
        tracing::info!(images = article.images.len(), "article loaded");

        let summary = self
            .summarizer
            .summarize(&article.text, &self.config.summary_prompt)
            .map_err(at(Stage::Summarize))?;
        if summary.trim().is_empty() {
            return Err(
                NewsreelError::summarization("summarizer returned an empty summary")
                    .at_stage(Stage::Summarize.as_str()),
            );
        }
        tracing::info!(chars = summary.len(), "article summarized");

        let (audio, word_timings) = self.synthesize(&summary).map_err(at(Stage::Synthesize))?;
        tracing::info!(
            duration_secs = audio.duration_secs,
            "narration audio synthesized"
        );

        let word_timings = match word_timings {
            Some(timings) => Some(timings),
            None => self
                .transcribe(&audio)
                .map_err(at(Stage::Segment))?,
        };

        let captions = CaptionSegmenter::new(self.config.caption_bin_secs)
            .and_then(|seg| seg.segment(&summary, audio.duration_secs, word_timings.as_deref()))
            .map_err(at(Stage::Segment))?;
        tracing::info!(captions = captions.len(), "narration segmented");

        let slots = ImageScheduler::new(self.config.min_slot_secs)
            .and_then(|s| s.schedule(&article.images, audio.duration_secs, Some(&captions)))
            .map_err(at(Stage::Schedule))?;
        tracing::info!(slots = slots.len(), "images scheduled");

        let effects = EffectPlanner::new(self.config.effect_cycle.clone())
            .map_err(at(Stage::Plan))?
            .plan(&slots);
        let slot_count = slots.len();
        let plan = RenderPlanBuilder::build(slots, effects, audio.clone(), captions.clone())
            .map_err(at(Stage::Plan))?;
        tracing::info!("render plan built");

        let srt_path = self.config.workdir.join("subtitles.srt");
        subtitles::write_srt(&captions, &srt_path).map_err(at(Stage::Render))?;
        self.encoder
            .encode(&plan, Some(&srt_path), out_path)
            .map_err(at(Stage::Render))?;
        tracing::info!("video rendered");

        Ok(RunReport {
            output: out_path.to_path_buf(),
            subtitles: srt_path,
            audio_duration_secs: audio.duration_secs,
            summary_chars: summary.chars().count(),
            caption_count: captions.len(),
            slot_count,
        })
    }

    /// Synthesize narration and land it in the workdir. Falls back to
    /// ffprobe when the backend does not report a duration.
    fn synthesize(&self, summary: &str) -> NewsreelResult<(AudioTrack, Option<Vec<WordTiming>>)> {
        let spoken = self.synthesizer.synthesize(summary, &self.config.voice)?;

        std::fs::create_dir_all(&self.config.workdir).with_context(|| {
            format!(
                "failed to create workdir '{}'",
                self.config.workdir.display()
            )
        })?;
        let audio_path = self.config.workdir.join("readaloud.mp3");
        std::fs::write(&audio_path, &spoken.audio)
            .with_context(|| format!("failed to write narration '{}'", audio_path.display()))?;

        let duration_secs = match spoken.duration_secs {
            Some(d) => d,
            None => encode::probe_media_duration(&audio_path)?,
        };

        Ok((
            AudioTrack::new(audio_path, duration_secs)?,
            spoken.word_timings,
        ))
    }

    /// Word timings via the optional transcriber. The speech API wants
    /// linear PCM, so the narration is converted to WAV first.
    fn transcribe(&self, audio: &AudioTrack) -> NewsreelResult<Option<Vec<WordTiming>>> {
        let Some(transcriber) = &self.transcriber else {
            return Ok(None);
        };
        let wav_path = self.config.workdir.join("readaloud.wav");
        encode::convert_to_wav(&audio.source, &wav_path)?;
        let timings = transcriber.word_timings(&wav_path, &self.config.voice.language_code)?;
        Ok(Some(timings))
    }
}

fn at(stage: Stage) -> impl Fn(NewsreelError) -> NewsreelError {
    move |e| e.at_stage(stage.as_str())
}
