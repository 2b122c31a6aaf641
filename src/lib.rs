#![forbid(unsafe_code)]

pub mod article;
pub mod captions;
pub mod config;
pub mod effects;
pub mod encode;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod plan;
pub mod schedule;
pub mod speech;
pub mod subtitles;
pub mod summarize;
pub mod transitions;

pub use article::load_article;
pub use captions::CaptionSegmenter;
pub use config::{OutputProfile, PipelineConfig, TransitionConfig, VoiceConfig};
pub use effects::{EffectDescriptor, EffectKind, EffectPlanner};
pub use encode::{Encoder, FfmpegEncoder, PlanDumpEncoder};
pub use error::{NewsreelError, NewsreelResult};
pub use model::{Article, AudioTrack, CaptionUnit, ImageRef, ImageSlot, WordTiming};
pub use pipeline::{PipelineOrchestrator, RunReport, Stage};
pub use plan::{RenderInstruction, RenderPlan, RenderPlanBuilder};
pub use schedule::ImageScheduler;
pub use speech::{SpeechSynthesizer, SpokenAudio, Transcriber};
pub use summarize::Summarizer;
pub use transitions::TransitionKind;
