use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use newsreel::article::{load_article, DEFAULT_IMAGE_PREFIX};
use newsreel::config::{PipelineConfig, TransitionConfig};
use newsreel::encode::{Encoder, FfmpegEncoder, PlanDumpEncoder};
use newsreel::pipeline::PipelineOrchestrator;
use newsreel::speech::{CloudSpeechTranscriber, CloudTtsSynthesizer};
use newsreel::summarize::VertexSummarizer;
use newsreel::transitions::parse_transition;

#[derive(Parser, Debug)]
#[command(name = "newsreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a narrated, subtitled video from an article and its images.
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Article text file.
    #[arg(short = 't', long = "text-input")]
    text_input: PathBuf,

    /// Directory containing the article images, named `<prefix><number>`
    /// starting from 0 (imagen0.jpg, imagen1.jpg, ...).
    #[arg(short = 'i', long = "image-input")]
    image_input: PathBuf,

    /// Google Cloud project used for summarization.
    #[arg(short = 'g', long = "gcp-project")]
    gcp_project: String,

    /// Output video path.
    #[arg(long, default_value = "finalvideosubs.mp4")]
    out: PathBuf,

    /// OAuth access token for Google Cloud APIs. Falls back to
    /// $GOOGLE_CLOUD_ACCESS_TOKEN.
    #[arg(long)]
    access_token: Option<String>,

    /// Image filename prefix.
    #[arg(long, default_value = DEFAULT_IMAGE_PREFIX)]
    image_prefix: String,

    /// Working directory for narration audio, subtitles and encoder
    /// intermediates.
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Transition between images: fade, slideright, circleopen, fadeblack.
    #[arg(long, default_value = "circleopen")]
    transition: String,

    /// Derive caption timing from a speech-to-text transcription of the
    /// narration instead of sentence lengths.
    #[arg(long)]
    transcribe: bool,

    /// Skip the encoder and write the render plan JSON to the output path.
    #[arg(long)]
    dump_plan: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let access_token = args
        .access_token
        .or_else(|| std::env::var("GOOGLE_CLOUD_ACCESS_TOKEN").ok())
        .context("an access token is required (--access-token or $GOOGLE_CLOUD_ACCESS_TOKEN)")?;

    let config = PipelineConfig {
        workdir: args.workdir.clone(),
        transition: TransitionConfig {
            kind: parse_transition(&args.transition)?,
            ..TransitionConfig::default()
        },
        ..PipelineConfig::default()
    };

    let article = load_article(&args.text_input, &args.image_input, &args.image_prefix)?;

    let summarizer = VertexSummarizer::new(args.gcp_project, access_token.clone())?;
    let synthesizer = CloudTtsSynthesizer::new(access_token.clone())?;
    let encoder: Box<dyn Encoder> = if args.dump_plan {
        Box::new(PlanDumpEncoder)
    } else {
        Box::new(FfmpegEncoder::new(
            config.output,
            config.transition,
            args.workdir.clone(),
        )?)
    };

    let mut orchestrator = PipelineOrchestrator::new(
        config,
        Box::new(summarizer),
        Box::new(synthesizer),
        encoder,
    )?;
    if args.transcribe {
        orchestrator =
            orchestrator.with_transcriber(Box::new(CloudSpeechTranscriber::new(access_token)?));
    }

    let report = orchestrator.run(article, &args.out)?;
    println!(
        "wrote {} ({:.1}s narration, {} captions, {} images)",
        report.output.display(),
        report.audio_duration_secs,
        report.caption_count,
        report.slot_count,
    );
    Ok(())
}
