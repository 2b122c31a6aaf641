use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::config::{OutputProfile, TransitionConfig};
use crate::effects::{EffectDescriptor, PanDirection};
use crate::error::{NewsreelError, NewsreelResult};
use crate::plan::{PlanEntry, RenderPlan};

/// Consumes one validated render plan and produces the output video.
pub trait Encoder {
    fn encode(
        &self,
        plan: &RenderPlan,
        subtitles: Option<&Path>,
        out_path: &Path,
    ) -> NewsreelResult<()>;
}

/// Drives the system `ffmpeg` binary in three passes: a muted slideshow
/// with chained `xfade` transitions and per-slot effect filters, then
/// audio muxing, then `mov_text` subtitle embedding.
///
/// We intentionally shell out to `ffmpeg` rather than linking FFmpeg
/// libraries, to avoid native dev header/lib requirements.
pub struct FfmpegEncoder {
    profile: OutputProfile,
    transition: TransitionConfig,
    workdir: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(
        profile: OutputProfile,
        transition: TransitionConfig,
        workdir: impl Into<PathBuf>,
    ) -> NewsreelResult<Self> {
        profile.validate()?;
        transition.validate()?;
        Ok(Self {
            profile,
            transition,
            workdir: workdir.into(),
        })
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        plan: &RenderPlan,
        subtitles: Option<&Path>,
        out_path: &Path,
    ) -> NewsreelResult<()> {
        if !is_ffmpeg_on_path() {
            return Err(NewsreelError::encoding(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }
        ensure_parent_dir(out_path)?;
        std::fs::create_dir_all(&self.workdir).with_context(|| {
            format!("failed to create workdir '{}'", self.workdir.display())
        })?;

        let transition_secs = effective_transition_secs(plan.entries(), &self.transition);
        let muted = self.workdir.join("mutedvideo.mp4");

        tracing::debug!(
            images = plan.entries().len(),
            transition = self.transition.kind.xfade_name(),
            "encoding muted slideshow"
        );
        run_ffmpeg(&render_args(
            plan.entries(),
            &self.profile,
            &self.transition,
            transition_secs,
            &muted,
        ))?;

        let mux_target = if subtitles.is_some() {
            self.workdir.join("withaudiovideo.mp4")
        } else {
            out_path.to_path_buf()
        };
        tracing::debug!(audio = %plan.audio().source.display(), "muxing narration audio");
        run_ffmpeg(&mux_audio_args(&muted, &plan.audio().source, &mux_target))?;

        if let Some(srt) = subtitles {
            tracing::debug!(subtitles = %srt.display(), "embedding subtitle track");
            run_ffmpeg(&embed_subtitles_args(&mux_target, srt, out_path))?;
        }

        Ok(())
    }
}

/// Debugging/test encoder: serializes the render plan as JSON to the
/// output path instead of producing video.
pub struct PlanDumpEncoder;

impl Encoder for PlanDumpEncoder {
    fn encode(
        &self,
        plan: &RenderPlan,
        _subtitles: Option<&Path>,
        out_path: &Path,
    ) -> NewsreelResult<()> {
        ensure_parent_dir(out_path)?;
        std::fs::write(out_path, plan.to_json()?)
            .with_context(|| format!("failed to write render plan '{}'", out_path.display()))?;
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> NewsreelResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `ffprobe` a media file's container duration in seconds.
pub fn probe_media_duration(path: &Path) -> NewsreelResult<f64> {
    let output = Command::new("ffprobe")
        .args(["-i"])
        .arg(path)
        .args(["-show_entries", "format=duration", "-v", "quiet", "-of", "csv=p=0"])
        .output()
        .map_err(|e| NewsreelError::encoding(format!("failed to spawn ffprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NewsreelError::encoding(format!(
            "ffprobe exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            NewsreelError::encoding(format!(
                "ffprobe reported no duration for '{}'",
                path.display()
            ))
        })
}

/// Convert narration audio to WAV (the speech API wants linear PCM).
pub fn convert_to_wav(src: &Path, dst: &Path) -> NewsreelResult<()> {
    ensure_parent_dir(dst)?;
    let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "error".into(), "-i".into()];
    args.push(src.display().to_string());
    args.push(dst.display().to_string());
    run_ffmpeg(&args)
}

fn run_ffmpeg(args: &[String]) -> NewsreelResult<()> {
    let output = Command::new("ffmpeg")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            NewsreelError::encoding(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NewsreelError::encoding(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

/// The transition cannot outlast the shortest slot; clamp and warn rather
/// than letting a long transition swallow a neighbouring image.
fn effective_transition_secs(entries: &[PlanEntry], transition: &TransitionConfig) -> f64 {
    if entries.len() < 2 {
        return 0.0;
    }
    let min_slot = entries
        .iter()
        .map(|e| e.slot.duration_secs)
        .fold(f64::INFINITY, f64::min);
    if transition.duration_secs > min_slot {
        tracing::warn!(
            configured = transition.duration_secs,
            clamped = min_slot,
            "transition longer than shortest slot; clamping"
        );
        min_slot
    } else {
        transition.duration_secs
    }
}

/// Input arguments: each image is looped for its slot duration, plus the
/// transition overlap for every input after the first (each later input
/// crossfades in over `t` before its slot starts, so the chained output
/// still ends exactly at the schedule total).
fn input_args(entries: &[PlanEntry], transition_secs: f64) -> Vec<String> {
    let mut args = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let extra = if i == 0 { 0.0 } else { transition_secs };
        args.extend([
            "-loop".to_string(),
            "1".to_string(),
            "-t".to_string(),
            format!("{:.3}", entry.slot.duration_secs + extra),
            "-i".to_string(),
            entry.slot.image.path.display().to_string(),
        ]);
    }
    args
}

/// Offsets (in the accumulated output timeline) at which each `xfade`
/// begins: every transition completes exactly at the next slot's start.
fn xfade_offsets(entries: &[PlanEntry], transition_secs: f64) -> Vec<f64> {
    entries[1..]
        .iter()
        .map(|e| (e.slot.start_secs - transition_secs).max(0.0))
        .collect()
}

/// Normalization chain applied to every input: fit into the canvas, pad,
/// fix SAR, resample to the output frame rate and pixel format, then any
/// per-slot effect.
fn per_image_filter(index: usize, entry: &PlanEntry, profile: &OutputProfile) -> String {
    let OutputProfile { width, height, fps } = *profile;
    let mut chain = format!(
        "[{index}]scale={width}:{height}:force_original_aspect_ratio=decrease,\
         pad={width}:{height}:-1:-1,setsar=1,fps={fps},format=yuv420p"
    );
    if let Some(effect) = effect_filter(&entry.effect, entry.slot.duration_secs, profile) {
        chain.push(',');
        chain.push_str(&effect);
    }
    chain.push_str(&format!("[{index}p]"));
    chain
}

/// Translate an [`EffectDescriptor`] into an ffmpeg filter snippet. Motion
/// expressions are linear in the output frame counter and normalized by
/// the slot's frame count, so the motion completes exactly at slot end.
fn effect_filter(
    effect: &EffectDescriptor,
    duration_secs: f64,
    profile: &OutputProfile,
) -> Option<String> {
    let OutputProfile { width, height, fps } = *profile;
    let frames = (duration_secs * f64::from(fps)).round().max(1.0) as u64;
    match effect {
        EffectDescriptor::Zoom {
            start_scale,
            end_scale,
        } => Some(format!(
            "zoompan=z='{start_scale:.3}+{delta:.3}*on/{frames}':d=1:\
             x='iw/2-(iw/zoom/2)':y='ih/2-(ih/zoom/2)':s={width}x{height}:fps={fps}",
            delta = end_scale - start_scale,
        )),
        EffectDescriptor::Pan {
            direction,
            distance_frac,
        } => {
            let zoom = 1.0 + distance_frac;
            let progress = match direction {
                PanDirection::LeftToRight => format!("on/{frames}"),
                PanDirection::RightToLeft => format!("(1-on/{frames})"),
            };
            Some(format!(
                "zoompan=z='{zoom:.3}':d=1:x='(iw-iw/zoom)*{progress}':\
                 y='ih/2-(ih/zoom/2)':s={width}x{height}:fps={fps}"
            ))
        }
        EffectDescriptor::Static => None,
        EffectDescriptor::Fade {
            fade_in_secs,
            fade_out_secs,
        } => Some(format!(
            "fade=t=in:st=0:d={fade_in_secs:.3},fade=t=out:st={out_start:.3}:d={fade_out_secs:.3}",
            out_start = (duration_secs - fade_out_secs).max(0.0),
        )),
    }
}

/// Full `-filter_complex` graph plus the label to map as output.
fn build_filtergraph(
    entries: &[PlanEntry],
    profile: &OutputProfile,
    transition: &TransitionConfig,
    transition_secs: f64,
) -> (String, String) {
    let mut graph = String::new();
    for (i, entry) in entries.iter().enumerate() {
        graph.push_str(&per_image_filter(i, entry, profile));
        graph.push(';');
    }

    if entries.len() == 1 {
        graph.pop();
        return (graph, "[0p]".to_string());
    }

    if transition_secs <= 0.0 {
        let inputs: String = (0..entries.len()).map(|i| format!("[{i}p]")).collect();
        graph.push_str(&format!(
            "{inputs}concat=n={}:v=1:a=0[vout]",
            entries.len()
        ));
        return (graph, "[vout]".to_string());
    }

    let offsets = xfade_offsets(entries, transition_secs);
    for (i, offset) in offsets.iter().enumerate() {
        let from = if i == 0 {
            format!("[{i}p]")
        } else {
            format!("[{i}x]")
        };
        let sep = if i == 0 { "" } else { ";" };
        graph.push_str(&format!(
            "{sep}{from}[{next}p]xfade=transition={kind}:duration={transition_secs:.3}:offset={offset:.3}[{next}x]",
            next = i + 1,
            kind = transition.kind.xfade_name(),
        ));
    }

    let final_label = format!("[{}x]", entries.len() - 1);
    (graph, final_label)
}

fn render_args(
    entries: &[PlanEntry],
    profile: &OutputProfile,
    transition: &TransitionConfig,
    transition_secs: f64,
    out_path: &Path,
) -> Vec<String> {
    let (graph, final_label) = build_filtergraph(entries, profile, transition, transition_secs);
    let mut args: Vec<String> = vec!["-y".into(), "-loglevel".into(), "error".into()];
    args.extend(input_args(entries, transition_secs));
    args.extend([
        "-filter_complex".to_string(),
        graph,
        "-map".to_string(),
        final_label,
        "-c:v".to_string(),
        "libx264".to_string(),
        "-crf".to_string(),
        "17".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        "-an".to_string(),
        out_path.display().to_string(),
    ]);
    args
}

fn mux_audio_args(muted: &Path, audio: &Path, out_path: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        muted.display().to_string(),
        "-i".into(),
        audio.display().to_string(),
        "-c".into(),
        "copy".into(),
        out_path.display().to_string(),
    ]
}

fn embed_subtitles_args(video: &Path, srt: &Path, out_path: &Path) -> Vec<String> {
    vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        video.display().to_string(),
        "-i".into(),
        srt.display().to_string(),
        "-c".into(),
        "copy".into(),
        "-c:s".into(),
        "mov_text".into(),
        out_path.display().to_string(),
    ]
}
