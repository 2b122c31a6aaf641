use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{NewsreelError, NewsreelResult};
use crate::model::CaptionUnit;

/// Render a caption track as SRT: sequential 1-based entries, comma-decimal
/// `HH:MM:SS,mmm` timestamps, blank-line separated.
pub fn compose_srt(units: &[CaptionUnit]) -> String {
    let mut out = String::new();
    for (i, unit) in units.iter().enumerate() {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            format_timestamp(unit.start_secs),
            format_timestamp(unit.end_secs),
            unit.text
        ));
    }
    out
}

pub fn write_srt(units: &[CaptionUnit], path: &Path) -> NewsreelResult<PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create subtitle directory '{}'", parent.display()))?;
    }
    std::fs::write(path, compose_srt(units))
        .with_context(|| format!("failed to write subtitles '{}'", path.display()))?;
    Ok(path.to_path_buf())
}

/// Parse SRT text back into caption units. Timestamps are read at
/// millisecond precision, matching what [`compose_srt`] emits.
pub fn parse_srt(input: &str) -> NewsreelResult<Vec<CaptionUnit>> {
    let normalized = input.replace("\r\n", "\n");
    let mut units = Vec::new();

    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block.lines().collect();
        if lines.is_empty() || lines.iter().all(|l| l.trim().is_empty()) {
            continue;
        }
        if lines.len() < 3 {
            return Err(NewsreelError::validation(format!(
                "srt entry must have index, timing and text lines, got: '{block}'"
            )));
        }

        lines[0].trim().parse::<usize>().map_err(|_| {
            NewsreelError::validation(format!("invalid srt entry index '{}'", lines[0]))
        })?;

        let (start_raw, end_raw) = lines[1].split_once(" --> ").ok_or_else(|| {
            NewsreelError::validation(format!("invalid srt timing line '{}'", lines[1]))
        })?;
        let start = parse_timestamp(start_raw.trim())?;
        let end = parse_timestamp(end_raw.trim())?;
        let text = lines[2..].join("\n");

        units.push(CaptionUnit::new(start, end, text)?);
    }

    Ok(units)
}

/// `HH:MM:SS,mmm`, rounded to the nearest millisecond.
pub fn format_timestamp(secs: f64) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

pub fn parse_timestamp(s: &str) -> NewsreelResult<f64> {
    let bad = || NewsreelError::validation(format!("invalid srt timestamp '{s}'"));

    let (hms, millis_raw) = s.split_once(',').ok_or_else(bad)?;
    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return Err(bad());
    }
    let hours: u64 = parts[0].parse().map_err(|_| bad())?;
    let minutes: u64 = parts[1].parse().map_err(|_| bad())?;
    let seconds: u64 = parts[2].parse().map_err(|_| bad())?;
    let millis: u64 = millis_raw.parse().map_err(|_| bad())?;
    if millis_raw.len() != 3 || minutes > 59 || seconds > 59 {
        return Err(bad());
    }

    Ok((hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_format_as_srt() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(3723.456), "01:02:03,456");
        assert_eq!(format_timestamp(59.9996), "00:01:00,000");
    }

    #[test]
    fn timestamp_parse_rejects_garbage() {
        assert!(parse_timestamp("00:00:00.000").is_err());
        assert!(parse_timestamp("00:00,000").is_err());
        assert!(parse_timestamp("00:61:00,000").is_err());
        assert!(parse_timestamp("abc").is_err());
    }

    #[test]
    fn compose_then_parse_roundtrips() {
        let units = vec![
            CaptionUnit::new(0.0, 1.5, "primera linea").unwrap(),
            CaptionUnit::new(1.5, 2.25, "segunda\ncon salto").unwrap(),
            CaptionUnit::new(3.0, 5.125, "tercera").unwrap(),
        ];
        let srt = compose_srt(&units);
        let parsed = parse_srt(&srt).unwrap();
        assert_eq!(parsed, units);
    }

    #[test]
    fn composed_track_is_numbered_sequentially() {
        let units = vec![
            CaptionUnit::new(0.0, 1.0, "uno").unwrap(),
            CaptionUnit::new(1.0, 2.0, "dos").unwrap(),
        ];
        let srt = compose_srt(&units);
        let lines: Vec<&str> = srt.lines().collect();
        assert_eq!(lines[0], "1");
        assert_eq!(lines[1], "00:00:00,000 --> 00:00:01,000");
        assert_eq!(lines[4], "2");
    }

    #[test]
    fn parse_rejects_truncated_entries() {
        assert!(parse_srt("1\n00:00:00,000 --> 00:00:01,000\n").is_err());
    }
}
