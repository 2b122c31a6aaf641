use crate::error::{NewsreelError, NewsreelResult};
use crate::model::{CaptionUnit, ImageRef, ImageSlot};

/// Computes a gapless, non-overlapping display schedule for the article's
/// images over the narration duration.
///
/// Slot boundaries are derived by telescoping subdivision, so the durations
/// sum to the target total exactly regardless of image count. The schedule
/// is a pure function of its inputs; no call-order or wall-clock dependence.
#[derive(Clone, Debug)]
pub struct ImageScheduler {
    min_slot_secs: f64,
}

impl ImageScheduler {
    pub fn new(min_slot_secs: f64) -> NewsreelResult<Self> {
        if !min_slot_secs.is_finite() || min_slot_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "min slot duration must be finite and > 0",
            ));
        }
        Ok(Self { min_slot_secs })
    }

    /// Base policy is equal division. When a caption track is supplied and
    /// there are more images than captions, images are compressed into
    /// caption spans instead: base `n/c` images per caption, the `n%c`
    /// remainder absorbed by the earliest captions, equal subdivision
    /// within each span.
    pub fn schedule(
        &self,
        images: &[ImageRef],
        total_duration_secs: f64,
        captions: Option<&[CaptionUnit]>,
    ) -> NewsreelResult<Vec<ImageSlot>> {
        let n = images.len();
        if n == 0 {
            return Err(NewsreelError::NoImages);
        }
        if !total_duration_secs.is_finite() || total_duration_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "total duration must be finite and > 0",
            ));
        }

        let boundaries = match captions {
            Some(caps) if !caps.is_empty() && n > caps.len() => {
                caption_aligned_boundaries(caps, n, total_duration_secs)?
            }
            _ => equal_boundaries(n, total_duration_secs),
        };
        debug_assert_eq!(boundaries.len(), n + 1);

        let mut slots = Vec::with_capacity(n);
        for (i, image) in images.iter().enumerate() {
            let start = boundaries[i];
            let duration = boundaries[i + 1] - boundaries[i];
            if duration < self.min_slot_secs {
                return Err(NewsreelError::ScheduleInfeasible {
                    image_count: n,
                    total_duration: total_duration_secs,
                    min_slot_secs: self.min_slot_secs,
                });
            }
            slots.push(ImageSlot {
                image: image.clone(),
                start_secs: start,
                duration_secs: duration,
                index: i,
            });
        }

        Ok(slots)
    }
}

/// `n + 1` boundaries dividing `[0, total]` into `n` equal spans. The first
/// and last boundaries are pinned so the schedule covers the target exactly.
fn equal_boundaries(n: usize, total: f64) -> Vec<f64> {
    let mut boundaries = Vec::with_capacity(n + 1);
    for i in 0..n {
        boundaries.push(total * i as f64 / n as f64);
    }
    boundaries.push(total);
    boundaries
}

/// Caption spans partition `[0, total]`: span `i` runs from caption `i`'s
/// start (0 for the first) to caption `i+1`'s start, the last span to
/// `total`. A gapped caption track therefore still yields a gapless image
/// schedule.
fn caption_aligned_boundaries(
    captions: &[CaptionUnit],
    n: usize,
    total: f64,
) -> NewsreelResult<Vec<f64>> {
    let c = captions.len();
    let mut span_bounds = Vec::with_capacity(c + 1);
    span_bounds.push(0.0);
    for caption in &captions[1..] {
        span_bounds.push(caption.start_secs);
    }
    span_bounds.push(total);

    for pair in span_bounds.windows(2) {
        if pair[1] < pair[0] {
            return Err(NewsreelError::validation(
                "caption track must be ordered and inside the audio duration",
            ));
        }
    }

    let base = n / c;
    let remainder = n % c;

    let mut boundaries = Vec::with_capacity(n + 1);
    for i in 0..c {
        let count = base + usize::from(i < remainder);
        let span_start = span_bounds[i];
        let span_len = span_bounds[i + 1] - span_bounds[i];
        for k in 0..count {
            boundaries.push(span_start + span_len * k as f64 / count as f64);
        }
    }
    boundaries.push(total);
    Ok(boundaries)
}
