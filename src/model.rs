use std::path::PathBuf;

use crate::error::{NewsreelError, NewsreelResult};

/// Two schedules are considered equal in length when they agree within this.
pub const DURATION_TOLERANCE_SECS: f64 = 1e-3;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageRef {
    pub path: PathBuf,
    pub index: usize, // position in the article's original image sequence
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Article {
    pub text: String,
    pub images: Vec<ImageRef>,
}

impl Article {
    pub fn validate(&self) -> NewsreelResult<()> {
        if self.text.trim().is_empty() {
            return Err(NewsreelError::input("article text is empty"));
        }
        if self.images.is_empty() {
            return Err(NewsreelError::input("article has no images"));
        }
        Ok(())
    }
}

/// Narration audio written to disk, referenced by the render plan.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioTrack {
    pub source: PathBuf,
    pub duration_secs: f64,
}

impl AudioTrack {
    pub fn new(source: impl Into<PathBuf>, duration_secs: f64) -> NewsreelResult<Self> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "audio duration must be finite and > 0",
            ));
        }
        Ok(Self {
            source: source.into(),
            duration_secs,
        })
    }
}

/// One timed subtitle entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionUnit {
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

impl CaptionUnit {
    pub fn new(start_secs: f64, end_secs: f64, text: impl Into<String>) -> NewsreelResult<Self> {
        if !start_secs.is_finite() || start_secs < 0.0 {
            return Err(NewsreelError::validation(
                "caption start must be finite and >= 0",
            ));
        }
        if !end_secs.is_finite() || end_secs <= start_secs {
            return Err(NewsreelError::validation(
                "caption end must be finite and > start",
            ));
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(NewsreelError::validation("caption text must be non-empty"));
        }
        Ok(Self {
            start_secs,
            end_secs,
            text,
        })
    }

    pub fn duration_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

/// One image's assigned on-screen span within the final video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageSlot {
    pub image: ImageRef,
    pub start_secs: f64,
    pub duration_secs: f64,
    pub index: usize,
}

impl ImageSlot {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// One spoken word with its offsets in the narration audio.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_secs: f64,
    pub end_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_rejects_empty_text_and_missing_images() {
        let article = Article {
            text: "  ".to_string(),
            images: vec![ImageRef {
                path: PathBuf::from("imagen0.jpg"),
                index: 0,
            }],
        };
        assert!(article.validate().is_err());

        let article = Article {
            text: "body".to_string(),
            images: vec![],
        };
        assert!(article.validate().is_err());
    }

    #[test]
    fn audio_track_rejects_non_positive_duration() {
        assert!(AudioTrack::new("readaloud.mp3", 0.0).is_err());
        assert!(AudioTrack::new("readaloud.mp3", f64::NAN).is_err());
        assert!(AudioTrack::new("readaloud.mp3", 12.5).is_ok());
    }

    #[test]
    fn caption_unit_rejects_bad_ranges_and_empty_text() {
        assert!(CaptionUnit::new(-1.0, 2.0, "hola").is_err());
        assert!(CaptionUnit::new(2.0, 2.0, "hola").is_err());
        assert!(CaptionUnit::new(0.0, 2.0, "   ").is_err());
        let unit = CaptionUnit::new(1.0, 2.5, "hola").unwrap();
        assert!((unit.duration_secs() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn image_slot_serde_roundtrip() {
        let slot = ImageSlot {
            image: ImageRef {
                path: PathBuf::from("imagen2.jpg"),
                index: 2,
            },
            start_secs: 6.0,
            duration_secs: 3.0,
            index: 2,
        };
        let s = serde_json::to_string(&slot).unwrap();
        let de: ImageSlot = serde_json::from_str(&s).unwrap();
        assert_eq!(de, slot);
        assert!((de.end_secs() - 9.0).abs() < 1e-9);
    }
}
