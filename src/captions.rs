use crate::error::{NewsreelError, NewsreelResult};
use crate::model::{CaptionUnit, WordTiming};

/// Splits narration into an ordered, non-overlapping caption track.
///
/// When word-level timing metadata is available the words are grouped into
/// bins of at most `bin_secs`; otherwise the narration text is split into
/// sentences and the audio duration is distributed proportionally to
/// sentence length.
#[derive(Clone, Debug)]
pub struct CaptionSegmenter {
    bin_secs: f64,
}

impl CaptionSegmenter {
    pub fn new(bin_secs: f64) -> NewsreelResult<Self> {
        if !bin_secs.is_finite() || bin_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "caption bin size must be finite and > 0",
            ));
        }
        Ok(Self { bin_secs })
    }

    pub fn segment(
        &self,
        narration: &str,
        audio_duration_secs: f64,
        timings: Option<&[WordTiming]>,
    ) -> NewsreelResult<Vec<CaptionUnit>> {
        if !audio_duration_secs.is_finite() || audio_duration_secs <= 0.0 {
            return Err(NewsreelError::validation(
                "audio duration must be finite and > 0",
            ));
        }

        match timings {
            Some(words) if !words.is_empty() => {
                self.segment_from_timings(words, audio_duration_secs)
            }
            _ => segment_proportional(narration, audio_duration_secs),
        }
    }

    fn segment_from_timings(
        &self,
        words: &[WordTiming],
        audio_duration_secs: f64,
    ) -> NewsreelResult<Vec<CaptionUnit>> {
        let words: Vec<&WordTiming> = words.iter().filter(|w| !w.word.trim().is_empty()).collect();
        if words.is_empty() {
            return Err(NewsreelError::EmptyNarration);
        }

        for pair in words.windows(2) {
            if pair[1].start_secs < pair[0].start_secs {
                return Err(NewsreelError::validation(
                    "word timings must be ordered by start time",
                ));
            }
        }

        let mut units = Vec::new();
        let mut bin_start = words[0].start_secs.max(0.0);
        let mut bin_deadline = bin_start + self.bin_secs;
        let mut text = words[0].word.trim().to_string();
        let mut prev_end = words[0].end_secs;

        for word in &words[1..] {
            if word.end_secs < bin_deadline {
                text.push(' ');
                text.push_str(word.word.trim());
            } else {
                units.push(CaptionUnit::new(
                    bin_start,
                    prev_end.min(audio_duration_secs),
                    std::mem::take(&mut text),
                )?);
                bin_start = word.start_secs;
                bin_deadline = bin_start + self.bin_secs;
                text = word.word.trim().to_string();
            }
            prev_end = word.end_secs;
        }

        units.push(CaptionUnit::new(
            bin_start,
            prev_end.min(audio_duration_secs),
            text,
        )?);

        Ok(units)
    }
}

/// Sentence-proportional fallback. The returned track is contiguous and
/// covers `[0, audio_duration_secs]` exactly; the last unit absorbs any
/// accumulated rounding.
fn segment_proportional(
    narration: &str,
    audio_duration_secs: f64,
) -> NewsreelResult<Vec<CaptionUnit>> {
    let sentences = split_sentences(narration);
    if sentences.is_empty() {
        return Err(NewsreelError::EmptyNarration);
    }

    let weights: Vec<f64> = sentences
        .iter()
        .map(|s| s.chars().count() as f64)
        .collect();
    let total_weight: f64 = weights.iter().sum();

    let mut units = Vec::with_capacity(sentences.len());
    let mut cumulative = 0.0;
    let mut start = 0.0;
    for (i, (sentence, weight)) in sentences.iter().zip(&weights).enumerate() {
        cumulative += weight;
        let end = if i == sentences.len() - 1 {
            audio_duration_secs
        } else {
            audio_duration_secs * cumulative / total_weight
        };
        units.push(CaptionUnit::new(start, end, sentence.clone())?);
        start = end;
    }

    Ok(units)
}

/// Split on `.`, `!`, `?`, keeping the terminator(s) attached to the
/// sentence. Runs of terminators (`...`, `?!`) stay with one sentence.
/// Fragments without any alphanumeric content are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if is_terminator(c) {
            while let Some(&next) = chars.peek() {
                if !is_terminator(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            push_sentence(&mut sentences, &mut current);
        }
    }
    push_sentence(&mut sentences, &mut current);

    sentences
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '\u{2026}')
}

fn push_sentence(sentences: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if trimmed.chars().any(char::is_alphanumeric) {
        sentences.push(trimmed.to_string());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(word: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            word: word.to_string(),
            start_secs: start,
            end_secs: end,
        }
    }

    #[test]
    fn single_sentence_spans_whole_audio() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let units = seg.segment("Una sola frase.", 5.0, None).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].start_secs, 0.0);
        assert_eq!(units[0].end_secs, 5.0);
        assert_eq!(units[0].text, "Una sola frase.");
    }

    #[test]
    fn proportional_split_matches_character_weights() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        // 10 and 30 chars -> 1/4 and 3/4 of the audio.
        let units = seg
            .segment("abcdefghi. abcdefghijklmnopqrstuvwxyzabc.", 8.0, None)
            .unwrap();
        assert_eq!(units.len(), 2);
        assert!((units[0].end_secs - 2.0).abs() < 1e-9);
        assert_eq!(units[1].start_secs, units[0].end_secs);
        assert_eq!(units[1].end_secs, 8.0);
    }

    #[test]
    fn final_end_is_exact_after_rounding_correction() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let text = "Uno dos tres. Cuatro cinco! Seis siete ocho nueve? Diez.";
        let units = seg.segment(text, 7.3, None).unwrap();
        assert_eq!(units.last().unwrap().end_secs, 7.3);
        for pair in units.windows(2) {
            assert_eq!(pair[0].end_secs, pair[1].start_secs);
            assert!(pair[0].start_secs <= pair[1].start_secs);
        }
        assert_eq!(units[0].start_secs, 0.0);
    }

    #[test]
    fn empty_narration_is_rejected() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        assert!(matches!(
            seg.segment("", 5.0, None),
            Err(NewsreelError::EmptyNarration)
        ));
        assert!(matches!(
            seg.segment("...!?", 5.0, None),
            Err(NewsreelError::EmptyNarration)
        ));
    }

    #[test]
    fn terminator_runs_stay_with_one_sentence() {
        let sentences = split_sentences("Espera... de verdad?! Si.");
        assert_eq!(sentences, vec!["Espera...", "de verdad?!", "Si."]);
    }

    #[test]
    fn word_timings_group_into_bins() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let words = vec![
            word("la", 0.2, 0.5),
            word("noticia", 0.5, 1.1),
            word("del", 1.1, 1.4),
            word("dia", 1.4, 2.0),
            word("continua", 3.6, 4.4),
            word("aqui", 4.4, 5.0),
        ];
        let units = seg.segment("ignored", 6.0, Some(&words)).unwrap();
        assert_eq!(units.len(), 2);
        assert!((units[0].start_secs - 0.2).abs() < 1e-9);
        assert!((units[0].end_secs - 2.0).abs() < 1e-9);
        assert_eq!(units[0].text, "la noticia del dia");
        assert!((units[1].start_secs - 3.6).abs() < 1e-9);
        assert!((units[1].end_secs - 5.0).abs() < 1e-9);
        assert_eq!(units[1].text, "continua aqui");
    }

    #[test]
    fn timed_units_never_pass_audio_end() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let words = vec![word("fin", 4.0, 5.2)];
        let units = seg.segment("ignored", 5.0, Some(&words)).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].end_secs, 5.0);
    }

    #[test]
    fn empty_timing_slice_falls_back_to_sentences() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let units = seg.segment("Una frase entera.", 4.0, Some(&[])).unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].end_secs, 4.0);
    }

    #[test]
    fn unordered_timings_are_rejected() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let words = vec![word("b", 2.0, 2.5), word("a", 0.0, 0.5)];
        assert!(seg.segment("ignored", 5.0, Some(&words)).is_err());
    }

    #[test]
    fn starts_are_non_decreasing_across_durations() {
        let seg = CaptionSegmenter::new(3.0).unwrap();
        let text = "Primera frase corta. Segunda frase bastante mas larga que la primera. \
                    Tercera. Cuarta frase para terminar el resumen de hoy.";
        for duration in [0.9, 2.0, 7.5, 33.33, 120.0] {
            let units = seg.segment(text, duration, None).unwrap();
            assert_eq!(units.last().unwrap().end_secs, duration);
            for pair in units.windows(2) {
                assert!(pair[1].start_secs >= pair[0].start_secs);
                assert_eq!(pair[1].start_secs, pair[0].end_secs);
            }
        }
    }
}
