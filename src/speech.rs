use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;

use crate::config::VoiceConfig;
use crate::error::{NewsreelError, NewsreelResult};
use crate::model::WordTiming;

/// Synthesized narration as returned by a TTS backend. Duration and word
/// timings are optional; the orchestrator probes the duration and falls
/// back to a transcriber (or sentence-proportional captions) when absent.
#[derive(Clone, Debug)]
pub struct SpokenAudio {
    pub audio: Vec<u8>,
    pub duration_secs: Option<f64>,
    pub word_timings: Option<Vec<WordTiming>>,
}

pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str, voice: &VoiceConfig) -> NewsreelResult<SpokenAudio>;
}

/// Recovers word-level timings from narration audio, for caption syncing
/// when the synthesizer does not report them.
pub trait Transcriber {
    fn word_timings(&self, audio_path: &Path, language_code: &str)
    -> NewsreelResult<Vec<WordTiming>>;
}

/// Google Cloud `text:synthesize` adapter; returns MP3 bytes.
pub struct CloudTtsSynthesizer {
    client: reqwest::blocking::Client,
    access_token: String,
}

impl CloudTtsSynthesizer {
    pub fn new(access_token: impl Into<String>) -> NewsreelResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| NewsreelError::synthesis(format!("failed to build client: {e}")))?;
        Ok(Self {
            client,
            access_token: access_token.into(),
        })
    }
}

impl SpeechSynthesizer for CloudTtsSynthesizer {
    fn synthesize(&self, text: &str, voice: &VoiceConfig) -> NewsreelResult<SpokenAudio> {
        let body = json!({
            "input": { "text": text },
            "voice": {
                "languageCode": voice.language_code,
                "name": voice.name,
                "ssmlGender": voice.gender.api_name(),
            },
            "audioConfig": { "audioEncoding": "MP3" },
        });

        tracing::debug!(voice = %voice.name, chars = text.len(), "synthesizing narration");
        let response = self
            .client
            .post("https://texttospeech.googleapis.com/v1/text:synthesize")
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .map_err(|e| NewsreelError::synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(NewsreelError::synthesis(format!(
                "synthesize returned {status}: {}",
                detail.trim()
            )));
        }

        let value: serde_json::Value = response
            .json()
            .map_err(|e| NewsreelError::synthesis(format!("unreadable response: {e}")))?;
        let encoded = value["audioContent"]
            .as_str()
            .ok_or_else(|| NewsreelError::synthesis("response is missing audioContent"))?;
        let audio = BASE64
            .decode(encoded)
            .map_err(|e| NewsreelError::synthesis(format!("audioContent is not base64: {e}")))?;

        Ok(SpokenAudio {
            audio,
            duration_secs: None,
            word_timings: None,
        })
    }
}

/// Google Cloud `speech:recognize` adapter with word time offsets enabled.
/// Expects WAV input; the orchestrator converts the narration first.
pub struct CloudSpeechTranscriber {
    client: reqwest::blocking::Client,
    access_token: String,
    sample_rate_hertz: u32,
}

impl CloudSpeechTranscriber {
    pub fn new(access_token: impl Into<String>) -> NewsreelResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| NewsreelError::transcription(format!("failed to build client: {e}")))?;
        Ok(Self {
            client,
            access_token: access_token.into(),
            sample_rate_hertz: 24_000,
        })
    }

    pub fn with_sample_rate(mut self, sample_rate_hertz: u32) -> Self {
        self.sample_rate_hertz = sample_rate_hertz;
        self
    }
}

impl Transcriber for CloudSpeechTranscriber {
    fn word_timings(
        &self,
        audio_path: &Path,
        language_code: &str,
    ) -> NewsreelResult<Vec<WordTiming>> {
        let content = std::fs::read(audio_path).map_err(|e| {
            NewsreelError::transcription(format!(
                "failed to read audio '{}': {e}",
                audio_path.display()
            ))
        })?;

        let body = json!({
            "config": {
                "enableWordTimeOffsets": true,
                "enableAutomaticPunctuation": true,
                "sampleRateHertz": self.sample_rate_hertz,
                "languageCode": language_code,
            },
            "audio": { "content": BASE64.encode(&content) },
        });

        tracing::debug!(bytes = content.len(), "transcribing narration for word timings");
        let response = self
            .client
            .post("https://speech.googleapis.com/v1/speech:recognize")
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .map_err(|e| NewsreelError::transcription(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(NewsreelError::transcription(format!(
                "recognize returned {status}: {}",
                detail.trim()
            )));
        }

        let value: serde_json::Value = response
            .json()
            .map_err(|e| NewsreelError::transcription(format!("unreadable response: {e}")))?;
        parse_recognize_words(&value)
    }
}

fn parse_recognize_words(value: &serde_json::Value) -> NewsreelResult<Vec<WordTiming>> {
    let mut timings = Vec::new();
    let Some(results) = value["results"].as_array() else {
        return Ok(timings);
    };
    for result in results {
        let Some(words) = result["alternatives"][0]["words"].as_array() else {
            continue;
        };
        for word in words {
            let text = word["word"].as_str().unwrap_or_default();
            if text.trim().is_empty() {
                continue;
            }
            timings.push(WordTiming {
                word: text.to_string(),
                start_secs: parse_api_duration(word["startTime"].as_str().unwrap_or("0s"))?,
                end_secs: parse_api_duration(word["endTime"].as_str().unwrap_or("0s"))?,
            });
        }
    }
    Ok(timings)
}

/// The speech API encodes offsets as decimal seconds with an `s` suffix
/// ("1.500s").
fn parse_api_duration(raw: &str) -> NewsreelResult<f64> {
    raw.trim()
        .strip_suffix('s')
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| {
            NewsreelError::transcription(format!("invalid duration '{raw}' in recognize response"))
        })
}

/// Deterministic stand-in used by tests and offline runs; emits a fixed
/// payload instead of real speech.
pub struct FixedSynthesizer {
    duration_secs: f64,
    word_timings: Option<Vec<WordTiming>>,
}

impl FixedSynthesizer {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            word_timings: None,
        }
    }

    pub fn with_word_timings(mut self, timings: Vec<WordTiming>) -> Self {
        self.word_timings = Some(timings);
        self
    }
}

impl SpeechSynthesizer for FixedSynthesizer {
    fn synthesize(&self, _text: &str, _voice: &VoiceConfig) -> NewsreelResult<SpokenAudio> {
        Ok(SpokenAudio {
            audio: vec![0u8; 1024],
            duration_secs: Some(self.duration_secs),
            word_timings: self.word_timings.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_durations_parse_with_suffix() {
        assert_eq!(parse_api_duration("1.500s").unwrap(), 1.5);
        assert_eq!(parse_api_duration("0s").unwrap(), 0.0);
        assert!(parse_api_duration("1.5").is_err());
        assert!(parse_api_duration("-2s").is_err());
    }

    #[test]
    fn recognize_words_flatten_across_results() {
        let value = json!({
            "results": [
                {
                    "alternatives": [{
                        "words": [
                            { "word": "la", "startTime": "0s", "endTime": "0.300s" },
                            { "word": "noticia", "startTime": "0.300s", "endTime": "0.900s" },
                        ]
                    }]
                },
                {
                    "alternatives": [{
                        "words": [
                            { "word": "sigue", "startTime": "1.200s", "endTime": "1.700s" },
                        ]
                    }]
                }
            ]
        });
        let words = parse_recognize_words(&value).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].word, "la");
        assert_eq!(words[2].start_secs, 1.2);
    }

    #[test]
    fn recognize_response_without_results_is_empty() {
        assert!(parse_recognize_words(&json!({})).unwrap().is_empty());
    }
}
