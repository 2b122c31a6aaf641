use std::time::Duration;

use serde_json::json;

use crate::error::{NewsreelError, NewsreelResult};

/// Produces a shorter narration text from the article body. One attempt per
/// call; callers that want retries wrap the trait themselves.
pub trait Summarizer {
    fn summarize(&self, article_text: &str, prompt: &str) -> NewsreelResult<String>;
}

/// Vertex AI text-model adapter (`:predict` REST endpoint).
pub struct VertexSummarizer {
    client: reqwest::blocking::Client,
    project: String,
    location: String,
    model: String,
    access_token: String,
}

impl VertexSummarizer {
    pub fn new(project: impl Into<String>, access_token: impl Into<String>) -> NewsreelResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| NewsreelError::summarization(format!("failed to build client: {e}")))?;
        Ok(Self {
            client,
            project: project.into(),
            location: "us-central1".to_string(),
            model: "text-bison@001".to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}/publishers/google/models/{model}:predict",
            loc = self.location,
            proj = self.project,
            model = self.model,
        )
    }
}

impl Summarizer for VertexSummarizer {
    fn summarize(&self, article_text: &str, prompt: &str) -> NewsreelResult<String> {
        let body = json!({
            "instances": [{ "prompt": format!("{prompt}\n\n{article_text}") }],
            "parameters": {
                "temperature": 0.2,
                "maxOutputTokens": 900,
                "topP": 0.8,
                "topK": 40,
            },
        });

        tracing::debug!(model = %self.model, "requesting article summary");
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .map_err(|e| NewsreelError::summarization(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(NewsreelError::summarization(format!(
                "predict returned {status}: {}",
                detail.trim()
            )));
        }

        let value: serde_json::Value = response
            .json()
            .map_err(|e| NewsreelError::summarization(format!("unreadable response: {e}")))?;
        let content = value["predictions"][0]["content"].as_str().ok_or_else(|| {
            NewsreelError::summarization("response is missing predictions[0].content")
        })?;

        let summary = clean_summary(content);
        if summary.is_empty() {
            return Err(NewsreelError::summarization("model returned an empty summary"));
        }
        Ok(summary)
    }
}

/// The text models decorate summaries with markdown emphasis; captions and
/// narration want plain text.
fn clean_summary(raw: &str) -> String {
    raw.replace('*', "").trim().to_string()
}

/// Deterministic stand-in used by tests and offline runs.
pub struct FixedSummarizer {
    summary: String,
}

impl FixedSummarizer {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
        }
    }
}

impl Summarizer for FixedSummarizer {
    fn summarize(&self, _article_text: &str, _prompt: &str) -> NewsreelResult<String> {
        Ok(self.summary.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_names_project_location_and_model() {
        let s = VertexSummarizer::new("my-project", "token")
            .unwrap()
            .with_location("europe-west1")
            .with_model("text-bison@002");
        assert_eq!(
            s.endpoint(),
            "https://europe-west1-aiplatform.googleapis.com/v1/projects/my-project/locations/europe-west1/publishers/google/models/text-bison@002:predict"
        );
    }

    #[test]
    fn clean_summary_strips_markdown_emphasis() {
        assert_eq!(clean_summary("  *Gran* noticia*  "), "Gran noticia");
    }

    #[test]
    fn fixed_summarizer_is_deterministic() {
        let s = FixedSummarizer::new("resumen fijo.");
        assert_eq!(s.summarize("a", "p").unwrap(), "resumen fijo.");
        assert_eq!(s.summarize("b", "q").unwrap(), "resumen fijo.");
    }
}
