pub type NewsreelResult<T> = Result<T, NewsreelError>;

#[derive(thiserror::Error, Debug)]
pub enum NewsreelError {
    #[error("input error: {0}")]
    Input(String),

    #[error("narration contains no sentences to caption")]
    EmptyNarration,

    #[error("no images to schedule")]
    NoImages,

    #[error(
        "schedule infeasible: {image_count} images over {total_duration:.3}s would drop slots below the {min_slot_secs:.3}s minimum"
    )]
    ScheduleInfeasible {
        image_count: usize,
        total_duration: f64,
        min_slot_secs: f64,
    },

    #[error("render plan inconsistency ({invariant}): expected {expected}, got {actual}")]
    PlanInconsistency {
        invariant: String,
        expected: String,
        actual: String,
    },

    #[error("summarization unavailable: {0}")]
    SummarizationUnavailable(String),

    #[error("speech synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    #[error("transcription unavailable: {0}")]
    TranscriptionUnavailable(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("{stage} stage failed: {cause}")]
    Stage {
        stage: String,
        cause: Box<NewsreelError>,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NewsreelError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn summarization(msg: impl Into<String>) -> Self {
        Self::SummarizationUnavailable(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::SynthesisUnavailable(msg.into())
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::TranscriptionUnavailable(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::EncodingFailed(msg.into())
    }

    pub fn plan_inconsistency(
        invariant: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::PlanInconsistency {
            invariant: invariant.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Wrap this error with the pipeline stage it surfaced in.
    pub fn at_stage(self, stage: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            cause: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            NewsreelError::input("x")
                .to_string()
                .contains("input error:")
        );
        assert!(
            NewsreelError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            NewsreelError::summarization("x")
                .to_string()
                .contains("summarization unavailable:")
        );
        assert!(
            NewsreelError::synthesis("x")
                .to_string()
                .contains("speech synthesis unavailable:")
        );
        assert!(
            NewsreelError::encoding("x")
                .to_string()
                .contains("encoding failed:")
        );
    }

    #[test]
    fn plan_inconsistency_carries_expected_and_actual() {
        let err = NewsreelError::plan_inconsistency("schedule_total", "10.000", "9.000");
        let msg = err.to_string();
        assert!(msg.contains("schedule_total"));
        assert!(msg.contains("10.000"));
        assert!(msg.contains("9.000"));
    }

    #[test]
    fn at_stage_names_the_stage_and_keeps_the_cause() {
        let err = NewsreelError::summarization("backend down").at_stage("summarize");
        let msg = err.to_string();
        assert!(msg.contains("summarize stage failed:"));
        assert!(msg.contains("backend down"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = NewsreelError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
