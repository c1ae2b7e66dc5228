// src/error.rs
use thiserror::Error;

/// Failures of the LLM filter client. Once the retry budget is spent the
/// orchestrator logs the error and treats the affected batch as yielding
/// no matches; it never fails the whole request.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("request to Groq API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Groq API returned status {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Groq API response contained no usable content (model: {model})")]
    EmptyResponse { model: String },

    #[error("Groq API request failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<FilterError>,
    },
}

impl FilterError {
    /// Transient failures worth another attempt; empty-content answers are
    /// retried too since the upstream occasionally returns hollow choices.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FilterError::RetriesExhausted { .. })
    }
}
