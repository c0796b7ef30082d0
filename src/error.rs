//! Error taxonomy for the summarization pipeline.
//!
//! Every failure is terminal for the current invocation. The `Display` text of
//! each variant is what ends up on the banner and in the `{ error }` reply.

use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a [`SummaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InsufficientContent,
    MissingCredential,
    MissingPrompt,
    ApiError,
    MalformedResponse,
    NetworkError,
    Timeout,
    Busy,
    Storage,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummaError {
    #[error("Could not find enough content on this page to summarize.")]
    InsufficientContent,
    #[error("API key not configured")]
    MissingCredential,
    #[error("prompt must not be empty")]
    MissingPrompt,
    #[error("{status} - {message}")]
    Api { status: u16, message: String },
    #[error("No summary found in API response: {0}")]
    MalformedResponse(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("a summarization is already in progress on this page")]
    Busy,
    #[error("settings store error: {0}")]
    Settings(String),
}

impl SummaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SummaError::InsufficientContent => ErrorKind::InsufficientContent,
            SummaError::MissingCredential => ErrorKind::MissingCredential,
            SummaError::MissingPrompt => ErrorKind::MissingPrompt,
            SummaError::Api { .. } => ErrorKind::ApiError,
            SummaError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            SummaError::Network(_) => ErrorKind::NetworkError,
            SummaError::Timeout(_) => ErrorKind::Timeout,
            SummaError::Busy => ErrorKind::Busy,
            SummaError::Settings(_) => ErrorKind::Storage,
        }
    }
}

impl From<sled::Error> for SummaError {
    fn from(err: sled::Error) -> Self {
        SummaError::Settings(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_is_status_and_provider_text() {
        let err = SummaError::Api {
            status: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "429 - rate limited");
        assert_eq!(err.kind(), ErrorKind::ApiError);
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = SummaError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "request timed out after 30s");
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }
}
