//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{QuestionError, QuestionId, ScoreReportError, SettingsError};
use storage::repository::SourceError;

/// Errors emitted by the quiz session engine.
///
/// Every variant leaves the session exactly as it was before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is still loading")]
    NotLoaded,
    #[error("session questions were already loaded")]
    AlreadyLoaded,
    #[error("session already submitted")]
    Submitted,
    #[error("session has not been submitted")]
    NotSubmitted,
    #[error("question {0} is not part of this session")]
    UnknownQuestion(QuestionId),
    #[error("cannot submit: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Report(#[from] ScoreReportError),
}

/// Errors emitted by `RemoteQuestionSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteSourceError {
    #[error("invalid question source URL: {0}")]
    InvalidBaseUrl(String),
    #[error("question source request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl From<RemoteSourceError> for SourceError {
    fn from(err: RemoteSourceError) -> Self {
        match err {
            RemoteSourceError::Decode(e) => SourceError::Serialization(e.to_string()),
            other => SourceError::Unavailable(other.to_string()),
        }
    }
}
