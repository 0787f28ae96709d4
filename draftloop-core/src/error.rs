use thiserror::Error;

/// Failures of the review operations.
///
/// None of these are fatal: the front end shows the message and the document
/// keeps its previous state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Required input was missing or blank.
    #[error("{0}")]
    Validation(String),

    /// The text to remove or replace is not in the draft.
    #[error("text not found in draft: \"{0}\"")]
    NotFound(String),

    #[error("no annotation at index {0}")]
    NoSuchAnnotation(usize),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ReviewError {
    pub(crate) fn empty_input() -> Self {
        Self::Validation("empty input".to_string())
    }
}

/// Failure of an external generation or analysis call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Timeout(_) | ServiceError::Transport(_) => true,
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            ServiceError::Unauthorized(_) | ServiceError::Malformed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ServiceError::Timeout(30).is_retryable());
        assert!(ServiceError::Status { status: 503, body: String::new() }.is_retryable());
        assert!(ServiceError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!ServiceError::Status { status: 400, body: String::new() }.is_retryable());
        assert!(!ServiceError::Unauthorized("missing key".into()).is_retryable());
    }

    #[test]
    fn test_service_error_message_passes_through() {
        let err: ReviewError = ServiceError::Timeout(30).into();
        assert_eq!(err.to_string(), "request timed out after 30s");
    }
}
