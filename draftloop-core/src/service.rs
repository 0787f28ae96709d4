//! Seams to the external language-model services.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::ServiceError;
use crate::prompt::{GenerationOptions, SectionMode};

/// Produces a proposal draft from a prompt
pub trait DraftGenerator {
    fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String, ServiceError>;
}

/// Explains, cites or summarizes a section of the draft
pub trait SectionAnalyzer {
    fn analyze(&self, text: &str, mode: SectionMode) -> Result<String, ServiceError>;
}

/// Text to show for a service result: the content, or the failure in its place.
pub fn inline_result(result: Result<String, ServiceError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => format!("Error: {e}"),
    }
}

/// Bounded retries with exponential backoff for retryable failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn run<T>(
        &self,
        mut call: impl FnMut() -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;
        loop {
            match call() {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "service call failed, retrying");
                    thread::sleep(backoff);
                    backoff = backoff.saturating_mul(2);
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_backoff: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_retries_retryable_errors() {
        let calls = Cell::new(0);
        let result = quick(2).run(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(ServiceError::Timeout(30))
            } else {
                Ok("draft")
            }
        });
        assert_eq!(result, Ok("draft"));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_gives_up_after_limit() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick(1).run(|| {
            calls.set(calls.get() + 1);
            Err(ServiceError::Transport("reset".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_does_not_retry_permanent_errors() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick(3).run(|| {
            calls.set(calls.get() + 1);
            Err(ServiceError::Unauthorized("bad key".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_inline_result() {
        assert_eq!(inline_result(Ok("fine".into())), "fine");
        assert_eq!(
            inline_result(Err(ServiceError::Timeout(30))),
            "Error: request timed out after 30s"
        );
    }
}
