//! Workflow error types.
//!
//! Errors split into two channels. [`WorkflowError`] is the fatal channel:
//! any value of it aborts the run and propagates to the caller unchanged.
//! [`SourceError`] classifies collaborator failures structurally so a step
//! can decide which of them are recoverable ([`SourceError::RateLimited`])
//! before they ever become fatal.

use crate::step::StepId;
use thiserror::Error;

/// Errors that abort a workflow run.
///
/// # Non-Exhaustive
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code. When matching
/// on this error, always include a wildcard pattern.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WorkflowError {
    /// A step failed during execution.
    #[error("Step failed: {step_id}, details: {details}")]
    StepError {
        /// The step that failed.
        step_id: StepId,
        /// Details about the failure.
        details: String,
    },

    /// A context did not satisfy a declared shape at a step boundary.
    #[error("Shape violation ({scope}): {details}")]
    ShapeViolation {
        /// Which boundary was violated, e.g. `input of step 'fetch-prices'`.
        scope: String,
        /// Details about the violation.
        details: String,
    },

    /// A step asked the context for a field that is absent or mistyped.
    ///
    /// The engine validates each step's input shape before `execute`, so
    /// this is only reachable when a step reads outside its declared shape.
    #[error("Required context field '{0}' is missing or has the wrong type")]
    MissingField(String),

    /// The workflow configuration is invalid.
    ///
    /// Returned at build time, before any run: an unsatisfiable step input,
    /// a duplicate step id, or missing collaborator configuration.
    #[error("Invalid workflow configuration: {0}")]
    Configuration(String),

    /// A collaborator call failed fatally inside a step.
    #[error("Collaborator call failed in step '{step_id}': {source}")]
    Collaborator {
        /// The step whose collaborator call failed.
        step_id: StepId,
        /// The classified collaborator failure.
        #[source]
        source: SourceError,
    },
}

/// Classified failure from an external collaborator.
///
/// Rate limiting gets its own variant so consuming steps can branch on it
/// without inspecting error text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The upstream service refused the request because of rate limiting.
    #[error("rate limited by upstream service")]
    RateLimited,

    /// The upstream service answered with a non-success status.
    #[error("unexpected status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response arrived but could not be interpreted.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Returns `true` for the recoverable rate-limit classification.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SourceError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = WorkflowError::StepError {
            step_id: StepId::new("fetch-prices"),
            details: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "Step failed: fetch-prices, details: boom");

        let error = WorkflowError::ShapeViolation {
            scope: "input of step 'analyze-or-skip'".to_string(),
            details: "missing required field 'tweets'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Shape violation (input of step 'analyze-or-skip'): missing required field 'tweets'"
        );
    }

    #[test]
    fn test_source_error_classification() {
        assert!(SourceError::RateLimited.is_rate_limited());
        assert!(!SourceError::Status {
            code: 500,
            body: "oops".to_string(),
        }
        .is_rate_limited());
    }

    #[test]
    fn test_source_error_display() {
        let error = SourceError::Status {
            code: 404,
            body: "not found".to_string(),
        };
        assert_eq!(error.to_string(), "unexpected status 404: not found");
        assert_eq!(
            SourceError::RateLimited.to_string(),
            "rate limited by upstream service"
        );
    }
}
