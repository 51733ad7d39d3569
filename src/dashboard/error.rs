//! Dashboard error types

use thiserror::Error;

use crate::client::ClientError;

/// Errors surfaced by dashboard loading and step completion
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The profile could not be fetched; there is nothing to render
    #[error("Failed to load profile: {0}")]
    ProfileUnavailable(#[source] ClientError),

    /// A submission for this step is still in flight
    #[error("Step {0} is already being updated")]
    StepBusy(usize),

    #[error("Step {0} is not part of the learning path")]
    UnknownStep(usize),

    #[error("Invalid assessment: {0}")]
    InvalidAssessment(String),

    /// The completion POST failed; local progress is unchanged
    #[error("Failed to submit progress for step {step}: {source}")]
    Submission {
        step: usize,
        #[source]
        source: ClientError,
    },
}

impl DashboardError {
    /// Whether the learner can simply try the same action again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DashboardError::ProfileUnavailable(_)
                | DashboardError::StepBusy(_)
                | DashboardError::Submission { .. }
        )
    }
}

/// Result type for dashboard operations
pub type DashboardResult<T> = Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::Submission {
            step: 2,
            source: ClientError::Unavailable,
        };
        assert_eq!(
            err.to_string(),
            "Failed to submit progress for step 2: Backend unavailable"
        );
        assert!(err.is_retryable());
        assert!(!DashboardError::UnknownStep(9).is_retryable());
    }
}
