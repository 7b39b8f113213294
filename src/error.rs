use thiserror::Error;

use crate::math::optimization::simplex::Simplex;
use crate::math::optimization::OptimizationResult;

/// Crate-wide result type, defaulting to `f64` coordinates.
pub type Result<R, T = f64> = std::result::Result<R, OptimizeError<T>>;

/// Reason an objective function gives for refusing to evaluate a point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ObjectiveFailure {
    reason: String,
}

impl ObjectiveFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<&str> for ObjectiveFailure {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

impl From<String> for ObjectiveFailure {
    fn from(reason: String) -> Self {
        Self::new(reason)
    }
}

/// Why a single objective evaluation was not accepted into the simplex.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationFailure<T> {
    /// The objective signalled a failure itself.
    #[error("objective failed: {0}")]
    Rejected(ObjectiveFailure),
    /// The objective returned NaN or an infinity.
    #[error("objective returned a non-finite value ({0:?})")]
    NonFinite(T),
    /// A candidate point overflowed; the objective was not called.
    #[error("coordinate {index} of the candidate point is not finite")]
    NonFiniteCoordinate { index: usize },
}

/// Errors raised by the simplex optimizer.
#[derive(Debug, Clone, Error)]
pub enum OptimizeError<T> {
    /// Malformed initial simplex or configuration. Raised before the objective is called.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// An objective evaluation failed or was not finite. `simplex` holds the last
    /// consistent simplex, or `None` when the failure happened while evaluating the
    /// initial vertices.
    #[error("evaluation failed at {point:?} (iteration {iteration}, evaluation {evaluations}): {failure}")]
    Evaluation {
        point: Vec<T>,
        failure: EvaluationFailure<T>,
        iteration: usize,
        evaluations: usize,
        simplex: Option<Box<Simplex<T>>>,
    },

    /// The budget ran out before the simplex converged.
    #[error("iteration limit exceeded after {} iterations ({} evaluations)", .result.iterations, .result.evaluations)]
    IterationLimitExceeded { result: Box<OptimizationResult<T>> },

    /// The caller stopped the run before the simplex converged.
    #[error("run cancelled after {} iterations", .result.iterations)]
    Cancelled { result: Box<OptimizationResult<T>> },
}

impl<T> OptimizeError<T> {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        OptimizeError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, OptimizeError::InvalidInput { .. })
    }

    /// Last consistent simplex carried by the error, if any.
    pub fn simplex(&self) -> Option<&Simplex<T>> {
        match self {
            OptimizeError::InvalidInput { .. } => None,
            OptimizeError::Evaluation { simplex, .. } => simplex.as_deref(),
            OptimizeError::IterationLimitExceeded { result } | OptimizeError::Cancelled { result } => {
                Some(&result.simplex)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_failure_from_str() {
        let failure: ObjectiveFailure = "out of domain".into();
        assert_eq!(failure.reason(), "out of domain");
        assert_eq!(failure.to_string(), "out of domain");
    }

    #[test]
    fn test_evaluation_error_message() {
        let err: OptimizeError<f64> = OptimizeError::Evaluation {
            point: vec![1.0, 2.0],
            failure: EvaluationFailure::NonFinite(f64::NAN),
            iteration: 4,
            evaluations: 11,
            simplex: None,
        };
        let message = err.to_string();
        assert!(message.contains("[1.0, 2.0]"));
        assert!(message.contains("iteration 4"));
        assert!(message.contains("non-finite"));
        assert!(err.simplex().is_none());
    }

    #[test]
    fn test_non_finite_coordinate_message() {
        let failure: EvaluationFailure<f64> = EvaluationFailure::NonFiniteCoordinate { index: 1 };
        assert_eq!(failure.to_string(), "coordinate 1 of the candidate point is not finite");
    }

    #[test]
    fn test_invalid_input_message() {
        let err: OptimizeError<f64> = OptimizeError::invalid_input("empty simplex");
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "invalid input: empty simplex");
    }
}
