pub mod nelder_mead;
pub mod simplex;

use num_traits::Float;
use std::fmt::Debug;

use crate::error::{ObjectiveFailure, OptimizeError, Result};
use simplex::Simplex;

pub use nelder_mead::minimize as nelder_mead_minimize;

/// A scalar function of several real variables that can be minimized.
///
/// Implemented for any closure `Fn(&[T]) -> Result<T, ObjectiveFailure>`. Wrap infallible
/// functions in [`Infallible`].
pub trait Objective<T> {
    /// Evaluates the objective function at the given point.
    fn evaluate(&self, point: &[T]) -> std::result::Result<T, ObjectiveFailure>;
}

impl<T, F> Objective<T> for F
where
    F: Fn(&[T]) -> std::result::Result<T, ObjectiveFailure>,
{
    fn evaluate(&self, point: &[T]) -> std::result::Result<T, ObjectiveFailure> {
        self(point)
    }
}

/// Adapter for objective functions that never fail.
///
/// Non-finite return values are still rejected by the optimizer.
#[derive(Debug, Clone, Copy)]
pub struct Infallible<F>(pub F);

impl<T, F> Objective<T> for Infallible<F>
where
    F: Fn(&[T]) -> T,
{
    fn evaluate(&self, point: &[T]) -> std::result::Result<T, ObjectiveFailure> {
        Ok((self.0)(point))
    }
}

/// Which counter `max_iterations` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Budget {
    /// Completed update steps. A shrink counts as one step.
    #[default]
    Iterations,
    /// Objective calls, including the initial evaluation of every vertex.
    Evaluations,
}

/// Configuration options for the simplex optimizer.
///
/// There is no `Default`: the iteration budget must always be chosen by the caller.
#[derive(Debug, Clone)]
pub struct OptimizationConfig<T>
where
    T: Float + Debug,
{
    /// Maximum number of iterations (or evaluations, see `budget`)
    pub max_iterations: usize,
    /// Fractional convergence tolerance on the spread of objective values
    pub tolerance: T,
    /// Added to the denominator of the relative spread so that it stays finite at zero
    pub tiny: T,
    /// Counter bounded by `max_iterations`
    pub budget: Budget,
}

impl<T> OptimizationConfig<T>
where
    T: Float + Debug,
{
    /// Creates a configuration with the given budget, `tolerance = 1e-10` and `tiny = 1e-10`.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations,
            tolerance: literal(1e-10),
            tiny: literal(1e-10),
            budget: Budget::Iterations,
        }
    }

    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_tiny(mut self, tiny: T) -> Self {
        self.tiny = tiny;
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Checks that every setting is usable.
    pub fn validate(&self) -> Result<(), T> {
        if self.max_iterations == 0 {
            return Err(OptimizeError::invalid_input(
                "max_iterations must be positive",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > T::zero()) {
            return Err(OptimizeError::invalid_input(format!(
                "tolerance must be positive and finite, got {:?}",
                self.tolerance
            )));
        }
        if !(self.tiny.is_finite() && self.tiny > T::zero()) {
            return Err(OptimizeError::invalid_input(format!(
                "tiny must be positive and finite, got {:?}",
                self.tiny
            )));
        }
        Ok(())
    }
}

/// How a run ended, or that it is still going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Converged,
    IterationLimitExceeded,
    Cancelled,
    EvaluationFailed,
}

/// Result of an optimization process.
#[derive(Debug, Clone)]
pub struct OptimizationResult<T> {
    /// Final simplex and the objective value at each vertex
    pub simplex: Simplex<T>,
    /// Number of update steps performed
    pub iterations: usize,
    /// Number of objective evaluations, including the initial ones
    pub evaluations: usize,
    /// Why the run stopped
    pub status: Status,
}

impl<T> OptimizationResult<T>
where
    T: Float + Debug,
{
    /// The lowest-valued vertex.
    pub fn best_point(&self) -> &[T] {
        self.simplex.best().0
    }

    pub fn best_value(&self) -> T {
        self.simplex.best().1
    }

    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }

    /// Turns a run that stopped without converging into an error.
    pub fn into_converged(self) -> Result<Self, T> {
        match self.status {
            Status::IterationLimitExceeded => Err(OptimizeError::IterationLimitExceeded {
                result: Box::new(self),
            }),
            Status::Cancelled => Err(OptimizeError::Cancelled {
                result: Box::new(self),
            }),
            _ => Ok(self),
        }
    }
}

// Every `Float` type can represent the small decimal constants used here.
pub(crate) fn literal<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::epsilon)
}
