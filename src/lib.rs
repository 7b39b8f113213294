pub mod error;
pub mod math;

pub use error::{EvaluationFailure, ObjectiveFailure, OptimizeError, Result};
pub use math::optimization::nelder_mead::{Move, SimplexOptimizer, Step};
pub use math::optimization::simplex::{Ranking, Simplex};
pub use math::{
    nelder_mead_minimize, Budget, Infallible, Objective, OptimizationConfig, OptimizationResult,
    Status,
};
