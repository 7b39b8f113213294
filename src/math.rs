pub mod optimization;

pub use optimization::{
    nelder_mead::SimplexOptimizer, nelder_mead_minimize, Budget, Infallible, Objective,
    OptimizationConfig, OptimizationResult, Status,
};
