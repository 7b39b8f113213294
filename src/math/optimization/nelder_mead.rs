use log::{debug, trace, warn};
use num_traits::Float;
use std::fmt::Debug;

use crate::error::{EvaluationFailure, OptimizeError, Result};
use crate::math::optimization::simplex::{combine, validate_vertices, Simplex};
use crate::math::optimization::{Budget, Objective, OptimizationConfig, OptimizationResult, Status};

/// The geometric move made by one update step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// The worst vertex was replaced by its reflection through the centroid.
    Reflect,
    /// The reflection was extended further along the same ray.
    Expand,
    /// The worst vertex was pulled halfway toward the centroid.
    Contract,
    /// Every vertex except the best was pulled halfway toward the best.
    Shrink,
}

/// Outcome of [`SimplexOptimizer::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One update step was made, costing `evaluations` objective calls.
    Moved { kind: Move, evaluations: usize },
    /// The run has ended; no work was done.
    Terminated(Status),
}

// Reflection (alpha), expansion (gamma), contraction (beta) and shrink (sigma) coefficients.
struct Coefficients<T> {
    alpha: T,
    gamma: T,
    beta: T,
    sigma: T,
}

impl<T: Float> Coefficients<T> {
    fn standard() -> Self {
        let two = T::one() + T::one();
        Self {
            alpha: T::one(),
            gamma: two,
            beta: T::one() / two,
            sigma: T::one() / two,
        }
    }
}

/// Nelder-Mead downhill simplex optimizer.
///
/// Holds the objective, the simplex and the run counters. The objective is called one
/// point at a time. `iterations` counts update steps and `evaluations` counts objective
/// calls; [`Budget`] selects which of the two `max_iterations` bounds.
///
/// # Examples
///
/// ```
/// use amoeba::math::optimization::nelder_mead::SimplexOptimizer;
/// use amoeba::math::optimization::{Infallible, OptimizationConfig};
///
/// let f = Infallible(|p: &[f64]| (p[0] - 3.0).powi(2) + (p[1] + 2.0).powi(2));
/// let simplex = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
/// let config = OptimizationConfig::new(200).with_tolerance(1e-8);
///
/// let result = SimplexOptimizer::new(f, simplex, config).unwrap().run().unwrap();
/// assert!(result.is_converged());
/// assert!((result.best_point()[0] - 3.0).abs() < 1e-6);
/// ```
pub struct SimplexOptimizer<T, F>
where
    T: Float + Debug,
{
    objective: F,
    config: OptimizationConfig<T>,
    coefficients: Coefficients<T>,
    dimension: usize,
    initial: Option<Vec<Vec<T>>>,
    simplex: Option<Simplex<T>>,
    iterations: usize,
    evaluations: usize,
    status: Status,
    failure: Option<OptimizeError<T>>,
}

impl<T, F> SimplexOptimizer<T, F>
where
    T: Float + Debug,
    F: Objective<T>,
{
    /// Validates the initial simplex and configuration. The objective is not called.
    ///
    /// # Arguments
    ///
    /// * `objective` - The function to minimize
    /// * `vertices` - N+1 starting vertices, each with N finite coordinates
    /// * `config` - Budget, tolerance and epsilon for the run
    ///
    /// # Errors
    ///
    /// Returns `OptimizeError::InvalidInput` for a malformed simplex or configuration.
    pub fn new(objective: F, vertices: Vec<Vec<T>>, config: OptimizationConfig<T>) -> Result<Self, T> {
        config.validate()?;
        let dimension = validate_vertices(&vertices)?;

        Ok(Self {
            objective,
            config,
            coefficients: Coefficients::standard(),
            dimension,
            initial: Some(vertices),
            simplex: None,
            iterations: 0,
            evaluations: 0,
            status: Status::Running,
            failure: None,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// The current simplex, once the initial vertices have been evaluated.
    pub fn simplex(&self) -> Option<&Simplex<T>> {
        self.simplex.as_ref()
    }

    /// Evaluates the objective at every initial vertex. Does nothing if already started.
    pub fn start(&mut self) -> Result<(), T> {
        let Some(vertices) = self.initial.take() else {
            return Ok(());
        };

        debug!(
            "starting simplex run: dimension={}, tolerance={:?}, max_iterations={} ({:?})",
            self.dimension, self.config.tolerance, self.config.max_iterations, self.config.budget
        );

        let mut values = Vec::with_capacity(vertices.len());
        for vertex in &vertices {
            values.push(self.evaluate(vertex)?);
        }
        self.simplex = Some(Simplex::from_parts(vertices, values)?);
        Ok(())
    }

    /// Performs one update step, starting the run first if needed.
    pub fn step(&mut self) -> Result<Step, T> {
        self.advance(&mut || false)
    }

    /// Runs until the simplex converges or the budget is spent.
    ///
    /// # Returns
    ///
    /// The final simplex and counters. Running out of budget is reported through
    /// `Status::IterationLimitExceeded`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns `OptimizeError::Evaluation` if the objective fails or returns a non-finite
    /// value. The error carries the last consistent simplex.
    pub fn run(self) -> Result<OptimizationResult<T>, T> {
        self.run_until(|| false)
    }

    /// Like [`run`](Self::run), but checks `should_stop` before every move and ends with
    /// `Status::Cancelled` once it returns true.
    ///
    /// If an earlier [`step`](Self::step) already failed, that evaluation error is
    /// returned again.
    pub fn run_until<S>(mut self, mut should_stop: S) -> Result<OptimizationResult<T>, T>
    where
        S: FnMut() -> bool,
    {
        loop {
            if let Step::Terminated(status) = self.advance(&mut should_stop)? {
                return self.into_result(status);
            }
        }
    }

    fn advance(&mut self, should_stop: &mut dyn FnMut() -> bool) -> Result<Step, T> {
        if self.status != Status::Running {
            return Ok(Step::Terminated(self.status));
        }
        self.start()?;
        let Some(simplex) = self.simplex.as_ref() else {
            return Ok(Step::Terminated(self.status));
        };

        let ranking = simplex.rank();
        let spread = simplex.relative_spread(&ranking, self.config.tiny);
        trace!(
            "iteration {}: best={:?} worst={:?} rtol={:?}",
            self.iterations,
            simplex.value(ranking.low),
            simplex.value(ranking.high),
            spread
        );

        if spread < self.config.tolerance {
            return Ok(self.finish(Status::Converged));
        }
        if self.budget_spent() >= self.config.max_iterations {
            warn!(
                "budget of {} {:?} spent before convergence (rtol={:?})",
                self.config.max_iterations, self.config.budget, spread
            );
            return Ok(self.finish(Status::IterationLimitExceeded));
        }
        if should_stop() {
            return Ok(self.finish(Status::Cancelled));
        }

        let centroid = simplex.centroid_excluding(ranking.high);
        let worst = simplex.vertex(ranking.high).to_vec();
        let low_value = simplex.value(ranking.low);
        let next_high_value = simplex.value(ranking.next_high);
        let mut high_value = simplex.value(ranking.high);
        let Coefficients {
            alpha, gamma, beta, ..
        } = self.coefficients;
        let calls_before = self.evaluations;

        let reflected = combine(&centroid, T::one() + alpha, &worst, -alpha);
        let reflected_value = self.evaluate(&reflected)?;

        let kind = if reflected_value <= low_value {
            let expanded = combine(&reflected, gamma, &centroid, T::one() - gamma);
            let expanded_value = self.evaluate(&expanded)?;
            if expanded_value < low_value {
                self.accept(ranking.high, expanded, expanded_value);
                Move::Expand
            } else {
                self.accept(ranking.high, reflected, reflected_value);
                Move::Reflect
            }
        } else if reflected_value >= next_high_value {
            let mut contract_from = worst;
            if reflected_value < high_value {
                contract_from = reflected.clone();
                high_value = reflected_value;
                self.accept(ranking.high, reflected, reflected_value);
            }

            let contracted = combine(&contract_from, beta, &centroid, T::one() - beta);
            let contracted_value = self.evaluate(&contracted)?;
            if contracted_value < high_value {
                self.accept(ranking.high, contracted, contracted_value);
                Move::Contract
            } else {
                self.shrink(ranking.low)?;
                Move::Shrink
            }
        } else {
            self.accept(ranking.high, reflected, reflected_value);
            Move::Reflect
        };

        self.iterations += 1;
        let evaluations = self.evaluations - calls_before;
        trace!("iteration {}: {:?} ({} evaluations)", self.iterations, kind, evaluations);
        Ok(Step::Moved { kind, evaluations })
    }

    // Midpoints toward the best vertex are all evaluated before any of them is written
    // back, so a failure leaves the simplex as it was before the shrink.
    fn shrink(&mut self, low: usize) -> Result<(), T> {
        let sigma = self.coefficients.sigma;
        let (targets, best) = match self.simplex.as_ref() {
            Some(simplex) => (
                simplex
                    .vertices()
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != low)
                    .map(|(_, vertex)| vertex.clone())
                    .collect::<Vec<_>>(),
                simplex.vertex(low).to_vec(),
            ),
            None => return Ok(()),
        };

        let mut vertices = Vec::with_capacity(targets.len());
        let mut values = Vec::with_capacity(targets.len());
        for target in &targets {
            let midpoint = combine(target, sigma, &best, T::one() - sigma);
            values.push(self.evaluate(&midpoint)?);
            vertices.push(midpoint);
        }

        if let Some(simplex) = self.simplex.as_mut() {
            simplex.replace_all_except(low, vertices, values);
        }
        Ok(())
    }

    fn accept(&mut self, index: usize, vertex: Vec<T>, value: T) {
        if let Some(simplex) = self.simplex.as_mut() {
            simplex.replace(index, vertex, value);
        }
    }

    // Overflowed candidates are rejected without calling the objective, so they do not
    // count as evaluations.
    fn evaluate(&mut self, point: &[T]) -> Result<T, T> {
        let failure = match point.iter().position(|x| !x.is_finite()) {
            Some(index) => EvaluationFailure::NonFiniteCoordinate { index },
            None => {
                self.evaluations += 1;
                match self.objective.evaluate(point) {
                    Ok(value) if value.is_finite() => return Ok(value),
                    Ok(value) => EvaluationFailure::NonFinite(value),
                    Err(err) => EvaluationFailure::Rejected(err),
                }
            }
        };

        warn!(
            "objective evaluation {} failed at {:?} (iteration {}): {}",
            self.evaluations, point, self.iterations, failure
        );
        self.status = Status::EvaluationFailed;
        let err = OptimizeError::Evaluation {
            point: point.to_vec(),
            failure,
            iteration: self.iterations,
            evaluations: self.evaluations,
            simplex: self.simplex.clone().map(Box::new),
        };
        self.failure = Some(err.clone());
        Err(err)
    }

    fn budget_spent(&self) -> usize {
        match self.config.budget {
            Budget::Iterations => self.iterations,
            Budget::Evaluations => self.evaluations,
        }
    }

    fn finish(&mut self, status: Status) -> Step {
        self.status = status;
        debug!(
            "simplex run finished: {:?} after {} iterations, {} evaluations",
            status, self.iterations, self.evaluations
        );
        Step::Terminated(status)
    }

    // Every status other than `EvaluationFailed` is set by `finish`, which only runs after
    // the initial vertices have been evaluated, so a missing simplex always comes with a
    // stored failure.
    fn into_result(self, status: Status) -> Result<OptimizationResult<T>, T> {
        match (self.failure, self.simplex) {
            (Some(err), _) => Err(err),
            (None, Some(simplex)) => Ok(OptimizationResult {
                simplex,
                iterations: self.iterations,
                evaluations: self.evaluations,
                status,
            }),
            (None, None) => unreachable!("run ended with {:?} before the simplex was evaluated", status),
        }
    }
}

/// Minimizes an objective function using the Nelder-Mead simplex method.
///
/// The Nelder-Mead method is a derivative-free optimization algorithm that uses
/// a simplex of n+1 points to explore the n-dimensional space and find a minimum.
///
/// # Arguments
///
/// * `f` - The objective function to minimize
/// * `vertices` - The N+1 vertices of the starting simplex
/// * `config` - Configuration options for the optimization process
///
/// # Returns
///
/// Returns an `OptimizationResult` containing the final simplex and run statistics.
///
/// # Examples
///
/// ```
/// use amoeba::math::optimization::{Infallible, OptimizationConfig};
/// use amoeba::math::optimization::nelder_mead::minimize;
///
/// let f = Infallible(|p: &[f64]| p.iter().map(|x| x * x).sum::<f64>());
/// let simplex = vec![vec![1.0, 1.0], vec![1.5, 1.0], vec![1.0, 1.5]];
/// let config = OptimizationConfig::new(1000);
///
/// let result = minimize(f, simplex, config).unwrap();
/// assert!(result.is_converged());
/// ```
pub fn minimize<T, F>(f: F, vertices: Vec<Vec<T>>, config: OptimizationConfig<T>) -> Result<OptimizationResult<T>, T>
where
    T: Float + Debug,
    F: Objective<T>,
{
    SimplexOptimizer::new(f, vertices, config)?.run()
}
