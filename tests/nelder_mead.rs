use amoeba::{
    nelder_mead_minimize, Budget, Infallible, Objective, ObjectiveFailure, OptimizationConfig,
    OptimizeError, SimplexOptimizer, Status,
};
use approx::assert_abs_diff_eq;
use std::cell::Cell;

// Test function: f(x) = sum of x_i^2, defined only where every x_i >= lower
struct BoundedSphere {
    lower: f64,
}

impl Objective<f64> for BoundedSphere {
    fn evaluate(&self, point: &[f64]) -> Result<f64, ObjectiveFailure> {
        if point.iter().any(|&x| x < self.lower) {
            return Err(ObjectiveFailure::new(format!("below lower bound {}", self.lower)));
        }
        Ok(point.iter().map(|x| x * x).sum())
    }
}

fn shifted_unit_simplex(n: usize, shift: f64) -> Vec<Vec<f64>> {
    let mut vertices = vec![vec![shift; n]];
    for i in 0..n {
        let mut vertex = vec![shift; n];
        vertex[i] += 1.0;
        vertices.push(vertex);
    }
    vertices
}

#[test]
fn test_offset_bowl_end_to_end() {
    let f = Infallible(|p: &[f64]| (p[0] - 3.0).powi(2) + (p[1] + 2.0).powi(2));
    let simplex = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
    let config = OptimizationConfig::new(200).with_tolerance(1e-8);

    let result = nelder_mead_minimize(f, simplex, config).unwrap();

    assert_eq!(result.status, Status::Converged);
    assert_eq!(result.simplex.len(), 3);
    assert_abs_diff_eq!(result.best_point()[0], 3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(result.best_point()[1], -2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(result.best_value(), 0.0, epsilon = 1e-12);
    assert!(result.evaluations >= 3 + result.iterations);
}

#[test]
fn test_sphere_in_four_dimensions() {
    let objective = BoundedSphere { lower: -10.0 };
    let config = OptimizationConfig::new(1000);

    let result = SimplexOptimizer::new(objective, shifted_unit_simplex(4, 1.0), config)
        .unwrap()
        .run()
        .unwrap();

    assert!(result.is_converged());
    for &x in result.best_point() {
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-6);
    }
    assert!(result
        .simplex
        .vertices()
        .iter()
        .all(|vertex| vertex.len() == 4));
}

#[test]
fn test_objective_failure_stops_run() {
    // The first reflection from this simplex lands on (0.5, 1.5).
    let objective = BoundedSphere { lower: 0.75 };
    let simplex = vec![vec![1.0, 1.0], vec![1.5, 1.0], vec![1.0, 1.5]];
    let config = OptimizationConfig::new(100);

    let err = nelder_mead_minimize(objective, simplex.clone(), config).unwrap_err();

    match &err {
        OptimizeError::Evaluation {
            point, iteration, ..
        } => {
            assert_eq!(point, &vec![0.5, 1.5]);
            assert_eq!(*iteration, 0);
        }
        other => panic!("expected an evaluation error, got {:?}", other),
    }
    let last = err.simplex().unwrap();
    assert_eq!(last.vertices(), simplex.as_slice());
    assert!(err.to_string().contains("below lower bound 0.75"));
}

#[test]
fn test_evaluation_count_matches_objective_calls() {
    let calls = Cell::new(0usize);
    let f = Infallible(|p: &[f64]| {
        calls.set(calls.get() + 1);
        (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0].powi(2)).powi(2)
    });
    let simplex = vec![vec![-1.2, 1.0], vec![-1.0, 1.0], vec![-1.2, 1.2]];
    let config = OptimizationConfig::new(2000).with_budget(Budget::Evaluations);

    let result = nelder_mead_minimize(f, simplex, config).unwrap();

    assert!(result.is_converged());
    assert_eq!(result.evaluations, calls.get());
    assert!(result.evaluations <= 2000 + 4);
}

#[test]
fn test_constant_objective_is_safe() {
    let f = Infallible(|_: &[f64]| 0.0);
    let simplex = shifted_unit_simplex(3, 0.0);

    let result = nelder_mead_minimize(f, simplex, OptimizationConfig::new(50)).unwrap();

    assert!(result.is_converged());
    assert_eq!(result.iterations, 0);
    assert_eq!(result.evaluations, 4);
}

#[test]
fn test_into_converged_passes_through_converged_runs() {
    let f = Infallible(|p: &[f64]| (p[0] + 1.0).powi(2));
    let result = nelder_mead_minimize(f, vec![vec![0.0], vec![0.5]], OptimizationConfig::new(500))
        .unwrap()
        .into_converged()
        .unwrap();
    assert_abs_diff_eq!(result.best_point()[0], -1.0, epsilon = 1e-6);
}
