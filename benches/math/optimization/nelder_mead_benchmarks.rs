use amoeba::{nelder_mead_minimize, Infallible, OptimizationConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn sphere(x: &[f64]) -> f64 {
    x.iter().map(|xi| xi * xi).sum()
}

fn rosenbrock(x: &[f64]) -> f64 {
    x.windows(2)
        .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
        .sum()
}

fn starting_simplex(n: usize) -> Vec<Vec<f64>> {
    let mut vertices = vec![vec![-1.0; n]];
    for i in 0..n {
        let mut vertex = vec![-1.0; n];
        vertex[i] += 0.5;
        vertices.push(vertex);
    }
    vertices
}

fn bench_nelder_mead(c: &mut Criterion) {
    let mut group = c.benchmark_group("nelder_mead");

    for &n in &[2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("sphere", n), &n, |b, &n| {
            b.iter(|| {
                let config = OptimizationConfig::new(5000);
                nelder_mead_minimize(Infallible(sphere), black_box(starting_simplex(n)), config)
            })
        });
        group.bench_with_input(BenchmarkId::new("rosenbrock", n), &n, |b, &n| {
            b.iter(|| {
                let config = OptimizationConfig::new(5000);
                nelder_mead_minimize(Infallible(rosenbrock), black_box(starting_simplex(n)), config)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_nelder_mead);
criterion_main!(benches);
