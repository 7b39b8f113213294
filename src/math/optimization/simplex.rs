use num_traits::Float;
use std::fmt::Debug;

use crate::error::{OptimizeError, Result};

/// A set of N+1 vertices in N dimensions together with the objective value at each one.
///
/// `vertices[i]` and `values[i]` always describe the same point. A vertex is only ever
/// replaced together with its value, never resized or edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Simplex<T> {
    vertices: Vec<Vec<T>>,
    values: Vec<T>,
}

/// Positions of the best, worst and second-worst vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranking {
    /// Index of the lowest value
    pub low: usize,
    /// Index of the highest value
    pub high: usize,
    /// Index of the highest value other than `high`
    pub next_high: usize,
}

impl<T> Simplex<T>
where
    T: Float + Debug,
{
    /// Builds a simplex from already-evaluated vertices.
    ///
    /// # Errors
    ///
    /// Returns `OptimizeError::InvalidInput` when the vertices do not form an N+1 by N
    /// simplex, a coordinate is not finite, or the values do not match the vertices.
    pub fn from_parts(vertices: Vec<Vec<T>>, values: Vec<T>) -> Result<Self, T> {
        validate_vertices(&vertices)?;
        if values.len() != vertices.len() {
            return Err(OptimizeError::invalid_input(format!(
                "expected {} values, got {}",
                vertices.len(),
                values.len()
            )));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(OptimizeError::invalid_input(format!(
                "value {} is not finite: {:?}",
                i, values[i]
            )));
        }
        Ok(Self { vertices, values })
    }

    /// Number of coordinates per vertex (N).
    pub fn dimension(&self) -> usize {
        self.vertices.len() - 1
    }

    /// Number of vertices (N+1).
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[Vec<T>] {
        &self.vertices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn vertex(&self, index: usize) -> &[T] {
        &self.vertices[index]
    }

    pub fn value(&self, index: usize) -> T {
        self.values[index]
    }

    /// The lowest-valued vertex and its value. Ties go to the lowest index.
    pub fn best(&self) -> (&[T], T) {
        let low = self.rank().low;
        (&self.vertices[low], self.values[low])
    }

    pub fn into_parts(self) -> (Vec<Vec<T>>, Vec<T>) {
        (self.vertices, self.values)
    }

    /// Finds the best, worst and second-worst vertices.
    pub fn rank(&self) -> Ranking {
        rank_values(&self.values)
    }

    /// Relative spread `2|y_high - y_low| / (|y_high| + |y_low| + tiny)`.
    ///
    /// Every term is halved first, so neither the difference nor the denominator can
    /// overflow for finite values.
    pub fn relative_spread(&self, ranking: &Ranking, tiny: T) -> T {
        let two = T::one() + T::one();
        let high = self.values[ranking.high] / two;
        let low = self.values[ranking.low] / two;
        two * ((high - low).abs() / (high.abs() + low.abs() + tiny / two))
    }

    /// Coordinate-wise mean of every vertex except `skip`.
    pub fn centroid_excluding(&self, skip: usize) -> Vec<T> {
        let n = self.dimension();
        let mut centroid = vec![T::zero(); n];

        for (i, vertex) in self.vertices.iter().enumerate() {
            if i == skip {
                continue;
            }
            for (c, &x) in centroid.iter_mut().zip(vertex.iter()) {
                *c = *c + x;
            }
        }

        let count = T::from(n).unwrap_or_else(T::one);
        centroid.iter_mut().for_each(|c| *c = *c / count);
        centroid
    }

    pub(crate) fn replace(&mut self, index: usize, vertex: Vec<T>, value: T) {
        self.vertices[index] = vertex;
        self.values[index] = value;
    }

    /// Replaces every vertex except `keep`, in index order. `vertices` and `values` hold
    /// the N replacements.
    pub(crate) fn replace_all_except(&mut self, keep: usize, vertices: Vec<Vec<T>>, values: Vec<T>) {
        let slots = (0..self.len()).filter(|&i| i != keep);
        for ((i, vertex), value) in slots.zip(vertices).zip(values) {
            self.replace(i, vertex, value);
        }
    }
}

/// Checks that `vertices` is N+1 vertices of equal dimension N >= 1 with finite
/// coordinates, and returns N.
pub(crate) fn validate_vertices<T>(vertices: &[Vec<T>]) -> Result<usize, T>
where
    T: Float + Debug,
{
    if vertices.len() < 2 {
        return Err(OptimizeError::invalid_input(format!(
            "a simplex needs at least 2 vertices, got {}",
            vertices.len()
        )));
    }

    let n = vertices.len() - 1;
    for (i, vertex) in vertices.iter().enumerate() {
        if vertex.len() != n {
            return Err(OptimizeError::invalid_input(format!(
                "vertex {} has {} coordinates, expected {} for a simplex of {} vertices",
                i,
                vertex.len(),
                n,
                vertices.len()
            )));
        }
        if let Some(j) = vertex.iter().position(|x| !x.is_finite()) {
            return Err(OptimizeError::invalid_input(format!(
                "coordinate {} of vertex {} is not finite: {:?}",
                j, i, vertex[j]
            )));
        }
    }

    Ok(n)
}

// Every index is scanned, so the result never depends on how `next_high` is seeded.
// Ties resolve to the lowest index. Needs at least two values.
fn rank_values<T: Float>(values: &[T]) -> Ranking {
    let mut low = 0;
    let mut high = 0;
    for (i, &y) in values.iter().enumerate() {
        if y < values[low] {
            low = i;
        }
        if y > values[high] {
            high = i;
        }
    }

    let mut next_high = if high == 0 { 1 } else { 0 };
    for (i, &y) in values.iter().enumerate() {
        if i != high && y > values[next_high] {
            next_high = i;
        }
    }

    Ranking {
        low,
        high,
        next_high,
    }
}

/// Returns `wa * a + wb * b`, coordinate by coordinate.
pub(crate) fn combine<T: Float>(a: &[T], wa: T, b: &[T], wb: T) -> Vec<T> {
    a.iter().zip(b.iter()).map(|(&x, &y)| wa * x + wb * y).collect()
}
