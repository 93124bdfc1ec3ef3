//! Brute-force k-nearest-neighbor search over movie rows.
//!
//! ## Algorithm
//! 1. Look up the query movie's row (its ratings across all users)
//! 2. Compute the distance from that row to every other row, in parallel
//! 3. Keep the k closest with a bounded max-heap
//! 4. Map dense indices back to movie IDs
//!
//! Ties on distance go to the lower dense index, which is the lower movie ID.
//! NaN distances sort after every real distance. Distances are collected in
//! index order before selection, so the parallel scan returns exactly what a
//! sequential one would.

use crate::error::{RecommendError, Result};
use crate::matrix::{RatingMatrix, SparseRow};
use data_loader::MovieId;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Distance between two sparse rows; smaller means more similar.
pub trait DistanceMetric: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn distance(&self, a: SparseRow<'_>, b: SparseRow<'_>) -> f64;
}

/// Built-in metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// 1 - cosine similarity; 1.0 when either row is all zeros
    #[default]
    Cosine,
    Euclidean,
    Manhattan,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" | "l2" => Ok(Metric::Euclidean),
            "manhattan" | "l1" | "cityblock" => Ok(Metric::Manhattan),
            _ => Err(RecommendError::UnsupportedMetric {
                name: s.to_string(),
            }),
        }
    }
}

impl DistanceMetric for Metric {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn distance(&self, a: SparseRow<'_>, b: SparseRow<'_>) -> f64 {
        match self {
            Metric::Cosine => cosine_distance(a, b),
            Metric::Euclidean => {
                let mut sum = 0.0;
                for_each_pair(a, b, |x, y| sum += (x - y) * (x - y));
                sum.sqrt()
            }
            Metric::Manhattan => {
                let mut sum = 0.0;
                for_each_pair(a, b, |x, y| sum += (x - y).abs());
                sum
            }
        }
    }
}

fn cosine_distance(a: SparseRow<'_>, b: SparseRow<'_>) -> f64 {
    let norm_a = squared_norm(a).sqrt();
    let norm_b = squared_norm(b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let mut dot = 0.0;
    for_each_pair(a, b, |x, y| dot += x * y);
    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}

fn squared_norm(row: SparseRow<'_>) -> f64 {
    row.values.iter().map(|&v| (v as f64) * (v as f64)).sum()
}

/// Walk the union of two sorted index lists, calling `f` with both values
/// (zero where a row has no entry).
fn for_each_pair(a: SparseRow<'_>, b: SparseRow<'_>, mut f: impl FnMut(f64, f64)) {
    let (mut i, mut j) = (0, 0);
    while i < a.indices.len() && j < b.indices.len() {
        let (col_a, col_b) = (a.indices[i], b.indices[j]);
        if col_a == col_b {
            f(a.values[i] as f64, b.values[j] as f64);
            i += 1;
            j += 1;
        } else if col_a < col_b {
            f(a.values[i] as f64, 0.0);
            i += 1;
        } else {
            f(0.0, b.values[j] as f64);
            j += 1;
        }
    }
    for &value in &a.values[i..] {
        f(value as f64, 0.0);
    }
    for &value in &b.values[j..] {
        f(0.0, value as f64);
    }
}

/// Keep the `k` smallest `(index, distance)` pairs, ascending by
/// (distance, index).
pub fn select_nearest(scored: impl IntoIterator<Item = (usize, f64)>, k: usize) -> Vec<(usize, f64)> {
    if k == 0 {
        return Vec::new();
    }

    // Max-heap: the root is the worst of the current k
    let mut heap: BinaryHeap<(OrderedFloat<f64>, usize)> = BinaryHeap::with_capacity(k + 1);
    for (index, distance) in scored {
        let entry = (OrderedFloat(distance), index);
        if heap.len() < k {
            heap.push(entry);
        } else if heap.peek().is_some_and(|worst| entry < *worst) {
            heap.pop();
            heap.push(entry);
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|(distance, index)| (index, distance.into_inner()))
        .collect()
}

/// Distances from `query` to every candidate, computed in parallel, reduced
/// to the `k` nearest.
pub fn top_k<M: DistanceMetric + ?Sized>(
    metric: &M,
    query: SparseRow<'_>,
    candidates: &[(usize, SparseRow<'_>)],
    k: usize,
) -> Vec<(usize, f64)> {
    let scored: Vec<(usize, f64)> = candidates
        .par_iter()
        .map(|&(index, row)| (index, metric.distance(query, row)))
        .collect();
    select_nearest(scored, k)
}

/// One search result
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub movie_id: MovieId,
    pub distance: f64,
}

impl RatingMatrix {
    /// Up to `k` movie IDs closest to `movie_id`, most similar first.
    pub fn find_similar<M: DistanceMetric + ?Sized>(
        &self,
        movie_id: MovieId,
        k: usize,
        metric: &M,
    ) -> Result<Vec<MovieId>> {
        Ok(self
            .nearest_neighbors(movie_id, k, metric)?
            .into_iter()
            .map(|n| n.movie_id)
            .collect())
    }

    /// Like [`find_similar`](Self::find_similar) but keeps the distances.
    ///
    /// `k` larger than the number of other movies is clamped.
    #[instrument(skip(self, metric), fields(metric = metric.name()))]
    pub fn nearest_neighbors<M: DistanceMetric + ?Sized>(
        &self,
        movie_id: MovieId,
        k: usize,
        metric: &M,
    ) -> Result<Vec<Neighbor>> {
        if self.is_empty() {
            return Err(RecommendError::EmptyInput {
                what: "rating matrix has no movies".to_string(),
            });
        }
        if k == 0 {
            return Err(RecommendError::InvalidK { k });
        }

        let query_index = self.movies().index_of(movie_id)?;
        let query = self
            .row(query_index)
            .ok_or_else(|| RecommendError::Matrix(format!("no row for index {}", query_index)))?;

        let candidates: Vec<(usize, SparseRow<'_>)> = self
            .rows()
            .enumerate()
            .filter(|&(index, _)| index != query_index)
            .collect();
        let k = k.min(candidates.len());

        let nearest = top_k(metric, query, &candidates, k);
        debug!(
            "Scanned {} candidates, kept {} neighbors",
            candidates.len(),
            nearest.len()
        );

        nearest
            .into_iter()
            .map(|(index, distance)| -> Result<Neighbor> {
                let movie_id = self.movies().id_at(index).ok_or_else(|| {
                    RecommendError::Matrix(format!("no movie ID for index {}", index))
                })?;
                Ok(Neighbor { movie_id, distance })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DuplicatePolicy;
    use data_loader::Rating;

    fn row<'a>(indices: &'a [usize], values: &'a [f32]) -> SparseRow<'a> {
        SparseRow::new(indices, values)
    }

    #[test]
    fn test_cosine_distance() {
        let a = row(&[0, 1], &[5.0, 4.0]);
        let b = row(&[0], &[3.0]);
        // 15 / (sqrt(41) * 3)
        let expected = 1.0 - 15.0 / (41f64.sqrt() * 3.0);
        assert!((Metric::Cosine.distance(a, b) - expected).abs() < 1e-12);
        assert!(Metric::Cosine.distance(a, a).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_with_zero_row() {
        let a = row(&[0], &[5.0]);
        let empty = row(&[], &[]);
        assert_eq!(Metric::Cosine.distance(a, empty), 1.0);
    }

    #[test]
    fn test_euclidean_and_manhattan() {
        let a = row(&[0, 2], &[3.0, 1.0]);
        let b = row(&[1, 2], &[4.0, 1.0]);
        assert!((Metric::Euclidean.distance(a, b) - 5.0).abs() < 1e-12);
        assert!((Metric::Manhattan.distance(a, b) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("Cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("l2".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert_eq!("cityblock".parse::<Metric>().unwrap(), Metric::Manhattan);
        assert_eq!(
            "jaccard".parse::<Metric>(),
            Err(RecommendError::UnsupportedMetric {
                name: "jaccard".to_string()
            })
        );
    }

    #[test]
    fn test_select_nearest_orders_and_breaks_ties() {
        let scored = vec![(4, 0.5), (1, 0.2), (3, 0.2), (0, 0.9), (2, 0.2)];
        let nearest = select_nearest(scored, 3);
        assert_eq!(nearest, vec![(1, 0.2), (2, 0.2), (3, 0.2)]);
    }

    #[test]
    fn test_select_nearest_nan_last() {
        let scored = vec![(0, f64::NAN), (1, 3.0), (2, 1.0)];
        let nearest = select_nearest(scored, 3);
        assert_eq!(nearest[0], (2, 1.0));
        assert_eq!(nearest[1], (1, 3.0));
        assert_eq!(nearest[2].0, 0);
        assert!(nearest[2].1.is_nan());
    }

    #[test]
    fn test_select_nearest_zero_k() {
        assert!(select_nearest(vec![(0, 1.0)], 0).is_empty());
    }

    #[test]
    fn test_nearest_neighbors_scenario() {
        let ratings = vec![
            Rating::new(1, 10, 5.0),
            Rating::new(1, 20, 3.0),
            Rating::new(2, 10, 4.0),
            Rating::new(2, 30, 5.0),
        ];
        let matrix = RatingMatrix::build(&ratings, DuplicatePolicy::default()).unwrap();

        let neighbors = matrix.nearest_neighbors(10, 2, &Metric::Cosine).unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].movie_id, 20);
        assert_eq!(neighbors[1].movie_id, 30);
        assert!(neighbors[0].distance < neighbors[1].distance);
    }

    #[test]
    fn test_single_movie_returns_nothing() {
        let matrix =
            RatingMatrix::build(&[Rating::new(1, 10, 5.0)], DuplicatePolicy::default()).unwrap();
        assert!(matrix.find_similar(10, 5, &Metric::Cosine).unwrap().is_empty());
    }

    #[test]
    fn test_zero_k_is_invalid() {
        let matrix =
            RatingMatrix::build(&[Rating::new(1, 10, 5.0)], DuplicatePolicy::default()).unwrap();
        assert_eq!(
            matrix.find_similar(10, 0, &Metric::Cosine),
            Err(RecommendError::InvalidK { k: 0 })
        );
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        // Rows repeat every 7 indices, so many distances tie exactly
        let owned: Vec<(Vec<usize>, Vec<f32>)> = (0..500usize)
            .map(|i| {
                let indices: Vec<usize> = (0..40).filter(|c| (c + i % 7) % 3 != 0).collect();
                let values = indices
                    .iter()
                    .map(|c| ((c * 13 + i % 7) % 10 + 1) as f32 * 0.5)
                    .collect();
                (indices, values)
            })
            .collect();
        let query = row(&owned[0].0, &owned[0].1);
        let candidates: Vec<(usize, SparseRow<'_>)> = owned
            .iter()
            .enumerate()
            .skip(1)
            .map(|(index, (indices, values))| (index, row(indices, values)))
            .collect();

        for metric in [Metric::Cosine, Metric::Euclidean, Metric::Manhattan] {
            let sequential: Vec<(usize, f64)> = candidates
                .iter()
                .map(|&(index, candidate)| (index, metric.distance(query, candidate)))
                .collect();

            for k in [1, 10, 100, candidates.len()] {
                assert_eq!(
                    top_k(&metric, query, &candidates, k),
                    select_nearest(sequential.clone(), k),
                    "{} k={}",
                    metric,
                    k
                );
            }
        }
    }
}
