//! Sparse movie x user rating matrix.
//!
//! A [`RatingMatrix`] is an immutable snapshot: the user/movie index mapping,
//! the coordinate triplets it was built from, and the CSR matrix itself (one
//! row per movie, one column per user). A changed rating set means building a
//! new snapshot.

use crate::error::{RecommendError, Result};
use crate::index::{IdIndex, IndexMapping};
use data_loader::{MovieId, Rating, UserId};
use serde::{Deserialize, Serialize};
use sprs::CsMat;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// How to resolve several records for the same (user, movie) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The record that appears last in input order wins
    #[default]
    LastWriteWins,
    /// Values are added together
    Sum,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::LastWriteWins => f.write_str("last-write-wins"),
            DuplicatePolicy::Sum => f.write_str("sum"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "last-write-wins" | "last" => Ok(DuplicatePolicy::LastWriteWins),
            "sum" => Ok(DuplicatePolicy::Sum),
            other => Err(format!("unknown duplicate policy '{}'", other)),
        }
    }
}

/// Coordinate form of the matrix: three parallel arrays sorted by (row, col).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triplets {
    /// Movie indices
    pub rows: Vec<usize>,
    /// User indices
    pub cols: Vec<usize>,
    pub values: Vec<f32>,
}

impl Triplets {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Convert every rating to a (movie index, user index, value) triplet.
///
/// Each record is visited once, in input order. Records that hit an already
/// populated cell are folded in according to `policy`.
pub fn build_triplets(
    ratings: &[Rating],
    mapping: &IndexMapping,
    policy: DuplicatePolicy,
) -> Result<Triplets> {
    let mut slots: HashMap<(usize, usize), usize> = HashMap::with_capacity(ratings.len());
    let mut cells: Vec<(usize, usize, f32)> = Vec::with_capacity(ratings.len());
    let mut duplicates = 0usize;

    for rating in ratings {
        let row = mapping.movie_index(rating.movie_id)?;
        let col = mapping.user_index(rating.user_id)?;

        match slots.get(&(row, col)) {
            Some(&slot) => {
                duplicates += 1;
                match policy {
                    DuplicatePolicy::LastWriteWins => cells[slot].2 = rating.rating,
                    DuplicatePolicy::Sum => cells[slot].2 += rating.rating,
                }
            }
            None => {
                slots.insert((row, col), cells.len());
                cells.push((row, col, rating.rating));
            }
        }
    }

    if duplicates > 0 {
        debug!(duplicates, %policy, "Resolved duplicate (user, movie) ratings");
    }

    cells.sort_unstable_by_key(|&(row, col, _)| (row, col));

    let mut triplets = Triplets {
        rows: Vec::with_capacity(cells.len()),
        cols: Vec::with_capacity(cells.len()),
        values: Vec::with_capacity(cells.len()),
    };
    for (row, col, value) in cells {
        triplets.rows.push(row);
        triplets.cols.push(col);
        triplets.values.push(value);
    }
    Ok(triplets)
}

/// A borrowed sparse row: sorted column indices and their values.
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    pub indices: &'a [usize],
    pub values: &'a [f32],
}

impl<'a> SparseRow<'a> {
    pub fn new(indices: &'a [usize], values: &'a [f32]) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self { indices, values }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + 'a {
        let (indices, values) = (self.indices, self.values);
        indices.iter().copied().zip(values.iter().copied())
    }
}

/// Immutable snapshot of the rating matrix and its index mapping
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    mapping: IndexMapping,
    triplets: Triplets,
    matrix: CsMat<f32>,
    policy: DuplicatePolicy,
}

impl RatingMatrix {
    /// Build the full snapshot from a rating set.
    ///
    /// An empty rating set produces a (0, 0) matrix, not an error.
    #[instrument(skip(ratings), fields(ratings = ratings.len()))]
    pub fn build(ratings: &[Rating], policy: DuplicatePolicy) -> Result<Self> {
        let mapping = IndexMapping::from_ratings(ratings);
        let triplets = build_triplets(ratings, &mapping, policy)?;
        let shape = (mapping.movies.len(), mapping.users.len());
        let matrix = to_csr(shape, &triplets)?;

        info!(
            movies = shape.0,
            users = shape.1,
            nnz = matrix.nnz(),
            "Built rating matrix"
        );

        Ok(Self {
            mapping,
            triplets,
            matrix,
            policy,
        })
    }

    /// (movies, users)
    pub fn shape(&self) -> (usize, usize) {
        self.matrix.shape()
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Fraction of cells that are implicitly zero
    pub fn sparsity(&self) -> f64 {
        let (rows, cols) = self.shape();
        let total = rows * cols;
        if total == 0 {
            0.0
        } else {
            1.0 - (self.nnz() as f64 / total as f64)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.movies.is_empty()
    }

    /// Row vector of one movie over the user dimension
    pub fn row(&self, movie_index: usize) -> Option<SparseRow<'_>> {
        if movie_index >= self.matrix.rows() {
            return None;
        }
        let range = self.matrix.indptr().outer_inds_sz(movie_index);
        Some(SparseRow::new(
            &self.matrix.indices()[range.clone()],
            &self.matrix.data()[range],
        ))
    }

    /// Every row in movie-index order
    pub fn rows(&self) -> impl Iterator<Item = SparseRow<'_>> + '_ {
        (0..self.matrix.rows()).filter_map(move |index| self.row(index))
    }

    /// Value of one cell, zero when unrated
    pub fn get(&self, movie_index: usize, user_index: usize) -> f32 {
        self.matrix
            .get(movie_index, user_index)
            .copied()
            .unwrap_or(0.0)
    }

    /// One user's ratings after duplicate resolution, in ascending movie ID order
    pub fn user_ratings(&self, user_id: UserId) -> Result<Vec<(MovieId, f32)>> {
        let col = self.mapping.user_index(user_id)?;
        let triplets = &self.triplets;

        (0..triplets.len())
            .filter(|&i| triplets.cols[i] == col)
            .map(|i| -> Result<(MovieId, f32)> {
                let row = triplets.rows[i];
                let movie_id = self.movies().id_at(row).ok_or_else(|| {
                    RecommendError::Matrix(format!("no movie ID for index {}", row))
                })?;
                Ok((movie_id, triplets.values[i]))
            })
            .collect()
    }

    pub fn triplets(&self) -> &Triplets {
        &self.triplets
    }

    pub fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    pub fn users(&self) -> &IdIndex {
        &self.mapping.users
    }

    pub fn movies(&self) -> &IdIndex {
        &self.mapping.movies
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.policy
    }
}

/// Assemble CSR storage from (row, col)-sorted, duplicate-free triplets.
fn to_csr(shape: (usize, usize), triplets: &Triplets) -> Result<CsMat<f32>> {
    let (rows, _) = shape;
    let mut indptr = vec![0usize; rows + 1];
    for &row in &triplets.rows {
        indptr[row + 1] += 1;
    }
    for row in 0..rows {
        indptr[row + 1] += indptr[row];
    }

    CsMat::try_new(shape, indptr, triplets.cols.clone(), triplets.values.clone())
        .map_err(|(_, _, _, err)| RecommendError::Matrix(err.to_string()))
}
