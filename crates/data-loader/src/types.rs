//! Core domain types for MovieLens-style rating data.
//!
//! - `Rating` and `Movie` are the records read from `ratings.csv` / `movies.csv`
//! - `Dataset` owns every record plus per-user and per-movie lookups
//!
//! Records are immutable once loaded. Anything derived from them (statistics,
//! the rating matrix) is computed from a `&Dataset` and never written back.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// External identifier of a user as it appears in `ratings.csv`
pub type UserId = u32;

/// External identifier of a movie as it appears in `movies.csv` / `ratings.csv`
pub type MovieId = u32;

// =============================================================================
// Records
// =============================================================================

/// Represents a movie in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Year extracted from title (e.g., "Toy Story (1995)")
    pub year: Option<u16>,
    /// Genre labels, empty when the source says "(no genres listed)"
    pub genres: Vec<String>,
}

/// A single rating from a user for a movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value, strictly positive (MovieLens uses 0.5 - 5.0)
    pub rating: f32,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
}

impl Rating {
    /// Shorthand for building records in memory when the timestamp is irrelevant
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f32) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
            timestamp: 0,
        }
    }
}

// =============================================================================
// Dataset - the in-memory rating store
// =============================================================================

/// All movies and ratings of one load, with lookups by user and by movie.
///
/// `ratings` keeps the input order; the per-user and per-movie vectors are
/// views of the same records in that order.
#[derive(Debug, Default)]
pub struct Dataset {
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) ratings: Vec<Rating>,

    /// All ratings made by each user
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,
}

impl Dataset {
    /// Creates a new, empty Dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from records already in memory
    pub fn from_records(
        movies: impl IntoIterator<Item = Movie>,
        ratings: impl IntoIterator<Item = Rating>,
    ) -> Self {
        let mut dataset = Self::new();
        for movie in movies {
            dataset.insert_movie(movie);
        }
        for rating in ratings {
            dataset.insert_rating(rating);
        }
        dataset
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get all ratings made by a user, in input order
    ///
    /// Returns an empty slice if user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie, in input order
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every rating record, in input order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Every movie record (unordered)
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// IDs of every user with at least one rating, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert a movie into the dataset (a later record with the same ID replaces it)
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating and update indices
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);

        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);

        self.movie_ratings
            .entry(rating.movie_id)
            .or_default()
            .push(rating);
    }

    /// (movies, ratings) counts for logging
    pub fn counts(&self) -> (usize, usize) {
        (self.movies.len(), self.ratings.len())
    }
}
