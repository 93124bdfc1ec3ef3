//! Loading a `Dataset` from disk.
//!
//! Both CSV files are parsed in parallel with `rayon::join`, then the records
//! are inserted in file order so per-user and per-movie lists keep that order.

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl Dataset {
    /// Load movies and ratings from the two MovieLens CSV files
    pub fn load_from_files(movies_path: &Path, ratings_path: &Path) -> Result<Self> {
        info!(
            movies = %movies_path.display(),
            ratings = %ratings_path.display(),
            "Loading MovieLens dataset"
        );

        let (movies, ratings) = rayon::join(
            || parser::parse_movies(movies_path),
            || parser::parse_ratings(ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        let dataset = Dataset::from_records(movies, ratings);

        let (movie_count, rating_count) = dataset.counts();
        info!(
            "Loaded {} movies, {} ratings from {} users",
            movie_count,
            rating_count,
            dataset.user_ratings.len()
        );
        Ok(dataset)
    }
}
