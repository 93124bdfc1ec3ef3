//! # Data Loader Crate
//!
//! Loads MovieLens-style `movies.csv` / `ratings.csv` files into an in-memory
//! [`Dataset`] and computes descriptive statistics over it.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Movie, Rating, Dataset)
//! - **parser**: Parse CSV files into Rust structs
//! - **index**: Load a Dataset from disk
//! - **stats**: Dataset-wide and per-movie statistics
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Dataset;
//! use std::path::Path;
//!
//! let dataset = Dataset::load_from_files(
//!     Path::new("data/movies.csv"),
//!     Path::new("data/ratings.csv"),
//! )?;
//!
//! let stats = dataset.dataset_stats();
//! println!("{} ratings from {} users", stats.total_ratings, stats.unique_users);
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod stats;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use stats::{DatasetStats, MovieRatingStats, MovieRatingSummary, UserRatingCount};
pub use types::{Dataset, Movie, MovieId, Rating, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_creation() {
        let dataset = Dataset::new();
        assert_eq!(dataset.counts(), (0, 0));
        assert!(dataset.ratings().is_empty());
    }

    #[test]
    fn test_insert_movie() {
        let mut dataset = Dataset::new();

        dataset.insert_movie(Movie {
            id: 1,
            title: "Toy Story (1995)".to_string(),
            year: Some(1995),
            genres: vec!["Animation".to_string(), "Comedy".to_string()],
        });

        let retrieved = dataset.get_movie(1).unwrap();
        assert_eq!(retrieved.year, Some(1995));
        assert_eq!(retrieved.genres.len(), 2);
    }

    #[test]
    fn test_insert_rating() {
        let mut dataset = Dataset::new();
        dataset.insert_rating(Rating {
            user_id: 1,
            movie_id: 1193,
            rating: 5.0,
            timestamp: 978300760,
        });

        let user_ratings = dataset.get_user_ratings(1);
        assert_eq!(user_ratings.len(), 1);
        assert_eq!(user_ratings[0].rating, 5.0);
        assert_eq!(dataset.get_movie_ratings(1193).len(), 1);
        assert_eq!(dataset.user_ids(), vec![1]);
    }

    #[test]
    fn test_ratings_keep_input_order() {
        let dataset = Dataset::from_records(
            vec![],
            vec![
                Rating::new(2, 30, 5.0),
                Rating::new(1, 10, 4.0),
                Rating::new(2, 10, 3.0),
            ],
        );
        let movies: Vec<MovieId> = dataset.get_user_ratings(2).iter().map(|r| r.movie_id).collect();
        assert_eq!(movies, vec![30, 10]);
        assert_eq!(dataset.ratings()[1].user_id, 1);
        assert_eq!(dataset.user_ids(), vec![1, 2]);
    }

    #[test]
    fn test_empty_queries() {
        let dataset = Dataset::new();
        assert!(dataset.get_movie(999).is_none());
        assert!(dataset.get_user_ratings(999).is_empty());
        assert!(dataset.get_movie_ratings(999).is_empty());
    }
}
