//! Descriptive statistics over a `Dataset`.
//!
//! - Dataset-wide counts and average ratings per user / per movie
//! - Per-movie rating count and mean, with the lowest and highest rated movie
//! - Number of ratings per user
//!
//! Averages that are reported as whole numbers are rounded half-to-even.

use crate::types::*;
use rayon::prelude::*;
use serde::Serialize;

/// Headline counts for a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub total_ratings: usize,
    pub unique_users: usize,
    pub unique_movies: usize,
    pub avg_ratings_per_user: usize,
    pub avg_ratings_per_movie: usize,
}

/// Rating count and mean for one movie
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovieRatingSummary {
    pub movie_id: MovieId,
    pub count: usize,
    pub mean: f64,
}

/// Per-movie summaries plus the extremes by mean rating
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRatingStats {
    /// Ties go to the smallest movie ID
    pub lowest_rated_movie: MovieId,
    /// Ties go to the smallest movie ID
    pub highest_rated_movie: MovieId,
    /// Sorted by movie ID
    pub per_movie: Vec<MovieRatingSummary>,
}

/// Number of ratings given by one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserRatingCount {
    pub user_id: UserId,
    pub count: usize,
}

impl Dataset {
    /// Counts of ratings, distinct rating users, and distinct rated movies
    pub fn dataset_stats(&self) -> DatasetStats {
        let total_ratings = self.ratings.len();
        let unique_users = self.user_ratings.len();
        let unique_movies = self.movie_ratings.len();

        DatasetStats {
            total_ratings,
            unique_users,
            unique_movies,
            avg_ratings_per_user: rounded_ratio(total_ratings, unique_users),
            avg_ratings_per_movie: rounded_ratio(total_ratings, unique_movies),
        }
    }

    /// Per-movie count and mean rating, computed in parallel.
    ///
    /// Returns `None` when there are no ratings.
    pub fn movie_rating_stats(&self) -> Option<MovieRatingStats> {
        let mut per_movie: Vec<MovieRatingSummary> = self
            .movie_ratings
            .par_iter()
            .map(|(&movie_id, ratings)| {
                let total: f64 = ratings.iter().map(|r| r.rating as f64).sum();
                MovieRatingSummary {
                    movie_id,
                    count: ratings.len(),
                    mean: total / ratings.len() as f64,
                }
            })
            .collect();
        per_movie.sort_unstable_by_key(|s| s.movie_id);

        let first = per_movie.first()?;
        let mut lowest = first;
        let mut highest = first;
        for summary in &per_movie[1..] {
            if summary.mean < lowest.mean {
                lowest = summary;
            }
            if summary.mean > highest.mean {
                highest = summary;
            }
        }

        Some(MovieRatingStats {
            lowest_rated_movie: lowest.movie_id,
            highest_rated_movie: highest.movie_id,
            per_movie,
        })
    }

    /// Ratings per user, sorted by user ID
    pub fn user_rating_distribution(&self) -> Vec<UserRatingCount> {
        let mut counts: Vec<UserRatingCount> = self
            .user_ratings
            .iter()
            .map(|(&user_id, ratings)| UserRatingCount {
                user_id,
                count: ratings.len(),
            })
            .collect();
        counts.sort_unstable_by_key(|c| c.user_id);
        counts
    }
}

fn rounded_ratio(numerator: usize, denominator: usize) -> usize {
    if denominator == 0 {
        return 0;
    }
    (numerator as f64 / denominator as f64).round_ties_even() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_dataset() -> Dataset {
        let movies = vec![
            Movie {
                id: 10,
                title: "A (2000)".to_string(),
                year: Some(2000),
                genres: vec![],
            },
            Movie {
                id: 20,
                title: "B (2001)".to_string(),
                year: Some(2001),
                genres: vec![],
            },
        ];
        let ratings = vec![
            Rating::new(1, 10, 5.0),
            Rating::new(1, 20, 3.0),
            Rating::new(2, 10, 4.0),
            Rating::new(2, 30, 5.0),
        ];
        Dataset::from_records(movies, ratings)
    }

    #[test]
    fn test_dataset_stats() {
        let stats = create_test_dataset().dataset_stats();
        assert_eq!(stats.total_ratings, 4);
        assert_eq!(stats.unique_users, 2);
        assert_eq!(stats.unique_movies, 3);
        assert_eq!(stats.avg_ratings_per_user, 2);
        // 4 / 3 = 1.33
        assert_eq!(stats.avg_ratings_per_movie, 1);
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        assert_eq!(rounded_ratio(5, 2), 2);
        assert_eq!(rounded_ratio(7, 2), 4);
        assert_eq!(rounded_ratio(3, 0), 0);
    }

    #[test]
    fn test_movie_rating_stats() {
        let stats = create_test_dataset().movie_rating_stats().unwrap();

        assert_eq!(stats.per_movie.len(), 3);
        assert_eq!(stats.per_movie[0].movie_id, 10);
        assert_eq!(stats.per_movie[0].count, 2);
        assert!((stats.per_movie[0].mean - 4.5).abs() < 1e-9);

        assert_eq!(stats.lowest_rated_movie, 20);
        // 30 has mean 5.0, the only maximum
        assert_eq!(stats.highest_rated_movie, 30);
    }

    #[test]
    fn test_extreme_ties_pick_smallest_id() {
        let dataset = Dataset::from_records(
            vec![],
            vec![
                Rating::new(1, 7, 4.0),
                Rating::new(1, 3, 4.0),
                Rating::new(1, 5, 4.0),
            ],
        );
        let stats = dataset.movie_rating_stats().unwrap();
        assert_eq!(stats.lowest_rated_movie, 3);
        assert_eq!(stats.highest_rated_movie, 3);
    }

    #[test]
    fn test_empty_dataset_stats() {
        let dataset = Dataset::new();
        let stats = dataset.dataset_stats();
        assert_eq!(stats.total_ratings, 0);
        assert_eq!(stats.avg_ratings_per_user, 0);
        assert!(dataset.movie_rating_stats().is_none());
        assert!(dataset.user_rating_distribution().is_empty());
    }

    #[test]
    fn test_user_rating_distribution() {
        let distribution = create_test_dataset().user_rating_distribution();
        assert_eq!(
            distribution,
            vec![
                UserRatingCount { user_id: 1, count: 2 },
                UserRatingCount { user_id: 2, count: 2 },
            ]
        );
    }
}
