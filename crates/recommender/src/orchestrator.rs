//! # Recommendation Orchestrator
//!
//! Coordinates one recommendation request:
//! 1. Fetch the user's ratings
//! 2. Pick the seed movie (highest rating, smallest movie ID on ties)
//! 3. Search the rating matrix for the seed's nearest neighbors
//! 4. Resolve neighbor IDs to titles
//!
//! The orchestrator holds the dataset, the matrix snapshot and the title table
//! behind `Arc`s. Cloning is cheap and every request is a read-only pass, so
//! one instance can serve many threads at once.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, instrument};

use data_loader::{Dataset, MovieId, Rating, UserId};
use engine::{Metric, RatingMatrix, RecommendError, Result};

use crate::config::RecommenderConfig;
use crate::titles::TitleLookup;

/// One recommended movie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    pub distance: f64,
}

/// The movie a user's recommendations were derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub rating: f32,
}

/// Full answer to a recommendation request, most similar first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub user_id: UserId,
    pub metric: Metric,
    pub seed: SeedMovie,
    pub items: Vec<MovieRecommendation>,
}

impl Recommendations {
    pub fn titles(&self) -> Vec<String> {
        self.items.iter().map(|item| item.title.clone()).collect()
    }
}

/// Item-based recommender over one immutable rating snapshot
#[derive(Clone)]
pub struct Recommender {
    dataset: Arc<Dataset>,
    matrix: Arc<RatingMatrix>,
    titles: Arc<TitleLookup>,
    config: RecommenderConfig,
}

impl Recommender {
    /// Build a recommender with default settings
    pub fn new(dataset: Arc<Dataset>) -> Result<Self> {
        Self::with_config(dataset, RecommenderConfig::default())
    }

    /// Build the rating matrix and title table for `dataset`
    pub fn with_config(dataset: Arc<Dataset>, config: RecommenderConfig) -> Result<Self> {
        let start = Instant::now();

        let matrix = RatingMatrix::build(dataset.ratings(), config.duplicate_policy)?;
        let titles = TitleLookup::from_movies(dataset.movies(), config.placeholder_title.clone());

        let (movies, users) = matrix.shape();
        info!(
            "Recommender ready: {} movies x {} users ({:.4} sparse, {} titles) in {:.2?}",
            movies,
            users,
            matrix.sparsity(),
            titles.len(),
            start.elapsed()
        );

        Ok(Self {
            dataset,
            matrix: Arc::new(matrix),
            titles: Arc::new(titles),
            config,
        })
    }

    /// Fresh recommender over a changed dataset, keeping this one's settings.
    ///
    /// `self` is left untouched; callers swap in the returned instance.
    pub fn rebuild(&self, dataset: Arc<Dataset>) -> Result<Self> {
        Self::with_config(dataset, self.config.clone())
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn titles(&self) -> &TitleLookup {
        &self.titles
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Movie IDs most similar to `movie_id`, most similar first
    pub fn find_similar(&self, movie_id: MovieId, k: usize, metric: Metric) -> Result<Vec<MovieId>> {
        self.matrix.find_similar(movie_id, k, &metric)
    }

    /// The user's highest rated movie; the smallest movie ID wins ties.
    ///
    /// Ratings are read back from the matrix, so repeated (user, movie)
    /// records count the way the duplicate policy resolved them. NaN values
    /// never seed a search.
    pub fn seed_movie(&self, user_id: UserId) -> Result<Rating> {
        let resolved = match self.matrix.user_ratings(user_id) {
            Ok(resolved) => resolved,
            Err(err) if err.is_not_found() => return Err(RecommendError::NoRatings { user_id }),
            Err(err) => return Err(err),
        };

        // Ascending movie IDs, so a strict comparison keeps the smallest on ties
        let mut best: Option<(MovieId, f32)> = None;
        for (movie_id, value) in resolved {
            if value.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, top)| value > top) {
                best = Some((movie_id, value));
            }
        }

        best.map(|(movie_id, value)| Rating::new(user_id, movie_id, value))
            .ok_or(RecommendError::NoRatings { user_id })
    }

    /// Titles of up to `k` movies similar to the user's top rated one
    pub fn recommend(&self, user_id: UserId, k: usize) -> Result<Vec<String>> {
        Ok(self.recommend_detailed(user_id, k)?.titles())
    }

    /// Same as [`recommend`](Self::recommend) with the seed and distances attached
    #[instrument(skip(self))]
    pub fn recommend_detailed(&self, user_id: UserId, k: usize) -> Result<Recommendations> {
        let start = Instant::now();

        let seed = self.seed_movie(user_id)?;
        debug!(
            "Seed movie for user {}: {} (rated {})",
            user_id, seed.movie_id, seed.rating
        );

        let neighbors = self
            .matrix
            .nearest_neighbors(seed.movie_id, k, &self.config.metric)?;

        let items: Vec<MovieRecommendation> = neighbors
            .into_iter()
            .map(|neighbor| MovieRecommendation {
                movie_id: neighbor.movie_id,
                title: self.titles.title(neighbor.movie_id).to_string(),
                distance: neighbor.distance,
            })
            .collect();

        debug!(
            "Built {} recommendations for user {} in {:.2?}",
            items.len(),
            user_id,
            start.elapsed()
        );

        Ok(Recommendations {
            user_id,
            metric: self.config.metric,
            seed: SeedMovie {
                movie_id: seed.movie_id,
                title: self.titles.title(seed.movie_id).to_string(),
                rating: seed.rating,
            },
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;

    fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            year: None,
            genres: vec![],
        }
    }

    fn create_test_dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_records(
            vec![movie(10, "A"), movie(20, "B"), movie(30, "C")],
            vec![
                Rating::new(1, 10, 5.0),
                Rating::new(1, 20, 3.0),
                Rating::new(2, 10, 4.0),
                Rating::new(2, 30, 5.0),
            ],
        ))
    }

    #[test]
    fn test_seed_movie() {
        let recommender = Recommender::new(create_test_dataset()).unwrap();
        assert_eq!(recommender.seed_movie(1).unwrap().movie_id, 10);
        assert_eq!(recommender.seed_movie(2).unwrap().movie_id, 30);
    }

    #[test]
    fn test_seed_movie_ties_pick_smallest_id() {
        let dataset = Arc::new(Dataset::from_records(
            vec![],
            vec![
                Rating::new(1, 50, 4.0),
                Rating::new(1, 20, 4.0),
                Rating::new(1, 90, 2.0),
                Rating::new(1, 40, 4.0),
            ],
        ));
        let recommender = Recommender::new(dataset).unwrap();
        assert_eq!(recommender.seed_movie(1).unwrap().movie_id, 20);
    }

    #[test]
    fn test_seed_movie_skips_nan() {
        let dataset = Arc::new(Dataset::from_records(
            vec![],
            vec![
                Rating::new(1, 10, 5.0),
                Rating::new(1, 20, f32::NAN),
                Rating::new(1, 30, 3.0),
                Rating::new(2, 40, f32::NAN),
            ],
        ));
        let recommender = Recommender::new(dataset).unwrap();

        assert_eq!(recommender.seed_movie(1).unwrap().movie_id, 10);
        assert_eq!(
            recommender.seed_movie(2),
            Err(RecommendError::NoRatings { user_id: 2 })
        );
    }

    #[test]
    fn test_seed_movie_no_ratings() {
        let recommender = Recommender::new(create_test_dataset()).unwrap();
        assert_eq!(
            recommender.seed_movie(7),
            Err(RecommendError::NoRatings { user_id: 7 })
        );
    }

    #[test]
    fn test_recommend_detailed() {
        let recommender = Recommender::new(create_test_dataset()).unwrap();
        let recs = recommender.recommend_detailed(1, 5).unwrap();

        assert_eq!(recs.seed.movie_id, 10);
        assert_eq!(recs.seed.title, "A");
        assert_eq!(recs.metric, Metric::Cosine);
        // clamped to the two other movies
        assert_eq!(recs.titles(), vec!["B", "C"]);
        assert!(recs.items[0].distance <= recs.items[1].distance);
    }

    #[test]
    fn test_rebuild_keeps_config_and_previous_snapshot() {
        let config = RecommenderConfig::default().with_placeholder_title("???");
        let recommender = Recommender::with_config(create_test_dataset(), config).unwrap();

        let bigger = Arc::new(Dataset::from_records(
            vec![],
            vec![Rating::new(1, 10, 5.0), Rating::new(1, 99, 4.0)],
        ));
        let rebuilt = recommender.rebuild(bigger).unwrap();

        assert_eq!(rebuilt.config().placeholder_title, "???");
        assert_eq!(rebuilt.recommend(1, 1).unwrap(), vec!["???"]);
        assert_eq!(recommender.matrix().shape(), (3, 2));
    }
}
