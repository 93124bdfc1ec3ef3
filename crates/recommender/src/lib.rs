//! # Recommender
//!
//! Item-based movie recommendations on top of the `engine` rating matrix.
//! [`Recommender`] seeds a nearest-neighbor search with a user's top rated
//! movie and resolves the results to titles through [`TitleLookup`].

pub mod config;
pub mod orchestrator;
pub mod titles;

pub use config::{DEFAULT_PLACEHOLDER_TITLE, RecommenderConfig};
pub use engine::{DuplicatePolicy, ErrorKind, Metric, RecommendError};
pub use orchestrator::{MovieRecommendation, Recommendations, Recommender, SeedMovie};
pub use titles::TitleLookup;
