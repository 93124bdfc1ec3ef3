//! Error taxonomy for matrix construction, similarity search and recommendation.
//!
//! Each variant belongs to one [`ErrorKind`]. Callers that only care about the
//! class of failure (for example "report not-found as information, fail on
//! everything else") match on [`RecommendError::kind`].

use data_loader::UserId;
use std::fmt;
use thiserror::Error;

/// Which identifier space a lookup was made in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    User,
    Movie,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::User => f.write_str("User"),
            Entity::Movie => f.write_str("Movie"),
        }
    }
}

/// Coarse classification of a [`RecommendError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    EmptyInput,
    InvalidParameter,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// ID is absent from the index mapping
    #[error("{entity} ID {id} not found in the dataset")]
    UnknownId { entity: Entity, id: u32 },

    /// User exists nowhere in the rating records
    #[error("No ratings found for user {user_id}")]
    NoRatings { user_id: UserId },

    /// Nothing to search over
    #[error("Empty input: {what}")]
    EmptyInput { what: String },

    /// k must be at least 1
    #[error("Invalid number of neighbors: {k} (must be at least 1)")]
    InvalidK { k: usize },

    #[error("Unsupported distance metric: {name}")]
    UnsupportedMetric { name: String },

    /// Sparse matrix construction failed
    #[error("Matrix construction failed: {0}")]
    Matrix(String),
}

impl RecommendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecommendError::UnknownId { .. } | RecommendError::NoRatings { .. } => {
                ErrorKind::NotFound
            }
            RecommendError::EmptyInput { .. } => ErrorKind::EmptyInput,
            RecommendError::InvalidK { .. } | RecommendError::UnsupportedMetric { .. } => {
                ErrorKind::InvalidParameter
            }
            RecommendError::Matrix(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecommendError>;
