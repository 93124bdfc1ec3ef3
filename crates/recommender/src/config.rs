//! Recommender settings.

use engine::{DuplicatePolicy, Metric};
use serde::{Deserialize, Serialize};

/// Title shown for a movie that has ratings but no metadata
pub const DEFAULT_PLACEHOLDER_TITLE: &str = "Unknown Movie";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Metric used by `recommend`
    pub metric: Metric,
    /// How repeated (user, movie) ratings enter the matrix
    pub duplicate_policy: DuplicatePolicy,
    pub placeholder_title: String,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            metric: Metric::default(),
            duplicate_policy: DuplicatePolicy::default(),
            placeholder_title: DEFAULT_PLACEHOLDER_TITLE.to_string(),
        }
    }
}

impl RecommenderConfig {
    /// Configure the distance metric (default: cosine)
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Configure duplicate handling (default: last write wins)
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Configure the missing-title placeholder (default: "Unknown Movie")
    pub fn with_placeholder_title(mut self, title: impl Into<String>) -> Self {
        self.placeholder_title = title.into();
        self
    }
}
