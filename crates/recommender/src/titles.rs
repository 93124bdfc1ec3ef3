//! Movie ID to display title lookup with an explicit fallback.

use data_loader::{Movie, MovieId};
use std::collections::HashMap;

/// Static title table, built once from movie metadata.
///
/// Lookups never fail: an ID without metadata resolves to `placeholder`.
#[derive(Debug, Clone)]
pub struct TitleLookup {
    titles: HashMap<MovieId, String>,
    placeholder: String,
}

impl TitleLookup {
    pub fn from_movies<'a>(
        movies: impl IntoIterator<Item = &'a Movie>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            titles: movies
                .into_iter()
                .map(|movie| (movie.id, movie.title.clone()))
                .collect(),
            placeholder: placeholder.into(),
        }
    }

    /// Title for `movie_id`, or the placeholder
    pub fn title(&self, movie_id: MovieId) -> &str {
        self.titles
            .get(&movie_id)
            .map(String::as_str)
            .unwrap_or(&self.placeholder)
    }

    /// Title for `movie_id` only if metadata exists
    pub fn get(&self, movie_id: MovieId) -> Option<&str> {
        self.titles.get(&movie_id).map(String::as_str)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
