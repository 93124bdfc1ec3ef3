//! Bidirectional mapping between external IDs and dense matrix indices.
//!
//! Indices are handed out in ascending order of the ID values, so the same
//! rating set always produces the same matrix layout regardless of the order
//! the records arrived in.

use crate::error::{Entity, RecommendError, Result};
use data_loader::{MovieId, Rating, UserId};
use std::collections::HashMap;

/// One ID space (users or movies) mapped onto `0..len()`.
#[derive(Debug, Clone)]
pub struct IdIndex {
    entity: Entity,
    /// index -> id, ascending
    ids: Vec<u32>,
    /// id -> index
    positions: HashMap<u32, usize>,
}

impl IdIndex {
    /// Build from any collection of IDs; duplicates collapse to one index.
    pub fn from_ids(entity: Entity, ids: impl IntoIterator<Item = u32>) -> Self {
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let positions = ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();

        Self {
            entity,
            ids,
            positions,
        }
    }

    /// Forward lookup: external ID to dense index
    pub fn index_of(&self, id: u32) -> Result<usize> {
        self.positions
            .get(&id)
            .copied()
            .ok_or(RecommendError::UnknownId {
                entity: self.entity,
                id,
            })
    }

    /// Inverse lookup: dense index to external ID
    pub fn id_at(&self, index: usize) -> Option<u32> {
        self.ids.get(index).copied()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.positions.contains_key(&id)
    }

    /// All IDs in index order (ascending)
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// User and movie indices derived from one rating set
#[derive(Debug, Clone)]
pub struct IndexMapping {
    pub users: IdIndex,
    pub movies: IdIndex,
}

impl IndexMapping {
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        Self {
            users: IdIndex::from_ids(Entity::User, ratings.iter().map(|r| r.user_id)),
            movies: IdIndex::from_ids(Entity::Movie, ratings.iter().map(|r| r.movie_id)),
        }
    }

    pub fn user_index(&self, user_id: UserId) -> Result<usize> {
        self.users.index_of(user_id)
    }

    pub fn movie_index(&self, movie_id: MovieId) -> Result<usize> {
        self.movies.index_of(movie_id)
    }
}
