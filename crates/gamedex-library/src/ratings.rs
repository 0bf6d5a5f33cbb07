//! Persisted personal ratings

use crate::LibraryError;
use crate::record::GameId;
use gamedex_storage::{KeyValueStore, load_json, save_json};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Storage key holding the `{ "<id>": <1-5> }` object
pub const RATINGS_KEY: &str = "userRatings";

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// One 1-5 star rating per game id, written through on every change
pub struct RatingsStore {
    store: Arc<dyn KeyValueStore>,
    ratings: BTreeMap<String, u8>,
}

impl RatingsStore {
    /// Load ratings from `store`, dropping entries that are not 1-5 integers
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let stored: BTreeMap<String, serde_json::Value> =
            match load_json(store.as_ref(), RATINGS_KEY) {
                Ok(Some(ratings)) => ratings,
                Ok(None) => BTreeMap::new(),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable ratings: {}", e);
                    BTreeMap::new()
                }
            };

        let mut ratings = BTreeMap::new();
        for (id, value) in stored {
            match value.as_i64().and_then(|v| validate_rating(v).ok()) {
                Some(rating) => {
                    ratings.insert(id, rating);
                }
                None => tracing::warn!("Dropping invalid rating {} for game {}", value, id),
            }
        }

        tracing::debug!("Loaded {} user ratings", ratings.len());

        Self { store, ratings }
    }

    pub fn get(&self, id: &GameId) -> Option<u8> {
        self.ratings.get(&id.key()).copied()
    }

    /// Rate a game, replacing any previous rating.
    ///
    /// Values outside 1-5 are rejected and leave the store unchanged.
    pub fn set(&mut self, id: &GameId, value: i64) -> Result<u8, LibraryError> {
        let rating = validate_rating(value)?;
        self.ratings.insert(id.key(), rating);
        self.persist();
        Ok(rating)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), RATINGS_KEY, &self.ratings) {
            tracing::warn!("Failed to persist user ratings: {}", e);
        }
    }
}

fn validate_rating(value: i64) -> Result<u8, LibraryError> {
    if (i64::from(MIN_RATING)..=i64::from(MAX_RATING)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(LibraryError::InvalidRating(value))
    }
}
