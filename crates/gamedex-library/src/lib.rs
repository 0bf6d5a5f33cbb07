//! Game library model for Gamedex
//!
//! Holds the game record type served by the listing API, the pure
//! search/filter/sort derivation over a record set, and the two persisted
//! user stores (favorites and personal ratings).

mod favorites;
mod filter;
mod platform;
mod ratings;
mod record;

pub use favorites::{FAVORITES_KEY, FavoritesStore};
pub use filter::{FilterCriteria, FilterOptions, RatingSort, derive};
pub use platform::{PlatformFamily, fold_platform_family};
pub use ratings::{MAX_RATING, MIN_RATING, RATINGS_KEY, RatingsStore};
pub use record::{GameId, GameRecord, NamedEntity, PlatformEntry};

use gamedex_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("Invalid rating {0}: must be between 1 and 5")]
    InvalidRating(i64),

    #[error("Invalid filter value {value:?} for {kind}")]
    InvalidFilter { kind: &'static str, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
