//! Catalog state engine for Gamedex
//!
//! Owns the derived catalog view: search/filter/sort criteria over the
//! fetched records, local pagination, infinite-scroll extension of the
//! remote listing, the favorites/catalog view switch, and the persisted
//! favorites and user ratings.
//!
//! The engine produces data only. [`render`] turns records into display
//! values for whatever frontend consumes them.

mod debounce;
mod engine;
pub mod render;
mod scroll;
mod state;
mod view;

pub use debounce::Debouncer;
pub use engine::{AvailableFilters, CatalogEngine};
pub use scroll::{ScrollMetrics, ScrollOutcome};
pub use state::{CatalogState, ViewMode};
pub use view::{CatalogPage, CatalogView};

use gamedex_fetch::FetchError;
use gamedex_library::LibraryError;
use gamedex_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(#[from] FetchError),

    #[error("Invalid rating {0}: must be between 1 and 5")]
    InvalidRating(i64),

    #[error("Invalid filter value {value:?} for {kind}")]
    InvalidFilter { kind: &'static str, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<LibraryError> for CatalogError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::InvalidRating(value) => CatalogError::InvalidRating(value),
            LibraryError::InvalidFilter { kind, value } => CatalogError::InvalidFilter { kind, value },
            LibraryError::Storage(e) => CatalogError::Storage(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::from(FetchError::Status(500));
        assert_eq!(format!("{}", err), "Network error: Server returned HTTP 500");

        let err = CatalogError::from(LibraryError::InvalidRating(0));
        assert!(matches!(err, CatalogError::InvalidRating(0)));
        assert_eq!(format!("{}", err), "Invalid rating 0: must be between 1 and 5");

        let err = CatalogError::InvalidFilter {
            kind: "genre",
            value: "Puzzle".to_string(),
        };
        assert_eq!(format!("{}", err), "Invalid filter value \"Puzzle\" for genre");
    }
}
