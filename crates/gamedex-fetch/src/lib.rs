//! Remote listing fetches for Gamedex
//!
//! Talks to the paged games listing API and accumulates the fetched records.
//!
//! # Features
//!
//! - [`ListingSource`] abstracts the transport: "fetch page N of size S"
//! - [`HttpListing`] is the `reqwest` implementation
//! - [`FetchCoordinator`] owns the cumulative record set and remote cursor,
//!   and drops overlapping non-append fetches
//! - [`mock::MockListing`] serves canned pages for tests

mod coordinator;
mod http;
mod listing;
pub mod mock;

pub use coordinator::{FetchCoordinator, FetchOutcome};
pub use http::HttpListing;
pub use listing::{ListingPage, ListingSource, parse_listing};

use thiserror::Error;

/// Fetch failures. Every variant is a recoverable network error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Server returned HTTP {0}")]
    Status(u16),

    #[error("Malformed listing payload: {0}")]
    Malformed(String),

    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
