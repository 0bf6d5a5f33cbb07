//! Listing transport abstraction and payload parsing

use crate::FetchError;
use gamedex_library::GameRecord;
use serde::Deserialize;
use std::future::Future;

/// One page of listing results
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub records: Vec<GameRecord>,
    /// Total remote pages reported by the server (at least 1)
    pub total_pages: u32,
}

/// Source of paged game listings.
///
/// Returns `impl Future + Send` so callers can hold the future across
/// `tokio` task boundaries.
pub trait ListingSource: Send + Sync {
    /// Fetch page `page` (1-based) with at most `limit` records
    fn fetch_page(
        &self,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = Result<ListingPage, FetchError>> + Send;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListingBody {
    Bare(Vec<GameRecord>),
    Paged {
        #[serde(default)]
        results: Option<Vec<GameRecord>>,
        #[serde(default, rename = "totalPages")]
        total_pages: Option<u32>,
    },
}

/// Parse a listing response body.
///
/// Accepts `{ "results": [...], "totalPages": n }` and a bare record array.
/// Missing `results` is an empty batch; missing or zero `totalPages` is 1.
pub fn parse_listing(body: &str) -> Result<ListingPage, FetchError> {
    let parsed: ListingBody =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    let page = match parsed {
        ListingBody::Bare(records) => ListingPage {
            records,
            total_pages: 1,
        },
        ListingBody::Paged {
            results,
            total_pages,
        } => ListingPage {
            records: results.unwrap_or_default(),
            total_pages: total_pages.filter(|n| *n > 0).unwrap_or(1),
        },
    };

    Ok(page)
}
