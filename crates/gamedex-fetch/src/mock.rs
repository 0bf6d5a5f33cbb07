//! Mock listing source for testing without a network
//!
//! # Usage
//!
//! ```no_run
//! use gamedex_fetch::mock::MockListing;
//! use gamedex_library::GameRecord;
//!
//! // Two remote pages
//! let mock = MockListing::new()
//!     .with_page(1, vec![GameRecord::new(1, "Celeste")], 2)
//!     .with_page(2, vec![GameRecord::new(2, "Hades")], 2);
//!
//! // Responses wait until `release` is called
//! let gated = MockListing::gated();
//! gated.release(1);
//! ```

use crate::listing::{ListingPage, ListingSource};
use crate::FetchError;
use gamedex_library::GameRecord;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
enum MockResponse {
    Page(ListingPage),
    Status(u16),
}

/// Serves canned listing pages. Unknown pages answer HTTP 404.
#[derive(Debug, Default)]
pub struct MockListing {
    responses: Mutex<HashMap<u32, MockResponse>>,
    requests: Mutex<Vec<u32>>,
    gate: Option<Semaphore>,
}

impl MockListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose responses are held until [`MockListing::release`]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Build a catalog of `total` generated records split into pages of `per_page`
    pub fn with_generated(total: usize, per_page: usize) -> Self {
        let mock = Self::new();
        mock.set_generated(total, per_page);
        mock
    }

    pub fn with_page(self, page: u32, records: Vec<GameRecord>, total_pages: u32) -> Self {
        self.set_page(page, records, total_pages);
        self
    }

    /// Serve `records` for `page`, replacing any previous response
    pub fn set_page(&self, page: u32, records: Vec<GameRecord>, total_pages: u32) {
        self.responses_mut().insert(
            page,
            MockResponse::Page(ListingPage {
                records,
                total_pages,
            }),
        );
    }

    /// Answer `page` with an HTTP error status
    pub fn fail_page(&self, page: u32, status: u16) {
        self.responses_mut().insert(page, MockResponse::Status(status));
    }

    /// Replace every page with generated records `Game 0 .. Game total-1`
    pub fn set_generated(&self, total: usize, per_page: usize) {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page).max(1) as u32;

        let mut responses = self.responses_mut();
        responses.clear();
        for page in 1..=total_pages {
            let start = (page as usize - 1) * per_page;
            let end = (start + per_page).min(total);
            let records = (start..end)
                .map(|i| GameRecord::new(i as i64, format!("Game {}", i)))
                .collect();
            responses.insert(
                page,
                MockResponse::Page(ListingPage {
                    records,
                    total_pages,
                }),
            );
        }
    }

    /// Let `n` held responses through
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Pages requested so far, in call order
    pub fn requests(&self) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn responses_mut(&self) -> std::sync::MutexGuard<'_, HashMap<u32, MockResponse>> {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ListingSource for MockListing {
    async fn fetch_page(&self, page: u32, _limit: u32) -> Result<ListingPage, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page);

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| FetchError::Client(e.to_string()))?;
            permit.forget();
        }

        let response = self.responses_mut().get(&page).cloned();
        match response {
            Some(MockResponse::Page(listing)) => Ok(listing),
            Some(MockResponse::Status(status)) => Err(FetchError::Status(status)),
            None => Err(FetchError::Status(404)),
        }
    }
}
