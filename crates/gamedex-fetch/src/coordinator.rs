//! Fetch coordination: cumulative record set and remote cursor

use crate::listing::ListingSource;
use crate::FetchError;
use gamedex_library::{FilterOptions, GameId, GameRecord};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a [`FetchCoordinator::fetch_page`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The batch was merged into the record set
    Applied { fetched: usize, total_pages: u32 },
    /// Another non-append fetch was in flight; nothing was requested
    Skipped,
}

#[derive(Debug, Default)]
struct FetchState {
    records: Vec<GameRecord>,
    remote_current_page: u32,
    remote_total_pages: u32,
    options: FilterOptions,
}

/// Clears the loading flag when dropped, whatever the fetch outcome
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Issues paged fetches and keeps every record fetched so far.
///
/// Records are kept in fetch order. Appended pages are concatenated as-is,
/// so a game served on two overlapping pages appears twice.
///
/// Responses are applied in arrival order; a slow response for an older
/// request overwrites a newer one.
pub struct FetchCoordinator<L> {
    source: L,
    limit: u32,
    state: Mutex<FetchState>,
    loading: AtomicBool,
}

impl<L: ListingSource> FetchCoordinator<L> {
    /// Create a coordinator requesting `limit` records per remote page
    pub fn new(source: L, limit: u32) -> Self {
        Self {
            source,
            limit,
            state: Mutex::new(FetchState::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Fetch remote page `page`.
    ///
    /// With `append == false` the batch replaces the record set, and the call
    /// is skipped if another non-append fetch is still pending. With
    /// `append == true` the batch is added to the end of the record set.
    /// On failure the record set and cursor are left untouched.
    pub async fn fetch_page(&self, page: u32, append: bool) -> Result<FetchOutcome, FetchError> {
        let _guard = if append {
            None
        } else {
            match LoadingGuard::acquire(&self.loading) {
                Some(guard) => Some(guard),
                None => {
                    tracing::debug!("Fetch of page {} dropped: already loading", page);
                    return Ok(FetchOutcome::Skipped);
                }
            }
        };

        let listing = match self.source.fetch_page(page, self.limit).await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!("Failed to fetch listing page {}: {}", page, e);
                return Err(e);
            }
        };

        let fetched = listing.records.len();
        let total_pages = listing.total_pages;

        let mut state = self.lock();
        state.options.absorb(&listing.records);
        if append {
            state.records.extend(listing.records);
        } else {
            state.records = listing.records;
        }
        state.remote_current_page = page;
        state.remote_total_pages = total_pages;

        tracing::info!(
            "Fetched page {}/{}: {} records ({} held)",
            page,
            total_pages,
            fetched,
            state.records.len()
        );

        Ok(FetchOutcome::Applied {
            fetched,
            total_pages,
        })
    }

    /// Whether a non-append fetch is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Run `f` over the current record set without copying it
    pub fn with_records<R>(&self, f: impl FnOnce(&[GameRecord]) -> R) -> R {
        f(&self.lock().records)
    }

    /// Number of records held (duplicates included)
    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    /// First held record with the given id
    pub fn find(&self, id: &GameId) -> Option<GameRecord> {
        let key = id.key();
        self.lock().records.iter().find(|r| r.key() == key).cloned()
    }

    /// Last successfully fetched remote page (0 before the first fetch)
    pub fn remote_current_page(&self) -> u32 {
        self.lock().remote_current_page
    }

    /// Remote page count from the last successful fetch (0 before the first fetch)
    pub fn remote_total_pages(&self) -> u32 {
        self.lock().remote_total_pages
    }

    /// Whether the server reported pages beyond the last one fetched
    pub fn has_more_remote(&self) -> bool {
        let state = self.lock();
        state.remote_current_page < state.remote_total_pages
    }

    /// Genres and platform families discovered so far
    pub fn filter_options(&self) -> FilterOptions {
        self.lock().options.clone()
    }

    pub fn source(&self) -> &L {
        &self.source
    }

    fn lock(&self) -> MutexGuard<'_, FetchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
