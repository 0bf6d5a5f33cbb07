//! Catalog engine: the single owner of catalog, favorites and ratings state

use crate::debounce::Debouncer;
use crate::render::{self, GameCard, GameDetails};
use crate::scroll::{InFlight, ScrollMetrics, ScrollOutcome};
use crate::state::{CatalogState, ViewMode};
use crate::view::{CatalogPage, CatalogView};
use crate::CatalogError;
use gamedex_config::{FilterConfig, GamedexConfig, PagingConfig};
use gamedex_fetch::{FetchCoordinator, FetchOutcome, HttpListing, ListingSource};
use gamedex_library::{
    FavoritesStore, FilterCriteria, FilterOptions, GameId, GameRecord, LibraryError, RatingSort,
    RatingsStore, derive, fold_platform_family,
};
use gamedex_storage::{FileStore, KeyValueStore};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Filter values the user can pick, plus what the fetched records contain
#[derive(Debug, Clone, PartialEq)]
pub struct AvailableFilters {
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub discovered: FilterOptions,
}

struct EngineState {
    catalog: CatalogState,
    favorites: FavoritesStore,
    ratings: RatingsStore,
}

/// Owns every piece of catalog state and exposes the user operations.
///
/// All methods take `&self`. State sits behind a mutex that is never held
/// across a network await; the fetched record set lives in the
/// [`FetchCoordinator`] and the derived view is recomputed from it.
pub struct CatalogEngine<L> {
    paging: PagingConfig,
    filters: FilterConfig,
    fetcher: FetchCoordinator<L>,
    state: Mutex<EngineState>,
    scroll_in_flight: AtomicBool,
    search_debounce: Debouncer,
}

impl CatalogEngine<HttpListing> {
    /// Engine over the configured HTTP endpoint with file-backed persistence
    pub fn open(config: &GamedexConfig) -> Result<Self, CatalogError> {
        let source = HttpListing::new(&config.api)?;
        let store = FileStore::open(&config.storage.data_dir)?;
        tracing::debug!("Persisting to {}", store.dir().display());
        Ok(Self::new(config, source, Arc::new(store)))
    }
}

impl<L: ListingSource> CatalogEngine<L> {
    pub fn new(config: &GamedexConfig, source: L, store: Arc<dyn KeyValueStore>) -> Self {
        let favorites = FavoritesStore::load(Arc::clone(&store));
        let ratings = RatingsStore::load(store);

        Self {
            paging: config.paging.clone(),
            filters: config.filters.clone(),
            fetcher: FetchCoordinator::new(source, config.api.fetch_limit),
            state: Mutex::new(EngineState {
                catalog: CatalogState::new(config.paging.page_size),
                favorites,
                ratings,
            }),
            scroll_in_flight: AtomicBool::new(false),
            search_debounce: Debouncer::new(config.search.debounce()),
        }
    }

    /// Fetch remote page 1, replacing the record set.
    ///
    /// On failure the previous records stay in place and the error is kept
    /// on the catalog page until a later load succeeds. A call made while
    /// another load is pending is dropped and returns the current page.
    pub async fn load(&self) -> Result<CatalogPage, CatalogError> {
        tracing::info!("Loading catalog");

        match self.fetcher.fetch_page(1, false).await {
            Ok(FetchOutcome::Applied { .. }) => {
                let mut state = self.lock();
                state.catalog.last_error = None;
                state.catalog.current_page = 1;
                self.recompute(&mut state.catalog);
                Ok(self.page_of(&state.catalog))
            }
            Ok(FetchOutcome::Skipped) => Ok(self.current_page()),
            Err(e) => {
                self.lock().catalog.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Re-issue the initial load after a failure
    pub async fn retry(&self) -> Result<CatalogPage, CatalogError> {
        tracing::debug!("Retrying catalog load");
        self.load().await
    }

    /// Apply a search term immediately. Recomputes from the held records
    /// without fetching.
    pub fn search(&self, term: &str) -> CatalogPage {
        self.update_criteria(|criteria| criteria.set_search(term))
    }

    /// Apply `term` once input has been quiet for the configured period.
    ///
    /// Returns `None` if a newer call superseded this one.
    pub async fn search_debounced(&self, term: &str) -> Option<CatalogPage> {
        if self.search_debounce.settle().await {
            Some(self.search(term))
        } else {
            tracing::trace!("Search {:?} superseded", term);
            None
        }
    }

    /// Filter by genre. `"all"` (or empty) clears the filter; anything else
    /// must be one of the allowed genres.
    pub fn set_genre_filter(&self, value: &str) -> Result<CatalogPage, CatalogError> {
        let genre = allowed_choice("genre", value, &self.filters.allowed_genres)?;
        Ok(self.update_criteria(|criteria| criteria.genre = genre))
    }

    /// Filter by platform family. `"all"` (or empty) clears the filter.
    pub fn set_platform_filter(&self, value: &str) -> Result<CatalogPage, CatalogError> {
        let platform = allowed_choice("platform", value, &self.filters.allowed_platforms)?
            .map(|name| fold_platform_family(&name));
        Ok(self.update_criteria(|criteria| criteria.platform = platform))
    }

    pub fn set_rating_sort(&self, sort: RatingSort) -> CatalogPage {
        self.update_criteria(|criteria| criteria.rating_sort = sort)
    }

    /// Move `delta` pages. Out-of-range targets leave the page unchanged.
    pub fn change_page(&self, delta: i64) -> CatalogPage {
        let mut state = self.lock();
        if !state.catalog.step_page(delta) {
            tracing::debug!(
                "Page change {:+} ignored at page {}/{}",
                delta,
                state.catalog.current_page,
                state.catalog.total_pages()
            );
        }
        self.page_of(&state.catalog)
    }

    /// Handle a scroll event in the catalog view.
    ///
    /// Near the bottom, the next local page is shown if there is one;
    /// otherwise the next remote page is appended, as long as remote pages
    /// remain and fewer than the record cap are held. Only one such
    /// extension runs at a time, and none while a load is pending.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> ScrollOutcome {
        if !metrics.is_near_bottom(self.paging.scroll_threshold_px) || self.fetcher.is_loading() {
            return ScrollOutcome::Ignored;
        }

        let Some(_in_flight) = InFlight::acquire(&self.scroll_in_flight) else {
            tracing::debug!("Scroll ignored: already loading more");
            return ScrollOutcome::Ignored;
        };

        {
            let mut state = self.lock();
            if state.catalog.view_mode != ViewMode::Catalog {
                return ScrollOutcome::Ignored;
            }
            if state.catalog.step_page(1) {
                return ScrollOutcome::Advanced(self.page_of(&state.catalog));
            }
        }

        if !self.fetcher.has_more_remote() {
            tracing::debug!("No more remote pages");
            return ScrollOutcome::Exhausted;
        }
        let held = self.fetcher.record_count();
        if held >= self.paging.scroll_record_cap {
            tracing::debug!(
                "Record cap reached ({} held, cap {})",
                held,
                self.paging.scroll_record_cap
            );
            return ScrollOutcome::Exhausted;
        }

        let next = self.fetcher.remote_current_page() + 1;
        match self.fetcher.fetch_page(next, true).await {
            Ok(_) => {
                let mut state = self.lock();
                self.recompute(&mut state.catalog);
                ScrollOutcome::Extended(self.page_of(&state.catalog))
            }
            Err(e) => {
                tracing::warn!("Loading more games failed: {}", e);
                ScrollOutcome::Failed(e.to_string())
            }
        }
    }

    /// Add or remove a favorite and return the refreshed active view
    pub fn toggle_favorite(&self, record: &GameRecord) -> CatalogView {
        let mut state = self.lock();
        let now_favorite = state.favorites.toggle(record);
        tracing::info!(
            "{} {} favorites",
            if now_favorite { "Added to" } else { "Removed from" },
            record.id
        );
        self.view_of(&state)
    }

    /// Record a 1-5 star rating, persisting it immediately
    pub fn set_rating(&self, id: &GameId, value: i64) -> Result<u8, CatalogError> {
        let stars = self.lock().ratings.set(id, value)?;
        tracing::info!("Rated {} {}/5", id, stars);
        Ok(stars)
    }

    pub fn toggle_view_mode(&self) -> CatalogView {
        let mut state = self.lock();
        state.catalog.view_mode = state.catalog.view_mode.toggled();
        tracing::debug!("Switched to {:?} view", state.catalog.view_mode);
        self.view_of(&state)
    }

    /// Leave the favorites view and show the current catalog page
    pub fn show_catalog(&self) -> CatalogPage {
        let mut state = self.lock();
        state.catalog.view_mode = ViewMode::Catalog;
        self.page_of(&state.catalog)
    }

    pub fn current_view(&self) -> CatalogView {
        self.view_of(&self.lock())
    }

    pub fn current_page(&self) -> CatalogPage {
        self.page_of(&self.lock().catalog)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.lock().catalog.view_mode
    }

    pub fn criteria(&self) -> FilterCriteria {
        self.lock().catalog.criteria.clone()
    }

    pub fn favorites(&self) -> Vec<GameRecord> {
        self.lock().favorites.list().to_vec()
    }

    pub fn is_favorite(&self, id: &GameId) -> bool {
        self.lock().favorites.is_favorite(id)
    }

    pub fn rating(&self, id: &GameId) -> Option<u8> {
        self.lock().ratings.get(id)
    }

    pub fn filter_options(&self) -> AvailableFilters {
        AvailableFilters {
            genres: self.filters.allowed_genres.clone(),
            platforms: self.filters.allowed_platforms.clone(),
            discovered: self.fetcher.filter_options(),
        }
    }

    /// Look up a record among the fetched records, then the favorites
    pub fn find(&self, id: &GameId) -> Option<GameRecord> {
        self.fetcher.find(id).or_else(|| {
            self.lock()
                .favorites
                .list()
                .iter()
                .find(|record| record.id.key() == id.key())
                .cloned()
        })
    }

    pub fn card(&self, record: &GameRecord) -> GameCard {
        render::card(record, self.is_favorite(&record.id))
    }

    pub fn cards(&self, records: &[GameRecord]) -> Vec<GameCard> {
        let state = self.lock();
        records
            .iter()
            .map(|record| render::card(record, state.favorites.is_favorite(&record.id)))
            .collect()
    }

    pub fn details(&self, record: &GameRecord) -> GameDetails {
        let state = self.lock();
        render::details(
            record,
            state.favorites.is_favorite(&record.id),
            state.ratings.get(&record.id),
        )
    }

    /// Records held from the remote listing, duplicates included
    pub fn record_count(&self) -> usize {
        self.fetcher.record_count()
    }

    pub fn is_loading(&self) -> bool {
        self.fetcher.is_loading()
    }

    pub fn has_more_remote(&self) -> bool {
        self.fetcher.has_more_remote()
    }

    pub fn source(&self) -> &L {
        self.fetcher.source()
    }

    /// Change the criteria, go back to page 1 and recompute
    fn update_criteria(&self, change: impl FnOnce(&mut FilterCriteria)) -> CatalogPage {
        let mut state = self.lock();
        change(&mut state.catalog.criteria);
        state.catalog.current_page = 1;
        self.recompute(&mut state.catalog);
        self.page_of(&state.catalog)
    }

    fn recompute(&self, catalog: &mut CatalogState) {
        let filtered = self
            .fetcher
            .with_records(|records| derive(records, &catalog.criteria));
        catalog.set_filtered(filtered);
    }

    fn page_of(&self, catalog: &CatalogState) -> CatalogPage {
        CatalogPage::snapshot(catalog, self.fetcher.is_loading())
    }

    fn view_of(&self, state: &EngineState) -> CatalogView {
        match state.catalog.view_mode {
            ViewMode::Catalog => CatalogView::Catalog(self.page_of(&state.catalog)),
            ViewMode::Favorites => CatalogView::Favorites(state.favorites.list().to_vec()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Resolve a user-supplied filter value against the allowed list.
///
/// `"all"` and empty input mean no filter. Matching ignores case and
/// returns the canonical spelling.
fn allowed_choice(
    kind: &'static str,
    value: &str,
    allowed: &[String],
) -> Result<Option<String>, LibraryError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    allowed
        .iter()
        .find(|choice| choice.eq_ignore_ascii_case(value))
        .map(|choice| Some(choice.clone()))
        .ok_or_else(|| LibraryError::InvalidFilter {
            kind,
            value: value.to_string(),
        })
}
