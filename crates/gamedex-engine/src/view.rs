//! Renderable snapshots handed to the presentation layer

use crate::state::CatalogState;
use gamedex_library::GameRecord;

/// One page of the filtered catalog
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub records: Vec<GameRecord>,
    /// 1-based
    pub current_page: usize,
    /// 0 when nothing matches
    pub total_pages: usize,
    /// Filtered record count across all pages
    pub total_count: usize,
    pub filters_active: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl CatalogPage {
    pub(crate) fn snapshot(state: &CatalogState, loading: bool) -> Self {
        Self {
            records: state.page_records().to_vec(),
            current_page: state.current_page,
            total_pages: state.total_pages(),
            total_count: state.filtered.len(),
            filters_active: state.criteria.is_active(),
            loading,
            error: state.last_error.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// A failed fetch the user can retry
    pub fn is_retryable(&self) -> bool {
        self.error.is_some()
    }
}

/// What the active view shows
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogView {
    Catalog(CatalogPage),
    /// Every favorite, unpaginated and unfiltered
    Favorites(Vec<GameRecord>),
}

impl CatalogView {
    pub fn records(&self) -> &[GameRecord] {
        match self {
            CatalogView::Catalog(page) => &page.records,
            CatalogView::Favorites(records) => records,
        }
    }

    pub fn is_favorites(&self) -> bool {
        matches!(self, CatalogView::Favorites(_))
    }
}
