//! Catalog state: criteria, derived records, local pagination

use gamedex_library::{FilterCriteria, GameRecord};

/// Which collection is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Catalog,
    Favorites,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Catalog => ViewMode::Favorites,
            ViewMode::Favorites => ViewMode::Catalog,
        }
    }
}

/// Derived view over the fetched records.
///
/// The fetched records themselves live in the fetch coordinator; this holds
/// what is computed from them. `current_page` is 1-based and stays within
/// `1..=max(1, total_pages)` after every recomputation.
#[derive(Debug, Clone)]
pub struct CatalogState {
    pub criteria: FilterCriteria,
    pub filtered: Vec<GameRecord>,
    pub current_page: usize,
    pub page_size: usize,
    pub view_mode: ViewMode,
    /// Last fetch failure, cleared by the next successful fetch
    pub last_error: Option<String>,
}

impl CatalogState {
    pub fn new(page_size: usize) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            current_page: 1,
            page_size: page_size.max(1),
            view_mode: ViewMode::Catalog,
            last_error: None,
        }
    }

    /// Pages needed for the filtered records (0 when empty)
    pub fn total_pages(&self) -> usize {
        self.filtered.len().div_ceil(self.page_size)
    }

    /// Replace the filtered records and pull the current page back in range
    pub fn set_filtered(&mut self, filtered: Vec<GameRecord>) {
        self.filtered = filtered;
        self.clamp_page();
    }

    pub fn clamp_page(&mut self) {
        self.current_page = self.current_page.clamp(1, self.total_pages().max(1));
    }

    /// Move one page forward or back. Returns false (and changes nothing)
    /// if the target page is outside `1..=total_pages`.
    pub fn step_page(&mut self, delta: i64) -> bool {
        let Some(target) = (self.current_page as i64).checked_add(delta) else {
            return false;
        };
        if target < 1 || target > self.total_pages() as i64 {
            return false;
        }
        self.current_page = target as usize;
        true
    }

    /// Whether local pages remain after the current one
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Records on the current page
    pub fn page_records(&self) -> &[GameRecord] {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.filtered.len());
        self.filtered.get(start..end).unwrap_or(&[])
    }
}
