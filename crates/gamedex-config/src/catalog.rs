//! Paging, search and filter settings for the catalog engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Local pagination and infinite-scroll limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// Records per rendered page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Infinite scroll stops extending once this many records are held
    #[serde(default = "default_scroll_record_cap")]
    pub scroll_record_cap: usize,

    /// Distance from the document end (pixels) that counts as "near the bottom"
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold_px: f64,
}

fn default_page_size() -> usize {
    32
}

fn default_scroll_record_cap() -> usize {
    500
}

fn default_scroll_threshold() -> f64 {
    100.0
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            scroll_record_cap: default_scroll_record_cap(),
            scroll_threshold_px: default_scroll_threshold(),
        }
    }
}

/// Search input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a typed search term is applied
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Filter values offered to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_allowed_genres")]
    pub allowed_genres: Vec<String>,

    #[serde(default = "default_allowed_platforms")]
    pub allowed_platforms: Vec<String>,
}

fn default_allowed_genres() -> Vec<String> {
    ["Action", "RPG", "Adventure", "Simulation"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_allowed_platforms() -> Vec<String> {
    ["PC", "PlayStation", "Xbox", "Switch"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allowed_genres: default_allowed_genres(),
            allowed_platforms: default_allowed_platforms(),
        }
    }
}
