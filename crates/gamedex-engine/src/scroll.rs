//! Infinite-scroll trigger

use crate::view::CatalogPage;
use std::sync::atomic::{AtomicBool, Ordering};

/// Viewport geometry reported by the frontend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    /// Whether the viewport bottom is within `threshold` of the document end
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - threshold
    }
}

/// Result of handling a scroll event
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollOutcome {
    /// Not near the bottom, not in the catalog view, or busy
    Ignored,
    /// Moved to the next local page
    Advanced(CatalogPage),
    /// Appended the next remote page
    Extended(CatalogPage),
    /// No more remote pages, or the record cap is reached
    Exhausted,
    /// Appending failed; state is unchanged
    Failed(String),
}

/// Clears the in-flight flag on drop
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
