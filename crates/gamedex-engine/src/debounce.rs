//! Trailing-edge debounce for bursty input

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Collapses a burst of calls into the last one.
///
/// Every call to [`Debouncer::settle`] bumps a generation counter, waits out
/// the quiet period, and reports whether it is still the newest call.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            generation: AtomicU64::new(0),
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Wait for the quiet period. Returns `false` if a newer call arrived
    /// in the meantime.
    pub async fn settle(&self) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiet).await;
        self.generation.load(Ordering::SeqCst) == generation
    }
}
