//! Coalesces rapid search input.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Lets only the most recent of a burst of inputs through.
///
/// Each call to [`debounce`](Self::debounce) waits `delay` and then yields its
/// value only if no newer call started in the meantime. Clones share the same
/// generation counter, so one per input field.
#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn debounce<T>(&self, value: T) -> Option<T> {
        let ticket = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tokio::time::sleep(self.delay).await;
        (self.generation.load(Ordering::Acquire) == ticket).then_some(value)
    }
}
