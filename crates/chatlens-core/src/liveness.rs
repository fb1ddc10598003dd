//! "Still mounted" flag shared between a screen session and its in-flight work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle; all clones observe the same flag.
///
/// Tearing down does not abort anything already awaiting. It only tells the
/// awaiting code to skip its display-side follow-up.
#[derive(Debug, Clone)]
pub struct LivenessHandle {
    active: Arc<AtomicBool>,
}

impl LivenessHandle {
    pub fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn teardown(&self) {
        self.active.store(false, Ordering::Release);
    }
}

impl Default for LivenessHandle {
    fn default() -> Self {
        Self::new()
    }
}
