//! Service state
//!
//! Shared state handed to every route handler. The only per-call input a
//! handler draws from it is a random sample; nothing a handler does here
//! changes how later calls are answered.

use parking_lot::Mutex;
use std::sync::Arc;

use super::metrics::RequestMetrics;
use super::random::{OsSeededRandom, RandomSource};

/// Shared service state
#[derive(Clone)]
pub struct ServiceState {
    random: Arc<Mutex<Box<dyn RandomSource>>>,
    metrics: RequestMetrics,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl ServiceState {
    /// Create state backed by an OS-seeded random source
    pub fn new() -> Self {
        Self::with_random(OsSeededRandom::new())
    }

    /// Create state backed by the given random source
    pub fn with_random(source: impl RandomSource + 'static) -> Self {
        Self {
            random: Arc::new(Mutex::new(Box::new(source))),
            metrics: RequestMetrics::new(),
        }
    }

    /// Draw one uniform sample in `[0, 1)`
    pub fn draw(&self) -> f64 {
        self.random.lock().next_unit()
    }

    /// Request metrics recorded by the tracking middleware
    pub fn metrics(&self) -> &RequestMetrics {
        &self.metrics
    }
}
