//! Fixed-size worker pool.
//!
//! Every request must hold one of a fixed number of permits while it runs.
//! When all permits are taken, further requests wait for one to free up;
//! there is no queue-depth limit beyond the OS connection backlog.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tower::limit::GlobalConcurrencyLimitLayer;

/// Shared permit pool. Clones share the same permits.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
        }
    }

    /// Concurrency limit drawing on this pool.
    ///
    /// `Router::layer` wraps each route separately, so the layer must share
    /// one semaphore across all of them to bound the whole server.
    pub fn layer(&self) -> GlobalConcurrencyLimitLayer {
        GlobalConcurrencyLimitLayer::with_semaphore(self.permits.clone())
    }

    /// Permits not currently held by a request.
    #[cfg(test)]
    fn available(&self) -> usize {
        self.permits.available_permits()
    }
}
