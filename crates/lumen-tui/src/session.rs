use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use lumen_core::{history, HistoryStore, Registry, Resolver};
use lumen_platform::Platform;

/// State shared by the model and its pages for the whole process.
///
/// The registry is read-only; the history store is the only mutable part.
pub struct Session {
    pub registry: Arc<Registry>,
    pub resolver: Resolver,
    pub platform: Platform,
    history: Mutex<HistoryStore>,
    next_runner: AtomicU64,
}

impl Session {
    pub fn new(registry: Registry, platform: Platform, history: HistoryStore) -> Arc<Self> {
        let resolver = Resolver::new(platform.fetcher.clone());
        Arc::new(Self {
            registry: Arc::new(registry),
            resolver,
            platform,
            history: Mutex::new(history),
            next_runner: AtomicU64::new(1),
        })
    }

    /// Last-run timestamp of a root item, 0 if unknown.
    pub fn last_run(&self, id: &str) -> i64 {
        self.history
            .lock()
            .map(|history| history.last_run(id))
            .unwrap_or(0)
    }

    /// Record a run of `id` now and persist the history file.
    pub fn record_run(&self, id: &str) {
        match self.history.lock() {
            Ok(mut history) => history.record_and_persist(id, history::now()),
            Err(e) => tracing::debug!(error = %e, "history lock poisoned"),
        }
    }

    pub(crate) fn next_runner_id(&self) -> u64 {
        self.next_runner.fetch_add(1, Ordering::Relaxed)
    }
}
