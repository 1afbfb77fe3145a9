use std::error::Error;
use std::sync::Arc;

use crate::cache::ConcurrentCache;
use crate::destination::LogDestination;
use crate::error::LogResult;

/// Cause lines written for one error before the chain is cut short.
const MAX_CAUSE_LINES: usize = 50;

/// A destination that deliberately does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl LogDestination for NullLog {
    fn log_tagged(&self, _tag: &str, _message: &str) {}

    fn log_tagged_error(&self, _tag: &str, _message: &str, _error: &dyn Error) {}
}

/// Forwards log lines to the active `tracing` subscriber.
///
/// Plain lines are emitted at `INFO`, error lines at `ERROR`, both with the
/// tag as a structured field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogDestination for TracingLog {
    fn log_tagged(&self, tag: &str, message: &str) {
        tracing::info!(target: "pathway", tag, "{message}");
    }

    fn log_tagged_error(&self, tag: &str, message: &str, error: &dyn Error) {
        tracing::error!(target: "pathway", tag, error = %error, "{message}");
    }
}

/// Rolls log lines into a [`ConcurrentCache`] so they can be inspected later.
///
/// Lines are stored as `"<tag>: <message>"`. An attached error adds a
/// `"With: <error>"` line followed by one `"Caused by: ..."` line per source
/// in its chain.
#[derive(Debug, Clone)]
pub struct CacheLog {
    cache: Arc<ConcurrentCache<String>>,
}

impl CacheLog {
    /// Create a log backed by a cache holding `capacity` lines.
    pub fn new(capacity: usize) -> LogResult<Self> {
        Ok(Self::with_cache(Arc::new(ConcurrentCache::new(capacity)?)))
    }

    /// Create a log writing into an existing cache.
    pub fn with_cache(cache: Arc<ConcurrentCache<String>>) -> Self {
        Self { cache }
    }

    /// The cache backing this log.
    pub fn cache(&self) -> &Arc<ConcurrentCache<String>> {
        &self.cache
    }

    /// Snapshot of the cached lines, newest first.
    pub fn lines(&self) -> Vec<String> {
        self.cache.unwind()
    }
}

impl Default for CacheLog {
    fn default() -> Self {
        Self::with_cache(Arc::new(ConcurrentCache::default()))
    }
}

impl LogDestination for CacheLog {
    fn log_tagged(&self, tag: &str, message: &str) {
        self.cache.insert(format!("{tag}: {message}"));
    }

    fn log_tagged_error(&self, tag: &str, message: &str, error: &dyn Error) {
        self.log_tagged(tag, message);
        self.cache.insert(format!("With: {error}"));

        let mut cause = error.source();
        let mut written = 0;
        while let Some(current) = cause {
            if written == MAX_CAUSE_LINES {
                self.cache.insert("and more...".to_string());
                break;
            }
            self.cache.insert(format!("Caused by: {current}"));
            written += 1;
            cause = current.source();
        }
    }
}
