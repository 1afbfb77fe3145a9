//! Diagnostic logging for Pathway.
//!
//! Engine types never talk to a global logger. Instead they carry a
//! [`Logger`] handle that was injected at construction, which defaults to
//! [`NullLog`]. Every destination swallows its own failures: a log call
//! never returns an error and never panics on a poisoned lock.

/// Thread-safe bounded history of log lines.
pub mod cache;
/// The [`LogDestination`] trait and the shared [`Logger`] handle.
pub mod destination;
/// Error types for the logging crate.
pub mod error;
/// Concrete destinations: null, tracing-backed, and cache-backed.
pub mod sink;
/// Fan-out destination writing to two children.
pub mod tee;

/// Re-export of [`cache::ConcurrentCache`].
pub use cache::ConcurrentCache;
/// Re-exports of the destination trait and handle helpers.
pub use destination::{LogDestination, Logger, context_tag};
/// Re-exports of [`error::LogError`] and [`error::LogResult`].
pub use error::{LogError, LogResult};
/// Re-exports of the concrete sinks.
pub use sink::{CacheLog, NullLog, TracingLog};
/// Re-export of [`tee::LogTee`].
pub use tee::LogTee;

use std::sync::Arc;

/// A logger that discards everything. The default for engine types.
pub fn null_logger() -> Logger {
    Arc::new(NullLog)
}

/// A logger that forwards every line to the `tracing` subscriber.
pub fn tracing_logger() -> Logger {
    Arc::new(TracingLog)
}

/// The standard development logger: a 200-line [`CacheLog`] teed with a
/// [`TracingLog`].
pub fn default_logger() -> Logger {
    Arc::new(LogTee::default())
}
