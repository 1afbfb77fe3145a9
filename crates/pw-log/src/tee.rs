use std::error::Error;

use crate::destination::{LogDestination, Logger};
use crate::sink::{CacheLog, TracingLog};

/// Sends every call it receives, unchanged, to two child destinations.
///
/// A tee writes nothing on its own.
#[derive(Clone)]
pub struct LogTee {
    a: Logger,
    b: Logger,
}

impl LogTee {
    /// Multiplex two destinations.
    pub fn new(a: Logger, b: Logger) -> Self {
        Self { a, b }
    }

    /// The first destination.
    pub fn a(&self) -> &Logger {
        &self.a
    }

    /// The second destination.
    pub fn b(&self) -> &Logger {
        &self.b
    }
}

impl Default for LogTee {
    /// A 200-line cache plus the `tracing` subscriber.
    fn default() -> Self {
        Self::new(
            std::sync::Arc::new(CacheLog::default()),
            std::sync::Arc::new(TracingLog),
        )
    }
}

impl std::fmt::Debug for LogTee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogTee").finish_non_exhaustive()
    }
}

impl LogDestination for LogTee {
    fn log_tagged(&self, tag: &str, message: &str) {
        self.a.log_tagged(tag, message);
        self.b.log_tagged(tag, message);
    }

    fn log_tagged_error(&self, tag: &str, message: &str, error: &dyn Error) {
        self.a.log_tagged_error(tag, message, error);
        self.b.log_tagged_error(tag, message, error);
    }

    fn log(&self, message: &str) {
        self.a.log(message);
        self.b.log(message);
    }

    fn log_error(&self, message: &str, error: &dyn Error) {
        self.a.log_error(message, error);
        self.b.log_error(message, error);
    }
}
