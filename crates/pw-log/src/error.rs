/// Alias for `Result<T, LogError>`.
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while configuring log destinations.
///
/// Logging itself never fails; only construction can.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A cache was requested with room for zero lines.
    #[error("cache capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),
}
