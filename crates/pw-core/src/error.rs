use pw_script::ScriptError;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised by engine operations outside of `pump`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A script or effect failed.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The property is not subscribed to any context.
    #[error("property {0} is not attached to a context")]
    Unattached(String),

    /// Grid coordinates fall outside the grid.
    #[error("({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
        /// Side length of the grid.
        size: usize,
    },
}
