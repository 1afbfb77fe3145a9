use pw_io::ResourceError;

/// Alias for `Result<T, ScriptError>`.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Errors raised while evaluating scripts or running event effects.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// No script text was supplied.
    #[error("no script was supplied")]
    InvalidScript,

    /// The interpreter rejected or failed to run the script.
    #[error("script evaluation failed: {0}")]
    Eval(String),

    /// The script file could not be read.
    #[error("cannot load script file")]
    File(#[from] ResourceError),

    /// A binding name is not a usable identifier.
    #[error("\"{0}\" cannot be used as a binding name")]
    Binding(String),

    /// A container was re-entered while it was already evaluating.
    #[error("script container is already in use")]
    Busy,

    /// An event effect failed for a reason of its own.
    #[error("event effect failed: {0}")]
    Effect(String),
}

impl From<Box<rhai::EvalAltResult>> for ScriptError {
    fn from(err: Box<rhai::EvalAltResult>) -> Self {
        Self::Eval(err.to_string())
    }
}

impl From<rhai::ParseError> for ScriptError {
    fn from(err: rhai::ParseError) -> Self {
        Self::Eval(err.to_string())
    }
}
