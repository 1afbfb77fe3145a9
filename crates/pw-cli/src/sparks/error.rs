use pw_script::ScriptError;
use thiserror::Error;

use super::config::MIN_SIDE;

/// Errors raised while setting up or running Sparks.
#[derive(Debug, Error)]
pub enum SparksError {
    #[error("arena {width}x{height} is too small (minimum {MIN_SIDE}x{MIN_SIDE})")]
    ArenaTooSmall { width: usize, height: usize },

    #[error("event stack ran dry before a frame was rendered")]
    Stalled,

    #[error(transparent)]
    Script(#[from] ScriptError),
}

pub type SparksResult<T> = Result<T, SparksError>;
