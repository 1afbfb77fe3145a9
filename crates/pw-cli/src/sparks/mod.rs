//! Sparks: balls drifting around an arena, rendered as ASCII gradients.
//!
//! One self-refiring heartbeat event keeps the context's stack alive. Each
//! beat pushes a frame render and one move per ball; a subscribed
//! [`BounceProperty`] vetoes moves that would leave the arena and queues a
//! bounce in their place.

mod ball;
mod bounce;
mod config;
mod driver;
mod error;
mod events;
mod view;

pub use ball::Ball;
pub use bounce::BounceProperty;
pub use config::SparksConfig;
pub use driver::{Sparks, SparksStats};
pub use error::{SparksError, SparksResult};
pub use view::{AsciiView, shade};
