//! Script evaluation for Pathway.
//!
//! The engine talks to scripts only through the [`ScriptContainer`] trait.
//! [`RhaiContainer`] is the stock implementation; a [`ScriptEnvironment`]
//! is a named set of bindings that can be linked into any number of
//! containers at once.

/// Engine limits applied to Rhai containers.
pub mod config;
/// The container trait and the identifier rules it enforces.
pub mod container;
/// The Rhai-backed container.
pub mod engine;
/// Shared binding sets.
pub mod environment;
/// Error types for script evaluation.
pub mod error;
/// Engine-neutral script values.
pub mod value;

/// Re-export of [`config::ScriptConfig`].
pub use config::ScriptConfig;
/// Re-exports of the container trait and its shared handle.
pub use container::{ScriptContainer, SharedContainer, is_identifier, shared};
/// Re-export of [`engine::RhaiContainer`].
pub use engine::RhaiContainer;
/// Re-export of [`environment::ScriptEnvironment`].
pub use environment::ScriptEnvironment;
/// Re-exports of [`error::ScriptError`] and [`error::ScriptResult`].
pub use error::{ScriptError, ScriptResult};
/// Re-export of [`value::Value`].
pub use value::Value;
