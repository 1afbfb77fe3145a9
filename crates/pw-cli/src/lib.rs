//! Library half of the `pathway` binary.
//!
//! Holds the Sparks sample so it can be driven from tests as well as from
//! the command line.

/// The bouncing-balls sample built on the event-stack engine.
pub mod sparks;
