//! The Pathway event-stack engine.
//!
//! A [`Context`] holds a LIFO stack of [`Event`]s and an ordered list of
//! subscribed [`Property`]s. A host loop calls [`Context::pump`] repeatedly;
//! each call pops one event, offers it to every property in subscription
//! order, and then runs the event's effect unless someone invalidated it.
//! Effects may fire more events, so a single self-refiring event keeps a
//! simulation going indefinitely.
//!
//! Engine handles are reference counted and single-threaded. Ownership runs
//! one way: contexts own their stacks and subscribers, events own their
//! children, and every back-reference is weak.

/// Contexts and their builder.
pub mod context;
/// Error types for engine operations.
pub mod error;
/// Events, effects, and the parent/child graph.
pub mod event;
/// Identifiers for events, properties, and game objects.
pub mod id;
/// Game objects, grids, tiles, and players.
pub mod model;
/// The mutable bag of data an event carries.
pub mod payload;
/// Properties and interceptors.
pub mod property;

/// Re-exports of the context types.
pub use context::{Context, ContextBuilder, WeakContext};
/// Re-exports of [`error::EngineError`] and [`error::EngineResult`].
pub use error::{EngineError, EngineResult};
/// Re-exports of the event types.
pub use event::{Event, EventBuilder, EventEffect};
/// Re-exports of the identifier types.
pub use id::{EventId, GameObjectId, PropertyId};
/// Re-export of [`payload::Payload`].
pub use payload::Payload;
/// Re-exports of the property types.
pub use property::{Interceptor, Property};
