//! Virtual file layer for Pathway.
//!
//! A [`ResourceManager`] merges one or more [`ResourceRoot`]s (plain
//! directories, zip/jar archives, in-memory embedded files) into a single
//! logical tree. Logical paths are `/`-separated and rooted at `/`.
//! Resolved handles are cached, so asking for the same path twice yields
//! the same [`Rc<FileHandle>`](std::rc::Rc).

/// Read-only index over a zip or jar archive.
pub mod archive;
/// Error types for the resource layer.
pub mod error;
/// Resolved file handles.
pub mod handle;
/// The resolving, caching resource manager.
pub mod manager;
/// Logical path normalization helpers.
pub mod path;
/// Backing root descriptions.
pub mod root;

/// Re-exports of [`error::ResourceError`] and [`error::ResourceResult`].
pub use error::{ResourceError, ResourceResult};
/// Re-export of [`handle::FileHandle`].
pub use handle::FileHandle;
/// Re-exports of the manager and its builder.
pub use manager::{ResourceManager, ResourceManagerBuilder};
/// Re-exports of root descriptions.
pub use root::{EmbeddedRoot, LoadOrder, ResourceRoot};
