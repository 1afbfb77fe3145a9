//! Inert domain records: game objects, the tile grid, and players.

/// Square grids of tiles.
pub mod grid;
/// Game objects and context membership.
pub mod object;
/// Players and their skills.
pub mod player;
/// Tiles and grid coordinates.
pub mod tile;

pub use grid::Grid;
pub use object::{Entity, GameObject, Membership, relocate};
pub use player::{Experience, Player};
pub use tile::{GridCoordinates, Tile, TileKind};
