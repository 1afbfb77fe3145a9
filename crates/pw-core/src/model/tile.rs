use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::model::GameObject;
use crate::property::Property;

/// A position on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinates {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridCoordinates {
    /// Coordinates at `(x, y)`.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What a tile is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    /// Nothing at all.
    Empty,
    /// Impassable metal wall.
    MetalWall,
    /// Impassable rock wall.
    RockWall,
    /// Open water.
    Water,
    /// Molten rock.
    Lava,
    /// Walkable floor.
    Floor,
}

/// One cell of a grid.
#[derive(Debug, Clone)]
pub struct Tile {
    position: GridCoordinates,
    kind: TileKind,
    occupant: Option<Rc<dyn GameObject>>,
    properties: Vec<Property>,
    engineering_properties: Vec<Property>,
}

impl Tile {
    /// An unoccupied tile with no properties.
    pub fn new(position: GridCoordinates, kind: TileKind) -> Self {
        Self {
            position,
            kind,
            occupant: None,
            properties: Vec::new(),
            engineering_properties: Vec::new(),
        }
    }

    /// Shorthand for `Tile::new(GridCoordinates::new(x, y), kind)`.
    pub fn at(x: i32, y: i32, kind: TileKind) -> Self {
        Self::new(GridCoordinates::new(x, y), kind)
    }

    pub fn position(&self) -> GridCoordinates {
        self.position
    }

    pub fn kind(&self) -> TileKind {
        self.kind
    }

    /// Return `true` if something stands on the tile.
    pub fn occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<&Rc<dyn GameObject>> {
        self.occupant.as_ref()
    }

    /// Place `object` on the tile, or clear it with `None`.
    pub fn set_occupant(&mut self, object: Option<Rc<dyn GameObject>>) {
        self.occupant = object;
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// Remove every occurrence of `property`.
    pub fn remove_property(&mut self, property: &Property) {
        self.properties.retain(|p| !p.ptr_eq(property));
    }

    /// A copy of the tile's properties.
    pub fn properties(&self) -> Vec<Property> {
        self.properties.clone()
    }

    pub fn add_engineering_property(&mut self, property: Property) {
        self.engineering_properties.push(property);
    }

    /// Remove every occurrence of `property` from the engineering list.
    pub fn remove_engineering_property(&mut self, property: &Property) {
        self.engineering_properties.retain(|p| !p.ptr_eq(property));
    }

    /// A copy of the tile's engineering properties.
    pub fn engineering_properties(&self) -> Vec<Property> {
        self.engineering_properties.clone()
    }
}
