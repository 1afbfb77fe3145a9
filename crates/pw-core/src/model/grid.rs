use crate::context::Context;
use crate::error::{EngineError, EngineResult};
use crate::model::{GridCoordinates, Tile};

/// A square grid of optional tiles, with its own context.
#[derive(Debug)]
pub struct Grid {
    size: usize,
    name: String,
    tiles: Vec<Option<Tile>>,
    context: Context,
}

impl Grid {
    /// An empty grid with a fresh context named after it.
    pub fn new(size: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        let context = Context::new(name.clone());
        Self::with_context(size, name, context)
    }

    /// An empty grid bound to an existing context.
    pub fn with_context(size: usize, name: impl Into<String>, context: Context) -> Self {
        Self {
            size,
            name: name.into(),
            tiles: vec![None; size * size],
            context,
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The tile at `(x, y)`, if one has been placed.
    pub fn tile_at(&self, x: i32, y: i32) -> EngineResult<Option<&Tile>> {
        let index = self.index(x, y)?;
        Ok(self.tiles[index].as_ref())
    }

    /// The tile at `position`, if one has been placed.
    pub fn tile_at_position(&self, position: GridCoordinates) -> EngineResult<Option<&Tile>> {
        self.tile_at(position.x, position.y)
    }

    /// Mutable access to the tile at `(x, y)`.
    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> EngineResult<Option<&mut Tile>> {
        let index = self.index(x, y)?;
        Ok(self.tiles[index].as_mut())
    }

    /// Place `tile` at `(x, y)`, returning whatever was there.
    pub fn set_tile_at(&mut self, x: i32, y: i32, tile: Tile) -> EngineResult<Option<Tile>> {
        let index = self.index(x, y)?;
        Ok(self.tiles[index].replace(tile))
    }

    fn index(&self, x: i32, y: i32) -> EngineResult<usize> {
        let out_of_bounds = || EngineError::OutOfBounds {
            x,
            y,
            size: self.size,
        };
        let col = usize::try_from(x).map_err(|_| out_of_bounds())?;
        let row = usize::try_from(y).map_err(|_| out_of_bounds())?;
        if col >= self.size || row >= self.size {
            return Err(out_of_bounds());
        }
        Ok(col * self.size + row)
    }
}
