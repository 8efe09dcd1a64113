//! Grid topology: integer cells, continuous world positions and the mapping
//! between them.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::error::ConfigError;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`, not wrapped
    pub fn offset(&self, direction: Direction) -> Self {
        *self + direction.delta()
    }
}

impl Add for CellCoord {
    type Output = CellCoord;

    fn add(self, rhs: CellCoord) -> CellCoord {
        CellCoord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// A continuous position in world units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ZERO: WorldPos = WorldPos { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector
    pub fn normalized(&self) -> Option<WorldPos> {
        let len = self.length();
        if len <= f32::EPSILON {
            None
        } else {
            Some(WorldPos::new(self.x / len, self.y / len))
        }
    }
}

impl Add for WorldPos {
    type Output = WorldPos;

    fn add(self, rhs: WorldPos) -> WorldPos {
        WorldPos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for WorldPos {
    type Output = WorldPos;

    fn sub(self, rhs: WorldPos) -> WorldPos {
        WorldPos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for WorldPos {
    type Output = WorldPos;

    fn mul(self, rhs: f32) -> WorldPos {
        WorldPos::new(self.x * rhs, self.y * rhs)
    }
}

/// Immutable description of the board: where cell (0,0) sits in world space,
/// how many cells it has and how large each cell is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    origin: WorldPos,
    width: usize,
    height: usize,
    cell_size: f32,
}

impl GridSpec {
    pub fn new(
        origin: WorldPos,
        width: usize,
        height: usize,
        cell_size: f32,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            origin,
            width,
            height,
            cell_size,
        })
    }

    pub fn origin(&self) -> WorldPos {
        self.origin
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Extent of the whole board in world units
    pub fn span(&self) -> WorldPos {
        WorldPos::new(
            self.width as f32 * self.cell_size,
            self.height as f32 * self.cell_size,
        )
    }

    /// World-space corner opposite the origin
    pub fn max(&self) -> WorldPos {
        self.origin + self.span()
    }

    /// Center of `cell` in world space
    pub fn to_world(&self, cell: CellCoord) -> WorldPos {
        WorldPos::new(
            self.origin.x + (cell.x as f32 + 0.5) * self.cell_size,
            self.origin.y + (cell.y as f32 + 0.5) * self.cell_size,
        )
    }

    /// Cell containing `world`, by floor division
    pub fn to_cell(&self, world: WorldPos) -> CellCoord {
        CellCoord::new(
            ((world.x - self.origin.x) / self.cell_size).floor() as i32,
            ((world.y - self.origin.y) / self.cell_size).floor() as i32,
        )
    }

    pub fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0
            && (cell.x as i64) < self.width as i64
            && cell.y >= 0
            && (cell.y as i64) < self.height as i64
    }

    /// Fold any cell onto the torus; the result is always non-negative
    pub fn wrap(&self, cell: CellCoord) -> CellCoord {
        CellCoord::new(
            cell.x.rem_euclid(self.width as i32),
            cell.y.rem_euclid(self.height as i32),
        )
    }

    /// All cells in row-major order (y outer, x inner)
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| CellCoord::new(x, y)))
    }
}
