use serde::{Deserialize, Serialize};

use super::grid::CellCoord;

/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit cell delta for one step in this direction (y grows downward)
    pub fn delta(&self) -> CellCoord {
        match self {
            Direction::Up => CellCoord::new(0, -1),
            Direction::Down => CellCoord::new(0, 1),
            Direction::Left => CellCoord::new(-1, 0),
            Direction::Right => CellCoord::new(1, 0),
        }
    }
}
