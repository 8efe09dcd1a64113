use thiserror::Error;

use super::grid::CellCoord;

/// Construction-time contract violations in a simulation configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1 cells, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
    #[error("{name} must be a positive finite number of seconds, got {value}")]
    InvalidStepDelay { name: &'static str, value: f32 },
    #[error("minimum step delay {min} exceeds base step delay {base}")]
    MinDelayAboveBase { min: f32, base: f32 },
    #[error("speed decay must lie in (0, 1], got {0}")]
    InvalidDecay(f32),
    #[error("death jitter fraction must lie in [0, 1), got {0}")]
    InvalidJitter(f32),
    #[error("{name} must be a non-negative finite number of seconds, got {value}")]
    InvalidDeathDelay { name: &'static str, value: f32 },
    #[error("max_steps_per_tick must be at least 1")]
    ZeroCatchUp,
    #[error("start length must be at least 1")]
    ZeroStartLength,
    #[error("start cell ({}, {}) lies outside the {width}x{height} grid", .cell.x, .cell.y)]
    StartOutsideGrid {
        cell: CellCoord,
        width: usize,
        height: usize,
    },
}

/// Reasons a round cannot be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("start length must be at least 1")]
    ZeroLength,
    #[error("start cell ({}, {}) lies outside the grid", .0.x, .0.y)]
    StartOutOfBounds(CellCoord),
    #[error("a round is still in progress")]
    InProgress,
}
