use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::action::Direction;
use super::error::ConfigError;
use super::grid::{CellCoord, GridSpec, WorldPos};

/// Board layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// World-space offset of cell (0,0)
    pub origin_x: f32,
    pub origin_y: f32,
    /// Width of the game grid in cells
    pub width: usize,
    /// Height of the game grid in cells
    pub height: usize,
    /// World units per cell
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            width: 20,
            height: 12,
            cell_size: 1.0,
        }
    }
}

/// Timing of the disassembly that follows a collision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeathConfig {
    /// Nominal seconds between two removed segments
    pub segment_interval: f32,
    /// Each delay is drawn uniformly from `interval ± interval * jitter_fraction`
    pub jitter_fraction: f32,
    /// Seconds between the head effect and the end of the simulation
    pub final_delay: f32,
}

impl Default for DeathConfig {
    fn default() -> Self {
        Self {
            segment_interval: 0.06,
            jitter_fraction: 0.35,
            final_delay: 0.8,
        }
    }
}

/// Configuration for the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid: GridConfig,

    /// Initial length of the snake, head included
    pub start_length: usize,
    pub start_cell: CellCoord,
    pub initial_direction: Direction,
    /// Leave one side and enter the opposite one instead of dying on walls
    pub wrap_around: bool,

    /// Seconds per step with an empty body
    pub base_step_delay: f32,
    /// Lower bound of the step delay however long the snake gets
    pub min_step_delay: f32,
    /// Multiplied into the delay once per body segment, in (0, 1]
    pub speed_decay: f32,
    /// Cap on catch-up steps performed by a single tick
    pub max_steps_per_tick: u32,

    pub death: DeathConfig,

    /// Seed for the death-sequence RNG; entropy when absent
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            start_length: 3,
            start_cell: CellCoord::new(3, 3),
            initial_direction: Direction::Right,
            wrap_around: false,
            base_step_delay: 0.12,
            min_step_delay: 0.05,
            speed_decay: 0.98,
            max_steps_per_tick: 8,
            death: DeathConfig::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid: GridConfig {
                width,
                height,
                ..GridConfig::default()
            },
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(30, 30)
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: SimulationConfig =
            serde_json::from_str(&text).context("Failed to parse simulation config")?;
        config.validate().context("Invalid simulation config")?;
        Ok(config)
    }

    pub fn grid_spec(&self) -> Result<GridSpec, ConfigError> {
        GridSpec::new(
            WorldPos::new(self.grid.origin_x, self.grid.origin_y),
            self.grid.width,
            self.grid.height,
            self.grid.cell_size,
        )
    }

    /// Check every construction-time invariant
    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = self.grid_spec()?;
        if self.start_length == 0 {
            return Err(ConfigError::ZeroStartLength);
        }
        if !grid.in_bounds(self.start_cell) {
            return Err(ConfigError::StartOutsideGrid {
                cell: self.start_cell,
                width: grid.width(),
                height: grid.height(),
            });
        }

        for (name, value) in [
            ("base_step_delay", self.base_step_delay),
            ("min_step_delay", self.min_step_delay),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidStepDelay { name, value });
            }
        }
        if self.min_step_delay > self.base_step_delay {
            return Err(ConfigError::MinDelayAboveBase {
                min: self.min_step_delay,
                base: self.base_step_delay,
            });
        }
        if !(self.speed_decay > 0.0 && self.speed_decay <= 1.0) {
            return Err(ConfigError::InvalidDecay(self.speed_decay));
        }
        if self.max_steps_per_tick == 0 {
            return Err(ConfigError::ZeroCatchUp);
        }

        let death = &self.death;
        if !(death.jitter_fraction >= 0.0 && death.jitter_fraction < 1.0) {
            return Err(ConfigError::InvalidJitter(death.jitter_fraction));
        }
        for (name, value) in [
            ("segment_interval", death.segment_interval),
            ("final_delay", death.final_delay),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDeathDelay { name, value });
            }
        }

        Ok(())
    }

    /// Seconds per step for a snake with `segment_count` body segments
    pub fn step_interval(&self, segment_count: usize) -> f32 {
        let exponent = segment_count.min(i32::MAX as usize) as i32;
        (self.base_step_delay * self.speed_decay.powi(exponent)).max(self.min_step_delay)
    }
}
