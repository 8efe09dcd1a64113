//! Core simulation for grid snake
//!
//! This module contains the whole simulation without any I/O or rendering
//! dependencies: grid topology, food placement, the fixed-step snake state
//! machine, interpolation between steps and the death sequence.

pub mod action;
pub mod config;
pub mod death;
pub mod engine;
pub mod error;
pub mod events;
pub mod food;
pub mod grid;
pub mod interpolation;
pub mod score;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{DeathConfig, GridConfig, SimulationConfig};
pub use death::{DeathSequencer, SequenceStatus};
pub use engine::{Phase, RoundSetup, Simulation, StepInfo, TickReport};
pub use error::{ConfigError, RoundError};
pub use events::{CollisionCause, EffectKind, SimEvent};
pub use food::{FoodProvider, FoodState, RandomFoodProvider};
pub use grid::{CellCoord, GridSpec, WorldPos};
pub use interpolation::SegmentPose;
pub use score::{ScoreCounter, ScoreSink};
pub use state::{Segment, SegmentId, SegmentRole, Snake};
