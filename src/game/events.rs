use super::grid::{CellCoord, WorldPos};
use super::state::{SegmentId, SegmentRole};

/// Why the snake died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionCause {
    HitWall,
    HitSelf,
}

/// Size of a one-shot effect the presentation layer should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Small,
    Large,
}

/// Requests and notifications for whoever presents the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    RoundStarted { wrap_around: bool },
    SegmentSpawned {
        id: SegmentId,
        position: WorldPos,
        role: SegmentRole,
    },
    SegmentRemoved { id: SegmentId },
    SegmentReclassified { id: SegmentId, role: SegmentRole },
    FoodPlaced { cell: CellCoord, position: WorldPos },
    /// No free cell is left for food
    FoodExhausted,
    FoodEaten { cell: CellCoord },
    /// Emitted once per round
    Collision(CollisionCause),
    Effect { kind: EffectKind, position: WorldPos },
    HeadHidden { id: SegmentId },
    SimulationOver,
}
