use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace, warn};

use super::{
    action::Direction,
    config::SimulationConfig,
    death::{DeathSequencer, SequenceStatus},
    error::{ConfigError, RoundError},
    events::{CollisionCause, SimEvent},
    food::{FoodProvider, FoodState},
    grid::{CellCoord, GridSpec},
    interpolation::{self, SegmentPose},
    score::ScoreSink,
    state::{SegmentIds, SegmentRole, Snake},
};

/// Where the simulation is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, waiting for a round to start
    Idle,
    Running,
    /// Collided; the body is being taken apart
    Dying(CollisionCause),
    /// The death sequence finished
    Over(CollisionCause),
}

impl Phase {
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Running)
    }

    pub fn cause(&self) -> Option<CollisionCause> {
        match self {
            Phase::Dying(cause) | Phase::Over(cause) => Some(*cause),
            _ => None,
        }
    }
}

/// Parameters of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSetup {
    pub start_length: usize,
    pub start_cell: CellCoord,
    pub initial_direction: Direction,
    pub wrap_around: bool,
}

impl From<&SimulationConfig> for RoundSetup {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            start_length: config.start_length,
            start_cell: config.start_cell,
            initial_direction: config.initial_direction,
            wrap_around: config.wrap_around,
        }
    }
}

/// Information about a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Set when this step ended the round
    pub collision: Option<CollisionCause>,
}

/// Result of advancing the clock by one frame
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Progress through the current step, in [0, 1]
    pub fraction: f32,
    /// Discrete steps performed during this tick
    pub steps: u32,
    pub events: Vec<SimEvent>,
}

/// The fixed-step snake simulation. Owns the snake, the food state and the
/// clock; collaborators for food placement and scoring are injected.
pub struct Simulation<F: FoodProvider, S: ScoreSink> {
    config: SimulationConfig,
    grid: GridSpec,
    food_provider: F,
    score: S,
    rng: StdRng,
    ids: SegmentIds,
    phase: Phase,
    snake: Option<Snake>,
    food: FoodState,
    wrap_around: bool,
    accumulator: f32,
    interval: f32,
    steps_taken: u64,
    head_visible: bool,
    death: Option<DeathSequencer>,
    events: Vec<SimEvent>,
}

impl<F: FoodProvider, S: ScoreSink> Simulation<F, S> {
    /// Validate `config` and build an idle simulation
    pub fn new(config: SimulationConfig, food_provider: F, score: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid_spec()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let interval = config.base_step_delay;
        let wrap_around = config.wrap_around;

        Ok(Self {
            config,
            grid,
            food_provider,
            score,
            rng,
            ids: SegmentIds::default(),
            phase: Phase::Idle,
            snake: None,
            food: FoodState::Exhausted,
            wrap_around,
            accumulator: 0.0,
            interval,
            steps_taken: 0,
            head_visible: false,
            death: None,
            events: Vec::new(),
        })
    }

    /// Build a fresh snake and food and start running. Refused while a round
    /// (or its death sequence) is still in progress.
    pub fn start_round(&mut self, setup: RoundSetup) -> Result<Vec<SimEvent>, RoundError> {
        if matches!(self.phase, Phase::Running | Phase::Dying(_)) {
            return Err(RoundError::InProgress);
        }
        if setup.start_length == 0 {
            return Err(RoundError::ZeroLength);
        }
        if !self.grid.in_bounds(setup.start_cell) {
            return Err(RoundError::StartOutOfBounds(setup.start_cell));
        }

        self.events.clear();
        self.ids = SegmentIds::default();
        let snake = Snake::new(
            setup.start_cell,
            setup.initial_direction,
            setup.start_length,
            setup.wrap_around,
            &self.grid,
            &mut self.ids,
        );

        self.events.push(SimEvent::RoundStarted {
            wrap_around: setup.wrap_around,
        });
        for seg in std::iter::once(snake.head()).chain(snake.body()) {
            self.events.push(SimEvent::SegmentSpawned {
                id: seg.id,
                position: seg.to,
                role: seg.role,
            });
        }

        info!(
            length = snake.len(),
            x = setup.start_cell.x,
            y = setup.start_cell.y,
            wrap = setup.wrap_around,
            "round started"
        );

        self.interval = self.config.step_interval(snake.segment_count());
        self.snake = Some(snake);
        self.wrap_around = setup.wrap_around;
        self.accumulator = 0.0;
        self.steps_taken = 0;
        self.head_visible = true;
        self.death = None;
        self.phase = Phase::Running;
        self.food = FoodState::Exhausted;
        self.respawn_food(true);

        Ok(std::mem::take(&mut self.events))
    }

    /// Buffer a direction for the next step. Reversals and proposals outside
    /// a running round are ignored.
    pub fn propose_direction(&mut self, direction: Direction) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        self.snake
            .as_mut()
            .is_some_and(|snake| snake.propose_direction(direction))
    }

    /// Advance the clock by `dt` seconds. While running this performs every
    /// step that came due (up to `max_steps_per_tick`); while dying it drives
    /// the death sequence.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let mut steps = 0;

        match self.phase {
            Phase::Idle | Phase::Over(_) => {}
            Phase::Dying(_) => self.poll_death(dt),
            Phase::Running => {
                self.accumulator += dt;
                while self.phase.is_running()
                    && self.accumulator >= self.interval
                    && steps < self.config.max_steps_per_tick
                {
                    self.accumulator -= self.interval;
                    self.step();
                    steps += 1;
                }

                if self.phase.is_running() && self.accumulator >= self.interval {
                    let dropped = self.accumulator - self.accumulator % self.interval;
                    warn!(
                        dropped_seconds = dropped,
                        steps,
                        "step catch-up capped; dropping time debt"
                    );
                    self.accumulator %= self.interval;
                }
            }
        }

        TickReport {
            fraction: self.fraction(),
            steps,
            events: std::mem::take(&mut self.events),
        }
    }

    /// Perform exactly one discrete step regardless of the clock. Returns
    /// `None` outside a running round.
    pub fn step(&mut self) -> Option<StepInfo> {
        if !self.phase.is_running() {
            return None;
        }
        let snake = self.snake.as_mut()?;

        let direction = snake.commit_direction();
        let prev_head = snake.head_cell();
        let mut next = prev_head.offset(direction);

        if self.wrap_around {
            next = self.grid.wrap(next);
        } else if !self.grid.in_bounds(next) {
            return Some(self.collide(CollisionCause::HitWall));
        }

        let ate = self.food.location() == Some(next);

        // Unless the snake grows, the tail leaves its cell this very step, so
        // the head may move into it.
        let vacating = if ate {
            None
        } else {
            snake.tail().map(|t| t.cell)
        };
        let hits_body = snake
            .body()
            .iter()
            .any(|seg| seg.cell == next && Some(seg.cell) != vacating);
        // On a one-cell-wide torus the head can land back on itself
        let hits_head = next == prev_head && snake.segment_count() > 0;
        if hits_body || hits_head {
            return Some(self.collide(CollisionCause::HitSelf));
        }

        let growth = snake.advance(next, ate, &self.grid, &mut self.ids);
        let segment_count = snake.segment_count();
        self.steps_taken += 1;

        if let Some(growth) = growth {
            if let Some(old_tail) = growth.old_tail {
                self.events.push(SimEvent::SegmentReclassified {
                    id: old_tail,
                    role: SegmentRole::Mid,
                });
            }
            self.events.push(SimEvent::SegmentSpawned {
                id: growth.tail,
                position: growth.position,
                role: SegmentRole::Tail,
            });
            self.score.increment();
            self.events.push(SimEvent::FoodEaten { cell: next });
            debug!(x = next.x, y = next.y, length = segment_count + 1, "food eaten");
        }

        if ate || !self.food.has_food() {
            self.respawn_food(ate);
        }

        self.interval = self.config.step_interval(segment_count);
        trace!(
            step = self.steps_taken,
            x = next.x,
            y = next.y,
            ?direction,
            "step"
        );

        Some(StepInfo {
            ate_food: ate,
            collision: None,
        })
    }

    /// Ask the provider for a new food cell. An exhausted board is reported
    /// only when it is news, since the provider is asked again every step.
    fn respawn_food(&mut self, announce_exhaustion: bool) {
        let Some(snake) = self.snake.as_ref() else {
            return;
        };
        let was_available = self.food.has_food();
        self.food = self
            .food_provider
            .respawn(&self.grid, &snake.occupied_cells());

        match self.food {
            FoodState::Available(cell) => {
                self.events.push(SimEvent::FoodPlaced {
                    cell,
                    position: self.grid.to_world(cell),
                });
                debug!(x = cell.x, y = cell.y, "food placed");
            }
            FoodState::Exhausted if announce_exhaustion || was_available => {
                self.events.push(SimEvent::FoodExhausted);
                info!("no free cell left for food");
            }
            FoodState::Exhausted => {}
        }
    }

    fn collide(&mut self, cause: CollisionCause) -> StepInfo {
        self.phase = Phase::Dying(cause);
        self.events.push(SimEvent::Collision(cause));
        info!(?cause, steps = self.steps_taken, "snake died");

        if let Some(snake) = self.snake.as_mut() {
            snake.settle();
            let body = snake.body().iter().map(|s| s.id).collect();
            self.death = Some(DeathSequencer::new(
                body,
                snake.head().id,
                &self.config.death,
                &mut self.rng,
            ));
        }
        self.poll_death(0.0);

        StepInfo {
            ate_food: false,
            collision: Some(cause),
        }
    }

    fn poll_death(&mut self, dt: f32) {
        let (Some(seq), Some(snake)) = (self.death.as_mut(), self.snake.as_mut()) else {
            return;
        };
        let status = seq.poll(dt, snake, &mut self.events);
        self.head_visible = !seq.head_hidden();

        if status == SequenceStatus::Done {
            if let Phase::Dying(cause) = self.phase {
                self.phase = Phase::Over(cause);
                self.events.push(SimEvent::SimulationOver);
                info!(?cause, "simulation over");
            }
        }
    }

    /// Progress through the current step; 1 once the snake has stopped
    pub fn fraction(&self) -> f32 {
        match self.phase {
            Phase::Running => (self.accumulator / self.interval).clamp(0.0, 1.0),
            Phase::Idle => 0.0,
            Phase::Dying(_) | Phase::Over(_) => 1.0,
        }
    }

    /// Interpolated head and body poses at `fraction` of the current step
    pub fn poses(&self, fraction: f32) -> Vec<SegmentPose> {
        let Some(snake) = self.snake.as_ref() else {
            return Vec::new();
        };
        let mut poses = interpolation::poses(snake, &self.grid, self.wrap_around, fraction);
        if !self.head_visible {
            poses.retain(|p| p.role != SegmentRole::Head);
        }
        poses
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn snake(&self) -> Option<&Snake> {
        self.snake.as_ref()
    }

    pub fn food(&self) -> FoodState {
        self.food
    }

    pub fn score(&self) -> &S {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut S {
        &mut self.score
    }

    pub fn wrap_around(&self) -> bool {
        self.wrap_around
    }

    /// Seconds per step at the snake's current length
    pub fn current_interval(&self) -> f32 {
        self.interval
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn is_head_visible(&self) -> bool {
        self.head_visible
    }

    pub fn death_sequence(&self) -> Option<&DeathSequencer> {
        self.death.as_ref()
    }

    /// `{head} ∪ body`, empty before the first round
    pub fn occupied_cells(&self) -> HashSet<CellCoord> {
        self.snake
            .as_ref()
            .map(Snake::occupied_cells)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::EffectKind;
    use crate::game::food::RandomFoodProvider;
    use crate::game::grid::WorldPos;
    use crate::game::score::ScoreCounter;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    /// Hands out food cells from a script, exhausted once it runs dry
    struct ScriptedFood(VecDeque<CellCoord>);

    impl ScriptedFood {
        fn new(cells: &[(i32, i32)]) -> Self {
            Self(cells.iter().map(|&(x, y)| CellCoord::new(x, y)).collect())
        }
    }

    impl FoodProvider for ScriptedFood {
        fn respawn(&mut self, _: &GridSpec, _: &HashSet<CellCoord>) -> FoodState {
            match self.0.pop_front() {
                Some(cell) => FoodState::Available(cell),
                None => FoodState::Exhausted,
            }
        }
    }

    type TestSim = Simulation<ScriptedFood, ScoreCounter>;

    fn config(width: usize, height: usize) -> SimulationConfig {
        SimulationConfig {
            base_step_delay: 0.1,
            min_step_delay: 0.05,
            speed_decay: 1.0,
            seed: Some(11),
            start_cell: CellCoord::new(0, 0),
            ..SimulationConfig::new(width, height)
        }
    }

    fn round(head: (i32, i32), dir: Direction, len: usize, wrap: bool) -> RoundSetup {
        RoundSetup {
            start_length: len,
            start_cell: CellCoord::new(head.0, head.1),
            initial_direction: dir,
            wrap_around: wrap,
        }
    }

    fn started(config: SimulationConfig, food: &[(i32, i32)], setup: RoundSetup) -> TestSim {
        let mut sim = Simulation::new(config, ScriptedFood::new(food), ScoreCounter::new()).unwrap();
        sim.start_round(setup).unwrap();
        sim
    }

    /// Swap in an arbitrary snake layout, head first
    fn place(sim: &mut TestSim, cells: &[(i32, i32)], dir: Direction) {
        let cells: Vec<_> = cells.iter().map(|&(x, y)| CellCoord::new(x, y)).collect();
        sim.snake = Snake::from_cells(&cells, dir, &sim.grid, &mut sim.ids);
        sim.interval = sim.config.step_interval(cells.len() - 1);
    }

    fn c(x: i32, y: i32) -> CellCoord {
        CellCoord::new(x, y)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let bad = SimulationConfig {
            base_step_delay: -1.0,
            ..Default::default()
        };
        assert!(Simulation::new(bad, ScriptedFood::new(&[]), ScoreCounter::new()).is_err());
    }

    #[test]
    fn test_idle_is_inert() {
        let mut sim =
            Simulation::new(config(10, 10), ScriptedFood::new(&[]), ScoreCounter::new()).unwrap();
        assert_eq!(sim.phase(), Phase::Idle);
        assert!(!sim.propose_direction(Direction::Up));
        let report = sim.tick(5.0);
        assert_eq!(report.steps, 0);
        assert!(report.events.is_empty());
        assert!(sim.poses(0.5).is_empty());
        assert!(sim.step().is_none());
    }

    #[test]
    fn test_start_round_events() {
        let mut sim =
            Simulation::new(config(10, 10), ScriptedFood::new(&[(7, 7)]), ScoreCounter::new())
                .unwrap();
        let events = sim.start_round(round((3, 3), Direction::Right, 3, false)).unwrap();

        assert_eq!(events[0], SimEvent::RoundStarted { wrap_around: false });
        let spawned: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::SegmentSpawned { role, .. } => Some(*role),
                _ => None,
            })
            .collect();
        assert_eq!(
            spawned,
            vec![SegmentRole::Head, SegmentRole::Mid, SegmentRole::Tail]
        );
        assert!(events.contains(&SimEvent::FoodPlaced {
            cell: c(7, 7),
            position: WorldPos::new(7.5, 7.5),
        }));

        let snake = sim.snake().unwrap();
        assert_eq!(snake.body_cells(), vec![c(2, 3), c(1, 3)]);
        assert_eq!(sim.phase(), Phase::Running);
    }

    #[test]
    fn test_start_round_validation() {
        let mut sim =
            Simulation::new(config(10, 10), ScriptedFood::new(&[]), ScoreCounter::new()).unwrap();
        assert_eq!(
            sim.start_round(round((3, 3), Direction::Right, 0, false)),
            Err(RoundError::ZeroLength)
        );
        assert_eq!(
            sim.start_round(round((10, 3), Direction::Right, 3, false)),
            Err(RoundError::StartOutOfBounds(c(10, 3)))
        );
        sim.start_round(round((3, 3), Direction::Right, 3, false))
            .unwrap();
        assert_eq!(
            sim.start_round(round((3, 3), Direction::Right, 3, false)),
            Err(RoundError::InProgress)
        );
    }

    #[test]
    fn test_basic_movement() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((3, 3), Direction::Right, 3, false));
        let info = sim.step().unwrap();

        assert!(!info.ate_food);
        assert_eq!(info.collision, None);
        let snake = sim.snake().unwrap();
        assert_eq!(snake.head_cell(), c(4, 3));
        assert_eq!(snake.body_cells(), vec![c(3, 3), c(2, 3)]);
        assert_eq!(sim.steps_taken(), 1);
    }

    #[test]
    fn test_buffered_direction_applies_at_next_step() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((3, 3), Direction::Right, 3, false));

        assert!(sim.propose_direction(Direction::Up));
        assert!(sim.propose_direction(Direction::Down));
        assert_eq!(sim.snake().unwrap().direction(), Direction::Right);

        sim.step();
        assert_eq!(sim.snake().unwrap().head_cell(), c(3, 4));
        assert_eq!(sim.snake().unwrap().direction(), Direction::Down);
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((3, 3), Direction::Right, 3, false));

        assert!(!sim.propose_direction(Direction::Left));
        assert_eq!(sim.snake().unwrap().pending_direction(), Direction::Right);

        sim.step();
        assert_eq!(sim.snake().unwrap().direction(), Direction::Right);
    }

    #[test]
    fn test_food_consumption() {
        let mut sim = started(
            config(10, 10),
            &[(4, 3), (8, 8)],
            round((3, 3), Direction::Right, 3, false),
        );
        let old_tail = sim.snake().unwrap().tail().unwrap().id;

        let info = sim.step().unwrap();
        let report = sim.tick(0.0);

        assert!(info.ate_food);
        assert_eq!(sim.score().value(), 1);
        let snake = sim.snake().unwrap();
        assert_eq!(snake.len(), 4);
        assert_eq!(snake.body_cells(), vec![c(3, 3), c(2, 3), c(1, 3)]);
        assert_eq!(sim.food(), FoodState::Available(c(8, 8)));

        let events = report.events;
        assert!(events.contains(&SimEvent::SegmentReclassified {
            id: old_tail,
            role: SegmentRole::Mid,
        }));
        assert!(events.contains(&SimEvent::SegmentSpawned {
            id: snake.tail().unwrap().id,
            position: WorldPos::new(1.5, 3.5),
            role: SegmentRole::Tail,
        }));
        assert!(events.contains(&SimEvent::FoodEaten { cell: c(4, 3) }));
    }

    #[test]
    fn test_wall_collision() {
        let mut sim = started(config(10, 10), &[(5, 5)], round((0, 5), Direction::Left, 3, false));
        let before = sim.snake().unwrap().clone();

        let info = sim.step().unwrap();

        assert_eq!(info.collision, Some(CollisionCause::HitWall));
        assert_eq!(sim.phase().cause(), Some(CollisionCause::HitWall));
        // The first body segment is drained at once, the head did not move
        assert_eq!(sim.snake().unwrap().head_cell(), before.head_cell());
        assert_eq!(sim.snake().unwrap().segment_count(), before.segment_count() - 1);
    }

    #[test]
    fn test_self_collision() {
        // Length 5 so the snake can bite its own side
        let mut sim = started(config(10, 10), &[(9, 9)], round((5, 5), Direction::Right, 5, false));

        sim.step(); // head (6,5)
        sim.propose_direction(Direction::Down);
        sim.step(); // head (6,6)
        sim.propose_direction(Direction::Left);
        sim.step(); // head (5,6)
        sim.propose_direction(Direction::Up);
        let info = sim.step().unwrap(); // (5,5) is still body

        assert_eq!(info.collision, Some(CollisionCause::HitSelf));
        assert!(matches!(sim.phase(), Phase::Dying(CollisionCause::HitSelf)));
    }

    #[test]
    fn test_tail_vacate_exception() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((5, 5), Direction::Right, 1, false));
        place(&mut sim, &[(0, 0), (1, 0)], Direction::Right);

        let info = sim.step().unwrap();

        assert_eq!(info.collision, None);
        let snake = sim.snake().unwrap();
        assert_eq!(snake.head_cell(), c(1, 0));
        assert_eq!(snake.body_cells(), vec![c(0, 0)]);
    }

    #[test]
    fn test_eating_into_tail_is_fatal() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((5, 5), Direction::Right, 1, false));
        // Head at (0,1) moving up into a 2x2 loop whose tail sits on food
        place(&mut sim, &[(0, 1), (1, 1), (1, 0), (0, 0)], Direction::Up);
        sim.food = FoodState::Available(c(0, 0));

        let info = sim.step().unwrap();
        assert_eq!(info.collision, Some(CollisionCause::HitSelf));
    }

    #[test]
    fn test_chasing_tail_in_a_loop() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((5, 5), Direction::Right, 1, false));
        place(&mut sim, &[(0, 1), (1, 1), (1, 0), (0, 0)], Direction::Left);

        for dir in [Direction::Up, Direction::Right, Direction::Down, Direction::Left] {
            sim.propose_direction(dir);
            let info = sim.step().unwrap();
            assert_eq!(info.collision, None);
            assert_eq!(sim.occupied_cells().len(), 4);
        }
        assert_eq!(sim.snake().unwrap().head_cell(), c(0, 1));
    }

    #[test]
    fn test_wrap_right_edge() {
        let mut sim = started(config(10, 10), &[(3, 3)], round((9, 5), Direction::Right, 3, true));

        let info = sim.step().unwrap();
        assert_eq!(info.collision, None);
        assert_eq!(sim.snake().unwrap().head_cell(), c(0, 5));

        // Halfway through the step the head sits on the seam, not mid-board
        let head = sim.poses(0.5)[0];
        assert_eq!(head.role, SegmentRole::Head);
        assert!((head.position.x - 0.0).abs() < 1e-4);
        assert!((head.position.y - 5.5).abs() < 1e-4);
    }

    #[test]
    fn test_one_wide_torus_head_cannot_land_on_itself() {
        let mut sim = started(config(1, 6), &[], round((0, 2), Direction::Down, 2, true));
        let info = sim.step().unwrap();
        assert_eq!(info.collision, None);

        sim.propose_direction(Direction::Left);
        let info = sim.step().unwrap();
        assert_eq!(info.collision, Some(CollisionCause::HitSelf));
    }

    #[test]
    fn test_tick_runs_catch_up_steps() {
        let mut sim = started(config(20, 20), &[(19, 19)], round((3, 3), Direction::Right, 3, false));

        let report = sim.tick(0.05);
        assert_eq!(report.steps, 0);
        assert!((report.fraction - 0.5).abs() < 1e-4);

        let report = sim.tick(0.2);
        assert_eq!(report.steps, 2);
        assert!((report.fraction - 0.5).abs() < 1e-3);
        assert_eq!(sim.snake().unwrap().head_cell(), c(5, 3));
    }

    #[test]
    fn test_catch_up_is_capped() {
        let config = SimulationConfig {
            max_steps_per_tick: 3,
            ..config(50, 50)
        };
        let mut sim = started(config, &[(49, 49)], round((3, 3), Direction::Right, 3, false));

        let report = sim.tick(2.0);
        assert_eq!(report.steps, 3);
        assert!(report.fraction < 1.0);
        assert_eq!(sim.snake().unwrap().head_cell(), c(6, 3));
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((3, 3), Direction::Right, 3, false));
        assert_eq!(sim.tick(f32::NAN).steps, 0);
        assert_eq!(sim.tick(-4.0).steps, 0);
        assert_eq!(sim.fraction(), 0.0);
    }

    #[test]
    fn test_speed_up_on_growth() {
        let config = SimulationConfig {
            base_step_delay: 0.2,
            min_step_delay: 0.05,
            speed_decay: 0.5,
            ..config(10, 10)
        };
        let mut sim = started(config, &[(4, 3), (9, 9)], round((3, 3), Direction::Right, 1, false));
        assert!((sim.current_interval() - 0.2).abs() < 1e-6);

        sim.step();
        assert!((sim.current_interval() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_exhausted_food_keeps_running_and_retries() {
        let mut sim = started(config(10, 10), &[], round((3, 3), Direction::Right, 3, false));
        assert_eq!(sim.food(), FoodState::Exhausted);

        sim.food_provider.0.push_back(c(8, 8));
        let info = sim.step().unwrap();
        assert_eq!(info.collision, None);
        assert_eq!(sim.food(), FoodState::Available(c(8, 8)));
    }

    #[test]
    fn test_death_sequence_to_over() {
        let config = SimulationConfig {
            death: crate::game::config::DeathConfig {
                segment_interval: 0.1,
                jitter_fraction: 0.2,
                final_delay: 0.3,
            },
            ..config(10, 10)
        };
        let mut sim = started(config, &[(9, 9)], round((1, 5), Direction::Left, 2, false));
        sim.step(); // head (0,5)
        let report = sim.tick(0.1); // into the wall
        assert!(report.events.contains(&SimEvent::Collision(CollisionCause::HitWall)));

        assert!(!sim.propose_direction(Direction::Up));
        let mut events = report.events;
        let mut guard = 0;
        while !matches!(sim.phase(), Phase::Over(_)) {
            events.extend(sim.tick(0.02).events);
            guard += 1;
            assert!(guard < 1000);
        }

        assert_eq!(events.last(), Some(&SimEvent::SimulationOver));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, SimEvent::Collision(_)))
                .count(),
            1
        );
        assert!(events.contains(&SimEvent::Effect {
            kind: EffectKind::Large,
            position: WorldPos::new(0.5, 5.5),
        }));
        assert!(!sim.is_head_visible());
        assert!(sim.poses(1.0).is_empty());

        // A finished round can be followed by a new one
        sim.food_provider.0.push_back(c(2, 2));
        assert!(sim
            .start_round(round((5, 5), Direction::Up, 3, true))
            .is_ok());
        assert!(sim.is_head_visible());
    }

    #[test]
    fn test_dying_ignores_steps() {
        let mut sim = started(config(10, 10), &[(9, 9)], round((0, 0), Direction::Up, 3, false));
        sim.step();
        assert!(matches!(sim.phase(), Phase::Dying(_)));
        assert!(sim.step().is_none());
        let cells = sim.occupied_cells();
        sim.tick(0.0);
        assert!(sim.occupied_cells().len() <= cells.len());
    }

    #[test]
    fn test_same_seed_same_death_order() {
        let run = || {
            let mut sim =
                started(config(10, 10), &[(9, 9)], round((5, 0), Direction::Up, 5, false));
            sim.step();
            sim.death_sequence().unwrap().order().to_vec()
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn random_walks_keep_the_body_consistent(
            moves in proptest::collection::vec(0usize..4, 1..120),
            wrap in any::<bool>(),
            seed in any::<u64>(),
        ) {
            let config = SimulationConfig { seed: Some(seed), ..config(7, 6) };
            let mut sim = Simulation::new(
                config,
                RandomFoodProvider::seeded(seed),
                ScoreCounter::new(),
            )
            .unwrap();
            sim.start_round(round((3, 3), Direction::Right, 3, wrap)).unwrap();

            for m in moves {
                sim.propose_direction(Direction::ALL[m]);
                let before = sim.snake().unwrap().len();
                let Some(info) = sim.step() else { break };
                if info.collision.is_some() {
                    break;
                }

                let snake = sim.snake().unwrap();
                let expected = if info.ate_food { before + 1 } else { before };
                prop_assert_eq!(snake.len(), expected);
                prop_assert_eq!(sim.occupied_cells().len(), snake.len());
                prop_assert!(!snake.body_cells().contains(&snake.head_cell()));
                prop_assert!(sim.grid().in_bounds(snake.head_cell()));
                if let Some(food) = sim.food().location() {
                    prop_assert!(!sim.occupied_cells().contains(&food));
                }
                let tails = snake
                    .body()
                    .iter()
                    .filter(|s| s.role == SegmentRole::Tail)
                    .count();
                prop_assert_eq!(tails, usize::from(snake.segment_count() > 0));
            }
        }
    }
}
