use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::{
    Phase, RandomFoodProvider, RoundSetup, ScoreCounter, SimEvent, Simulation, SimulationConfig,
};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{Flash, Renderer, View};

/// Longest frame delta handed to the simulation; a stalled terminal should
/// not turn into a burst of steps
const MAX_FRAME_DELTA: f32 = 0.25;

pub struct HumanMode {
    sim: Simulation<RandomFoodProvider, ScoreCounter>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    flashes: Vec<Flash>,
    /// Wrap mode for the next round
    wrap_next: bool,
    fraction: f32,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        // Food gets its own stream so the death shuffle stays independent of it
        let food = match config.seed {
            Some(seed) => RandomFoodProvider::seeded(seed.wrapping_add(1)),
            None => RandomFoodProvider::from_entropy(),
        };
        let wrap_next = config.wrap_around;
        let sim = Simulation::new(config, food, ScoreCounter::new())
            .context("Invalid simulation config")?;

        Ok(Self {
            sim,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            flashes: Vec::new(),
            wrap_next,
            fraction: 0.0,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Roughly 60 FPS; the simulation keeps its own fixed step
        let mut frame_timer = interval(Duration::from_millis(16));
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                // Advance and draw
                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_frame).as_secs_f32();
                    last_frame = now;

                    self.advance(dt);
                    let view = View {
                        fraction: self.fraction,
                        flashes: &self.flashes,
                        metrics: &self.metrics,
                        wrap_next: self.wrap_next,
                    };
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.sim, &view);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Steer(dir) => {
                    self.sim.propose_direction(dir);
                }
                KeyAction::Start => self.start_game()?,
                KeyAction::ToggleWrap => {
                    self.wrap_next = !self.wrap_next;
                    debug!(wrap_around = self.wrap_next, "toggled wrap for next round");
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }

        Ok(())
    }

    /// Start a round unless one is still playing out
    fn start_game(&mut self) -> Result<()> {
        if matches!(self.sim.phase(), Phase::Running | Phase::Dying(_)) {
            return Ok(());
        }

        self.sim.score_mut().reset();
        self.flashes.clear();
        let setup = RoundSetup {
            wrap_around: self.wrap_next,
            ..RoundSetup::from(self.sim.config())
        };
        let events = self.sim.start_round(setup).context("Failed to start round")?;
        self.metrics.on_game_start();
        self.apply_events(events);
        self.fraction = self.sim.fraction();
        Ok(())
    }

    /// One frame of simulation time
    fn advance(&mut self, dt: f32) {
        let dt = dt.min(MAX_FRAME_DELTA);
        self.flashes.retain_mut(|flash| {
            flash.remaining -= dt;
            flash.remaining > 0.0
        });

        let report = self.sim.tick(dt);
        self.fraction = report.fraction;
        self.apply_events(report.events);
        self.metrics.update();
    }

    fn apply_events(&mut self, events: Vec<SimEvent>) {
        for event in events {
            match event {
                SimEvent::Effect { kind, position } => {
                    self.flashes.push(Flash::new(kind, position));
                }
                SimEvent::Collision(cause) => {
                    self.metrics.on_collision(cause);
                }
                SimEvent::SimulationOver => {
                    let score = self.sim.score().value();
                    self.metrics.on_game_over(score);
                    info!(
                        score,
                        games = self.metrics.games_played,
                        best = self.metrics.high_score,
                        "round finished"
                    );
                }
                _ => {}
            }
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
