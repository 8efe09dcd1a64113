use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points, Rectangle},
        Block, BorderType, Borders, Paragraph,
    },
    Frame,
};

use crate::game::{
    CollisionCause, EffectKind, FoodProvider, GridSpec, Phase, ScoreCounter, SegmentRole,
    Simulation, WorldPos,
};
use crate::metrics::GameMetrics;

/// A short-lived effect drawn on the board
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flash {
    pub kind: EffectKind,
    pub position: WorldPos,
    /// Seconds until it disappears
    pub remaining: f32,
}

impl Flash {
    pub fn new(kind: EffectKind, position: WorldPos) -> Self {
        Self {
            kind,
            position,
            remaining: Self::lifetime(kind),
        }
    }

    pub fn lifetime(kind: EffectKind) -> f32 {
        match kind {
            EffectKind::Small => 0.25,
            EffectKind::Large => 0.6,
        }
    }

    /// How far through its life it is, 0 fresh and 1 gone
    pub fn age(&self) -> f32 {
        1.0 - (self.remaining / Self::lifetime(self.kind)).clamp(0.0, 1.0)
    }
}

/// Everything the renderer needs besides the simulation itself
pub struct View<'a> {
    pub fraction: f32,
    pub flashes: &'a [Flash],
    pub metrics: &'a GameMetrics,
    /// Mode the next round will use
    pub wrap_next: bool,
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render<F: FoodProvider>(
        &self,
        frame: &mut Frame,
        sim: &Simulation<F, ScoreCounter>,
        view: &View<'_>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(sim, view);
        frame.render_widget(stats, chunks[0]);

        // Center the board horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match sim.phase() {
            Phase::Idle => frame.render_widget(self.render_idle(view), game_area),
            Phase::Running | Phase::Dying(_) => self.render_board(frame, game_area, sim, view),
            Phase::Over(cause) => {
                frame.render_widget(self.render_game_over(sim, cause), game_area)
            }
        }

        let controls = self.render_controls();
        frame.render_widget(controls, chunks[2]);
    }

    fn render_board<F: FoodProvider>(
        &self,
        frame: &mut Frame,
        area: Rect,
        sim: &Simulation<F, ScoreCounter>,
        view: &View<'_>,
    ) {
        let grid = *sim.grid();
        let min = grid.origin();
        let max = grid.max();
        let cell = grid.cell_size() as f64;
        let poses = sim.poses(view.fraction);
        let food = sim.food().location().map(|c| grid.to_world(c));
        let flashes = view.flashes;

        let border = if sim.wrap_around() {
            BorderType::Rounded
        } else {
            BorderType::Double
        };
        let title = if sim.wrap_around() {
            " Snake (wrap) "
        } else {
            " Snake "
        };

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(border)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .marker(Marker::Block)
            .x_bounds([min.x as f64, max.x as f64])
            .y_bounds([min.y as f64, max.y as f64])
            .paint(move |ctx| {
                if let Some(food) = food {
                    let (x, y) = to_canvas(&grid, food);
                    ctx.draw(&square(x, y, cell * 0.5, Color::Red));
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color: Color::Red,
                    });
                }

                // Body first so the head is drawn on top
                for pose in poses.iter().rev() {
                    let (x, y) = to_canvas(&grid, pose.position);
                    let color = match pose.role {
                        SegmentRole::Head => Color::Cyan,
                        SegmentRole::Mid => Color::Green,
                        SegmentRole::Tail => Color::LightGreen,
                    };
                    ctx.draw(&square(x, y, cell * 0.7, color));
                    ctx.draw(&Points {
                        coords: &[(x, y)],
                        color,
                    });
                }

                ctx.layer();
                for flash in flashes {
                    let (x, y) = to_canvas(&grid, flash.position);
                    let (base, color) = match flash.kind {
                        EffectKind::Small => (0.6, Color::Yellow),
                        EffectKind::Large => (1.5, Color::Magenta),
                    };
                    let size = cell * base * (1.0 + flash.age() as f64);
                    ctx.draw(&square(x, y, size, color));
                }
            });

        frame.render_widget(canvas, area);
    }

    fn render_stats<F: FoodProvider>(
        &self,
        sim: &Simulation<F, ScoreCounter>,
        view: &View<'_>,
    ) -> Paragraph<'static> {
        let length = sim.snake().map(|s| s.len()).unwrap_or(0);
        let speed = 1.0 / sim.current_interval();
        let mode = if view.wrap_next { "Wrap" } else { "Walls" };

        let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Yellow));
        let value = |text: String| Span::styled(text, Style::default().fg(Color::White));

        let text = vec![Line::from(vec![
            label("Score: "),
            Span::styled(
                sim.score().value().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            label("Length: "),
            value(length.to_string()),
            Span::raw("    "),
            label("Speed: "),
            value(format!("{speed:.1}/s")),
            Span::raw("    "),
            label("Next: "),
            value(mode.to_string()),
            Span::raw("    "),
            label("Time: "),
            value(view.metrics.format_time()),
            Span::raw("    "),
            label("Best: "),
            value(view.metrics.high_score.to_string()),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_idle(&self, view: &View<'_>) -> Paragraph<'static> {
        let mode = if view.wrap_next {
            "wrap-around"
        } else {
            "walls"
        };
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GRID SNAKE",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Mode: ", Style::default().fg(Color::Yellow)),
                Span::styled(mode, Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
    }

    fn render_game_over<F: FoodProvider>(
        &self,
        sim: &Simulation<F, ScoreCounter>,
        cause: CollisionCause,
    ) -> Paragraph<'static> {
        let reason = match cause {
            CollisionCause::HitWall => "Hit the wall",
            CollisionCause::HitSelf => "Bit itself",
        };
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(reason, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    sim.score().value().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("T", Style::default().fg(Color::Cyan)),
            Span::raw(" walls/wrap | "),
            Span::styled("Space", Style::default().fg(Color::Green)),
            Span::raw(" start | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// World space has y growing downward; the canvas has it growing upward
fn to_canvas(grid: &GridSpec, p: WorldPos) -> (f64, f64) {
    let min = grid.origin();
    let max = grid.max();
    (p.x as f64, (min.y + max.y - p.y) as f64)
}

fn square(cx: f64, cy: f64, size: f64, color: Color) -> Rectangle {
    Rectangle {
        x: cx - size / 2.0,
        y: cy - size / 2.0,
        width: size,
        height: size,
        color,
    }
}
