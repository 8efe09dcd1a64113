use std::time::{Duration, Instant};

use crate::game::CollisionCause;

/// Session statistics shown next to the board
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    pub wall_deaths: u32,
    pub self_deaths: u32,
    round_active: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            wall_deaths: 0,
            self_deaths: 0,
            round_active: false,
        }
    }

    /// Refresh the round clock; it stops when the round ends
    pub fn update(&mut self) {
        if self.round_active {
            self.elapsed_time = self.start_time.elapsed();
        }
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
        self.round_active = true;
    }

    pub fn on_collision(&mut self, cause: CollisionCause) {
        self.update();
        self.round_active = false;
        match cause {
            CollisionCause::HitWall => self.wall_deaths += 1,
            CollisionCause::HitSelf => self.self_deaths += 1,
        }
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        if final_score > self.high_score {
            self.high_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
