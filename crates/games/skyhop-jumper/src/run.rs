use serde::{Deserialize, Serialize};

use crate::events::EndCause;
use crate::scoring::ComboScorer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    NotStarted,
    Running,
    GameOver,
}

/// Score, height and lifecycle of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: RunPhase,
    pub score: u64,
    /// Height units above the spawn point; negative below it.
    pub current_height: i64,
    pub highest_height: i64,
    pub combo: ComboScorer,
    pub end_cause: Option<EndCause>,
}

impl RunState {
    pub fn game_started(&self) -> bool {
        self.phase != RunPhase::NotStarted
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    pub fn start(&mut self) -> bool {
        if self.phase != RunPhase::NotStarted {
            return false;
        }
        self.phase = RunPhase::Running;
        true
    }

    /// Enter the terminal state. Only the first call while running counts.
    pub fn end(&mut self, cause: EndCause) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        self.phase = RunPhase::GameOver;
        self.end_cause = Some(cause);
        true
    }

    pub fn add_points(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// `floor((initial_y - y) / unit)`.
    pub fn height_at(initial_y: f32, y: f32, unit: f32) -> i64 {
        ((initial_y - y) / unit).floor() as i64
    }

    /// Record a new current height. Returns true when it sets a new best.
    pub fn record_height(&mut self, current: i64) -> bool {
        self.current_height = current;
        if current > self.highest_height {
            self.highest_height = current;
            return true;
        }
        false
    }

    /// Height shown on the HUD, never below zero.
    pub fn display_height(&self) -> i64 {
        self.current_height.max(0)
    }
}
