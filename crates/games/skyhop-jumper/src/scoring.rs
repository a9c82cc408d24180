use serde::{Deserialize, Serialize};

use skyhop_core::time::{Millis, elapsed};

use crate::config::ScoringConfig;

/// Time-windowed kill combo.
///
/// Multipliers are kept in integer percent so that awards such as
/// `100 * 1.4` come out exact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboScorer {
    pub count: u32,
    pub last_kill_ms: Option<Millis>,
}

impl ComboScorer {
    /// Extend the combo if the previous kill is inside the window, otherwise
    /// start a new one.
    pub fn register_kill(&mut self, now: Millis, cfg: &ScoringConfig) {
        let chained = self
            .last_kill_ms
            .is_some_and(|last| elapsed(now, last) < cfg.combo_window_ms);
        self.count = if chained { self.count + 1 } else { 1 };
        self.last_kill_ms = Some(now);
    }

    /// 100 for a single kill, then `100 + count * step`, capped.
    pub fn multiplier_percent(&self, cfg: &ScoringConfig) -> u64 {
        if self.count <= 1 {
            return 100;
        }
        (100 + u64::from(self.count) * cfg.combo_step_percent).min(cfg.combo_cap_percent)
    }

    pub fn multiplier(&self, cfg: &ScoringConfig) -> f32 {
        self.multiplier_percent(cfg) as f32 / 100.0
    }

    /// Combo-scaled award for `base` points, floored.
    pub fn award(&self, base: u64, cfg: &ScoringConfig) -> u64 {
        base * self.multiplier_percent(cfg) / 100
    }

    /// Reset once the window has passed. Returns whether the combo ended.
    pub fn decay(&mut self, now: Millis, cfg: &ScoringConfig) -> bool {
        let lapsed = self
            .last_kill_ms
            .is_some_and(|last| elapsed(now, last) > cfg.combo_window_ms);
        if lapsed && self.count > 0 {
            self.count = 0;
            return true;
        }
        false
    }

    /// The combo display is shown from the second chained kill.
    pub fn is_visible(&self) -> bool {
        self.count > 1
    }
}
