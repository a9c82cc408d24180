use serde::{Deserialize, Serialize};

use skyhop_core::powerup::{self, TimedEffect, most_recent};
use skyhop_core::random::WeightedTable;
use skyhop_core::time::Millis;

use crate::config::PowerupConfig;

/// Jumper power-up types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Jetpack,
    SpringShoes,
    PropellerHat,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::PropellerHat,
        PowerupKind::Jetpack,
        PowerupKind::SpringShoes,
    ];

    /// HUD line shown while the power-up is active.
    pub fn status_line(self) -> &'static str {
        match self {
            PowerupKind::PropellerHat => "Propeller Hat Active",
            PowerupKind::Jetpack => "Jetpack Active",
            PowerupKind::SpringShoes => "Spring Shoes Active",
        }
    }

    /// Spawn roll: jetpack, spring shoes, propeller hat, otherwise nothing.
    pub fn spawn_table(cfg: &PowerupConfig) -> WeightedTable<PowerupKind> {
        WeightedTable::new(
            vec![
                (PowerupKind::Jetpack, cfg.jetpack_chance),
                (PowerupKind::SpringShoes, cfg.spring_shoes_chance),
                (PowerupKind::PropellerHat, cfg.propeller_hat_chance),
            ],
            None,
        )
    }
}

impl powerup::PowerUpKind for PowerupKind {
    fn priority(&self) -> u8 {
        match self {
            PowerupKind::PropellerHat => 3,
            PowerupKind::Jetpack => 2,
            PowerupKind::SpringShoes => 1,
        }
    }
}

/// The single power-up driving animation, physics and overlays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupState {
    #[default]
    Normal,
    Jetpack,
    SpringShoes,
    PropellerHat,
}

impl From<Option<PowerupKind>> for PowerupState {
    fn from(kind: Option<PowerupKind>) -> Self {
        match kind {
            None => PowerupState::Normal,
            Some(PowerupKind::Jetpack) => PowerupState::Jetpack,
            Some(PowerupKind::SpringShoes) => PowerupState::SpringShoes,
            Some(PowerupKind::PropellerHat) => PowerupState::PropellerHat,
        }
    }
}

impl PowerupState {
    pub fn kind(self) -> Option<PowerupKind> {
        match self {
            PowerupState::Normal => None,
            PowerupState::Jetpack => Some(PowerupKind::Jetpack),
            PowerupState::SpringShoes => Some(PowerupKind::SpringShoes),
            PowerupState::PropellerHat => Some(PowerupKind::PropellerHat),
        }
    }
}

/// A change of the current power-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerupTransition {
    pub from: PowerupState,
    pub to: PowerupState,
}

/// Result of a per-tick expiry pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerupTick {
    pub expired: Vec<PowerupKind>,
    pub transition: Option<PowerupTransition>,
}

/// Timed power-up effects on the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupTimers {
    pub jetpack: TimedEffect,
    pub spring_shoes: TimedEffect,
    pub propeller_hat: TimedEffect,
    current: PowerupState,
    /// End of the forced-ascent window that follows a jetpack pickup.
    auto_fly_until: Option<Millis>,
}

impl PowerupTimers {
    pub fn new(cfg: &PowerupConfig) -> Self {
        Self {
            jetpack: TimedEffect::new(cfg.jetpack_duration_ms),
            spring_shoes: TimedEffect::new(cfg.spring_shoes_duration_ms),
            propeller_hat: TimedEffect::new(cfg.propeller_hat_duration_ms),
            current: PowerupState::Normal,
            auto_fly_until: None,
        }
    }

    pub fn effect(&self, kind: PowerupKind) -> &TimedEffect {
        match kind {
            PowerupKind::Jetpack => &self.jetpack,
            PowerupKind::SpringShoes => &self.spring_shoes,
            PowerupKind::PropellerHat => &self.propeller_hat,
        }
    }

    fn effect_mut(&mut self, kind: PowerupKind) -> &mut TimedEffect {
        match kind {
            PowerupKind::Jetpack => &mut self.jetpack,
            PowerupKind::SpringShoes => &mut self.spring_shoes,
            PowerupKind::PropellerHat => &mut self.propeller_hat,
        }
    }

    /// The `has<Kind>` flag: timer running and not yet expired by a tick.
    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.effect(kind).active
    }

    pub fn any_active(&self) -> bool {
        PowerupKind::ALL.iter().any(|&k| self.is_active(k))
    }

    pub fn current(&self) -> PowerupState {
        self.current
    }

    /// Inside the forced-ascent window of a live jetpack.
    pub fn in_auto_fly(&self, now: Millis) -> bool {
        self.jetpack.active && self.auto_fly_until.is_some_and(|until| now < until)
    }

    /// Activate `kind` at `now`. The new kind becomes current unless a
    /// higher-priority kind is still live.
    pub fn collect(
        &mut self,
        kind: PowerupKind,
        now: Millis,
        cfg: &PowerupConfig,
    ) -> Option<PowerupTransition> {
        use skyhop_core::powerup::PowerUpKind as _;

        self.effect_mut(kind).activate(now);
        if kind == PowerupKind::Jetpack {
            self.auto_fly_until = Some(now + cfg.jetpack_auto_fly_ms);
        }

        let outranked = PowerupKind::ALL
            .iter()
            .any(|&other| other.priority() > kind.priority() && self.effect(other).is_live(now));
        if outranked {
            return None;
        }
        self.set_current(PowerupState::from(Some(kind)))
    }

    /// Expire finished effects and recompute the current power-up as the
    /// most recently started live one.
    pub fn tick(&mut self, now: Millis) -> PowerupTick {
        let mut expired = Vec::new();
        for kind in PowerupKind::ALL {
            let effect = self.effect_mut(kind);
            if effect.has_expired(now) {
                effect.deactivate();
                expired.push(kind);
            }
        }
        if expired.contains(&PowerupKind::Jetpack) {
            self.auto_fly_until = None;
        }

        let recent = most_recent(
            PowerupKind::ALL.iter().map(|&k| (k, self.effect(k))),
            now,
        );
        PowerupTick {
            expired,
            transition: self.set_current(PowerupState::from(recent)),
        }
    }

    /// Drop every effect, as on death.
    pub fn clear(&mut self) -> Option<PowerupTransition> {
        for kind in PowerupKind::ALL {
            self.effect_mut(kind).deactivate();
        }
        self.auto_fly_until = None;
        self.set_current(PowerupState::Normal)
    }

    /// HUD lines for every active effect, highest priority first.
    pub fn status_lines(&self) -> Vec<String> {
        PowerupKind::ALL
            .iter()
            .filter(|&&k| self.is_active(k))
            .map(|k| k.status_line().to_string())
            .collect()
    }

    fn set_current(&mut self, to: PowerupState) -> Option<PowerupTransition> {
        if self.current == to {
            return None;
        }
        let from = self.current;
        self.current = to;
        tracing::debug!(?from, ?to, "Current power-up changed");
        Some(PowerupTransition { from, to })
    }
}
