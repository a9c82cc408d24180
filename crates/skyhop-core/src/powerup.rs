use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::time::{Millis, elapsed};

/// Trait for game-specific power-up kind enums.
pub trait PowerUpKind: Clone + Copy + PartialEq + Serialize + DeserializeOwned {
    /// Fixed priority used to break ties between equally recent power-ups.
    /// Higher wins.
    fn priority(&self) -> u8;
}

/// Timer state of one power-up slot on a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub active: bool,
    pub start_ms: Millis,
    pub duration_ms: Millis,
}

impl TimedEffect {
    pub fn new(duration_ms: Millis) -> Self {
        Self {
            active: false,
            start_ms: 0,
            duration_ms,
        }
    }

    /// Turn the effect on, restarting its timer.
    pub fn activate(&mut self, now: Millis) {
        self.active = true;
        self.start_ms = now;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Active and not yet past its duration.
    pub fn is_live(&self, now: Millis) -> bool {
        self.active && elapsed(now, self.start_ms) <= self.duration_ms
    }

    /// Active but strictly past its duration.
    pub fn has_expired(&self, now: Millis) -> bool {
        self.active && elapsed(now, self.start_ms) > self.duration_ms
    }

    pub fn remaining_ms(&self, now: Millis) -> Millis {
        if !self.active {
            return 0;
        }
        self.duration_ms
            .saturating_sub(elapsed(now, self.start_ms))
    }
}

/// Pick the most recently started live effect. Equal start times fall back to
/// the kind priority.
pub fn most_recent<'a, K, I>(slots: I, now: Millis) -> Option<K>
where
    K: PowerUpKind + 'a,
    I: IntoIterator<Item = (K, &'a TimedEffect)>,
{
    slots
        .into_iter()
        .filter(|(_, effect)| effect.is_live(now))
        .max_by(|(ka, a), (kb, b)| {
            a.start_ms
                .cmp(&b.start_ms)
                .then(ka.priority().cmp(&kb.priority()))
        })
        .map(|(kind, _)| kind)
}
