use serde::{Deserialize, Serialize};

use crate::services::{EffectSink, ScoreStore};
use crate::time::Millis;

/// Core trait for a fixed-step Skyhop simulation.
///
/// The host owns the clock, input polling and the collaborator services;
/// the simulation only advances its own state and reports what happened.
pub trait Simulation {
    /// Per-tick input snapshot.
    type Input: Default;
    /// Presentation cues (sounds, loops, spawned visuals).
    type Cue;
    /// Gameplay events returned from each update.
    type Event;

    fn metadata(&self) -> GameMetadata;

    /// Begin the run at `now_ms`.
    fn start(&mut self, now_ms: Millis, services: &mut Services<'_, Self::Cue>);

    /// Advance one fixed step. `dt` is in seconds, `now_ms` is the shared
    /// clock reading for this tick.
    fn update(
        &mut self,
        dt: f32,
        now_ms: Millis,
        input: &Self::Input,
        services: &mut Services<'_, Self::Cue>,
    ) -> Vec<Self::Event>;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    /// MessagePack encoding of the run state for a presentation bridge.
    fn serialize_snapshot(&self) -> Vec<u8>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn is_paused(&self) -> bool;

    /// Whether the run reached its terminal state.
    fn is_over(&self) -> bool;
}

/// Static description of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
}

/// Collaborators handed to every tick.
pub struct Services<'a, C> {
    pub effects: &'a mut dyn EffectSink<C>,
    pub store: &'a mut dyn ScoreStore,
}

impl<'a, C> Services<'a, C> {
    pub fn new(effects: &'a mut dyn EffectSink<C>, store: &'a mut dyn ScoreStore) -> Self {
        Self { effects, store }
    }
}

/// Generates the `Simulation` methods that only touch `state` and `paused`:
/// `serialize_snapshot`, `pause`, `resume`, `is_paused`, `is_over`.
///
/// Requires the implementing struct to have `state` and `paused: bool`
/// fields, and the state type to be `Serialize` with an `is_over()` method.
/// The expansion names `rmp_serde` and `tracing` directly, so the calling
/// crate must depend on both.
#[macro_export]
macro_rules! simulation_boilerplate {
    () => {
        fn serialize_snapshot(&self) -> Vec<u8> {
            match rmp_serde::to_vec(&self.state) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode snapshot");
                    Vec::new()
                },
            }
        }

        fn pause(&mut self) {
            self.paused = true;
        }

        fn resume(&mut self) {
            self.paused = false;
        }

        fn is_paused(&self) -> bool {
            self.paused
        }

        fn is_over(&self) -> bool {
            self.state.is_over()
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{MemoryStore, RecordingSink};

    #[derive(Serialize)]
    struct CounterState {
        ticks: u32,
        limit: u32,
    }

    impl CounterState {
        fn is_over(&self) -> bool {
            self.ticks >= self.limit
        }
    }

    struct Counter {
        state: CounterState,
        paused: bool,
    }

    impl Simulation for Counter {
        type Input = ();
        type Cue = &'static str;
        type Event = u32;

        fn metadata(&self) -> GameMetadata {
            GameMetadata {
                name: "counter".into(),
                description: "counts ticks".into(),
            }
        }

        fn start(&mut self, _now_ms: Millis, services: &mut Services<'_, Self::Cue>) {
            let _ = services.effects.emit(&"start");
        }

        fn update(
            &mut self,
            _dt: f32,
            _now_ms: Millis,
            _input: &(),
            _services: &mut Services<'_, Self::Cue>,
        ) -> Vec<u32> {
            if self.paused || self.is_over() {
                return Vec::new();
            }
            self.state.ticks += 1;
            vec![self.state.ticks]
        }

        simulation_boilerplate!();
    }

    #[test]
    fn boilerplate_drives_pause_and_over() {
        let mut sim = Counter {
            state: CounterState { ticks: 0, limit: 2 },
            paused: false,
        };
        let mut sink = RecordingSink::new();
        let mut store = MemoryStore::new();
        let mut services = Services::new(&mut sink, &mut store);
        sim.start(0, &mut services);

        sim.pause();
        assert!(sim.is_paused());
        assert!(sim.update(0.016, 16, &(), &mut services).is_empty());
        sim.resume();
        assert_eq!(sim.update(0.016, 32, &(), &mut services), vec![1]);
        assert_eq!(sim.update(0.016, 48, &(), &mut services), vec![2]);
        assert!(sim.is_over());
        assert!(sim.update(0.016, 64, &(), &mut services).is_empty());
        assert!(!sim.serialize_snapshot().is_empty());
        assert_eq!(sim.tick_rate(), 60.0);
        drop(services);
        assert_eq!(sink.played, vec!["start"]);
    }
}
