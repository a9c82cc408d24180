pub mod game_trait;
pub mod pool;
pub mod powerup;
pub mod random;
pub mod services;
pub mod time;
pub mod timers;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::fmt::Debug;

    use crate::game_trait::{Services, Simulation};
    use crate::services::{MemoryStore, RecordingSink};
    use crate::time::{Clock, ManualClock, Millis};

    /// Fixed step used by the helpers: 16 ms, roughly 60 Hz.
    pub const STEP_MS: Millis = 16;

    /// Clock, recording sink and in-memory store for driving a simulation.
    pub struct Harness<C> {
        pub clock: ManualClock,
        pub sink: RecordingSink<C>,
        pub store: MemoryStore,
    }

    impl<C: Clone + PartialEq + Debug> Default for Harness<C> {
        fn default() -> Self {
            Self {
                clock: ManualClock::starting_at(1_000),
                sink: RecordingSink::new(),
                store: MemoryStore::new(),
            }
        }
    }

    impl<C: Clone + PartialEq + Debug + 'static> Harness<C> {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now(&self) -> Millis {
            self.clock.now_ms()
        }

        pub fn services(&mut self) -> Services<'_, C> {
            Services::new(&mut self.sink, &mut self.store)
        }

        /// Start `sim` at the current clock reading.
        pub fn start<S: Simulation<Cue = C>>(&mut self, sim: &mut S) {
            let now = self.now();
            let mut services = self.services();
            sim.start(now, &mut services);
        }

        /// Advance the clock one step and update `sim` with `input`.
        pub fn step<S: Simulation<Cue = C>>(&mut self, sim: &mut S, input: &S::Input) -> Vec<S::Event> {
            let now = self.clock.advance(STEP_MS);
            let mut services = self.services();
            sim.update(STEP_MS as f32 / 1000.0, now, input, &mut services)
        }
    }

    /// Run N ticks with default input, returning all accumulated events.
    pub fn run_ticks<S>(sim: &mut S, harness: &mut Harness<S::Cue>, n: usize) -> Vec<S::Event>
    where
        S: Simulation,
        S::Cue: Clone + PartialEq + Debug + 'static,
    {
        let input = S::Input::default();
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(harness.step(sim, &input));
        }
        all_events
    }

    // ================================================================
    // Simulation Trait Contract Tests
    // ================================================================
    // Every Simulation implementation must pass these. Game crates call
    // them from their own tests with a freshly constructed instance.

    /// After start(), serialize_snapshot() must return non-empty bytes.
    pub fn contract_start_creates_state<S>(sim: &mut S, harness: &mut Harness<S::Cue>)
    where
        S: Simulation,
        S::Cue: Clone + PartialEq + Debug + 'static,
    {
        harness.start(sim);
        assert!(
            !sim.serialize_snapshot().is_empty(),
            "serialize_snapshot() must return non-empty bytes after start"
        );
    }

    /// A started simulation must change state on update.
    pub fn contract_update_advances_state<S>(sim: &mut S, harness: &mut Harness<S::Cue>)
    where
        S: Simulation,
        S::Cue: Clone + PartialEq + Debug + 'static,
    {
        let before = sim.serialize_snapshot();
        run_ticks(sim, harness, 1);
        let after = sim.serialize_snapshot();
        assert_ne!(before, after, "update() must advance simulation state");
    }

    /// pause() must freeze state, resume() must unfreeze it.
    pub fn contract_pause_stops_updates<S>(sim: &mut S, harness: &mut Harness<S::Cue>)
    where
        S: Simulation,
        S::Cue: Clone + PartialEq + Debug + 'static,
    {
        sim.pause();
        let before = sim.serialize_snapshot();
        let events = run_ticks(sim, harness, 3);
        assert!(events.is_empty(), "No events may be emitted while paused");
        assert_eq!(
            before,
            sim.serialize_snapshot(),
            "State must not change while paused"
        );

        sim.resume();
        run_ticks(sim, harness, 1);
        assert_ne!(
            before,
            sim.serialize_snapshot(),
            "State must change after resume"
        );
    }

    /// Running long enough with default input must end the run, and the
    /// terminal state must then stay frozen.
    pub fn contract_run_ends_and_freezes<S>(
        sim: &mut S,
        harness: &mut Harness<S::Cue>,
        max_ticks: usize,
    ) where
        S: Simulation,
        S::Cue: Clone + PartialEq + Debug + 'static,
    {
        for _ in 0..max_ticks {
            run_ticks(sim, harness, 1);
            if sim.is_over() {
                break;
            }
        }
        assert!(sim.is_over(), "Run must end within {max_ticks} idle ticks");

        let frozen = sim.serialize_snapshot();
        let events = run_ticks(sim, harness, 5);
        assert!(events.is_empty(), "No events may follow the terminal state");
        assert_eq!(
            frozen,
            sim.serialize_snapshot(),
            "Terminal state must not change"
        );
    }
}
