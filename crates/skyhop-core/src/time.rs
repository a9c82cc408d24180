use std::time::Instant;

/// Milliseconds on the simulation clock.
pub type Millis = u64;

/// Monotonic millisecond clock shared by every timer in a run.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock backed implementation, measured from construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Clock advanced explicitly by the caller, one fixed step per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: Millis,
}

impl ManualClock {
    pub fn starting_at(now: Millis) -> Self {
        Self { now }
    }

    pub fn advance(&mut self, ms: Millis) -> Millis {
        self.now = self.now.saturating_add(ms);
        self.now
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now
    }
}

/// Milliseconds elapsed from `since` to `now`, saturating at zero if the
/// timestamps arrive out of order.
pub fn elapsed(now: Millis, since: Millis) -> Millis {
    now.saturating_sub(since)
}
