use crate::time::Millis;

/// A deferred action and the tick time at which it becomes due.
#[derive(Debug, Clone, PartialEq)]
pub struct Deferred<A> {
    pub deadline: Millis,
    pub action: A,
}

/// Deadline-ordered queue of deferred actions, polled once per tick.
#[derive(Debug, Clone)]
pub struct TimerQueue<A> {
    entries: Vec<Deferred<A>>,
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: Millis, action: A) {
        // Keep insertion order among equal deadlines.
        let at = self.entries.partition_point(|d| d.deadline <= deadline);
        self.entries.insert(at, Deferred { deadline, action });
    }

    /// Remove and return every action whose deadline is at or before `now`,
    /// earliest first.
    pub fn drain_due(&mut self, now: Millis) -> Vec<A> {
        let due = self.entries.partition_point(|d| d.deadline <= now);
        self.entries.drain(..due).map(|d| d.action).collect()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.entries.first().map(|d| d.deadline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
