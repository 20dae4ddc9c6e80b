//! Preview debouncing
//!
//! Every edit bumps a generation counter and restarts the quiet period. A poll only fires
//! once the period has elapsed since the latest edit, so a burst of typing produces one
//! render for the final text and never one for a stale intermediate state.

use std::time::{Duration, Instant};

pub const DEFAULT_DELAY: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    fired: u64,
    last_touch: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            fired: 0,
            last_touch: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record an edit at `now`, returning its generation
    pub fn touch(&mut self, now: Instant) -> u64 {
        self.generation += 1;
        self.last_touch = Some(now);
        self.generation
    }

    /// The generation to render, if the quiet period after the latest edit has passed
    ///
    /// Each generation fires at most once.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        let last = self.last_touch?;
        if self.fired == self.generation || now.saturating_duration_since(last) < self.delay {
            return None;
        }
        self.fired = self.generation;
        Some(self.generation)
    }

    /// Whether an edit is still waiting to be rendered
    pub fn is_pending(&self) -> bool {
        self.fired != self.generation
    }

    /// Time left before a poll at `now` could fire
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_touch?;
        if !self.is_pending() {
            return None;
        }
        Some(self.delay.saturating_sub(now.saturating_duration_since(last)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn nothing_fires_before_any_edit() {
        let mut debouncer = Debouncer::default();
        assert_eq!(debouncer.poll(Instant::now()), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(150 * MS);
        debouncer.touch(start);
        assert_eq!(debouncer.poll(start + 100 * MS), None);
        assert_eq!(debouncer.poll(start + 150 * MS), Some(1));
        assert_eq!(debouncer.poll(start + 400 * MS), None);
    }

    #[test]
    fn burst_of_edits_yields_only_the_latest_generation() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(150 * MS);
        debouncer.touch(start);
        debouncer.touch(start + 50 * MS);
        debouncer.touch(start + 120 * MS);
        // 160ms after the first edit but only 40ms after the last one
        assert_eq!(debouncer.poll(start + 160 * MS), None);
        assert_eq!(debouncer.poll(start + 270 * MS), Some(3));
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(150 * MS);
        assert_eq!(debouncer.remaining(start), None);
        debouncer.touch(start);
        assert_eq!(debouncer.remaining(start + 100 * MS), Some(50 * MS));
        debouncer.poll(start + 200 * MS);
        assert_eq!(debouncer.remaining(start + 200 * MS), None);
    }
}
