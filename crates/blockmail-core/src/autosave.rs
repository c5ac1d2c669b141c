//! Autosave debouncing and the save-status indicator.
//!
//! ## Learning: Time as an Argument
//!
//! Neither type reads the clock. Callers pass `now: Instant` in, which keeps
//! both fully deterministic in tests: no sleeps, no flaky timing.

use std::time::{Duration, Instant};

/// Collapses bursts of edits into one write.
///
/// Each [`schedule`](Debouncer::schedule) replaces the pending deadline, so
/// only the last edit of a burst triggers a save.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the deadline at `now + delay`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns `true` once, when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

/// What the save indicator shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Hidden,
    Saving,
    Saved,
    Failed(String),
}

impl SaveStatus {
    /// Text for the indicator, if visible.
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Hidden => None,
            Self::Saving => Some("Saving...".to_string()),
            Self::Saved => Some("Saved".to_string()),
            Self::Failed(message) => Some(format!("Save failed: {message}")),
        }
    }
}

/// Drives [`SaveStatus`] through `Saving -> Saved -> Hidden`.
#[derive(Debug, Clone)]
pub struct SaveIndicator {
    status: SaveStatus,
    changed_at: Option<Instant>,
    saving_for: Duration,
    saved_for: Duration,
}

impl SaveIndicator {
    pub fn new(saving_for: Duration, saved_for: Duration) -> Self {
        Self {
            status: SaveStatus::Hidden,
            changed_at: None,
            saving_for,
            saved_for,
        }
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    /// A write succeeded.
    pub fn saving(&mut self, now: Instant) {
        self.set(SaveStatus::Saving, now);
    }

    /// A write failed. Stays until the next successful write.
    pub fn failed(&mut self, message: impl Into<String>, now: Instant) {
        self.set(SaveStatus::Failed(message.into()), now);
    }

    /// Advances the timed transitions. Returns `true` if the status changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(since) = self.changed_at else {
            return false;
        };
        let elapsed = now.saturating_duration_since(since);
        let next = match self.status {
            SaveStatus::Saving if elapsed >= self.saving_for => SaveStatus::Saved,
            SaveStatus::Saved if elapsed >= self.saved_for => SaveStatus::Hidden,
            _ => return false,
        };
        self.set(next, now);
        true
    }

    fn set(&mut self, status: SaveStatus, now: Instant) {
        self.changed_at = (status != SaveStatus::Hidden).then_some(now);
        self.status = status;
    }
}

impl Default for SaveIndicator {
    fn default() -> Self {
        Self::new(Duration::from_millis(300), Duration::from_millis(2000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_debouncer_fires_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(1000 * MS);
        debouncer.schedule(start);

        assert!(!debouncer.poll(start + 999 * MS));
        assert!(debouncer.poll(start + 1000 * MS));
        assert!(!debouncer.poll(start + 2000 * MS));
    }

    #[test]
    fn test_reschedule_supersedes() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(1000 * MS);
        debouncer.schedule(start);
        debouncer.schedule(start + 800 * MS);

        assert!(!debouncer.poll(start + 1200 * MS));
        assert!(debouncer.poll(start + 1800 * MS));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.schedule(start);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        assert!(!debouncer.poll(start + 5000 * MS));
    }

    #[test]
    fn test_indicator_walks_through_states() {
        let start = Instant::now();
        let mut indicator = SaveIndicator::default();
        assert_eq!(indicator.status(), &SaveStatus::Hidden);

        indicator.saving(start);
        assert_eq!(indicator.status(), &SaveStatus::Saving);
        assert!(!indicator.tick(start + 299 * MS));

        assert!(indicator.tick(start + 300 * MS));
        assert_eq!(indicator.status(), &SaveStatus::Saved);

        assert!(!indicator.tick(start + 2299 * MS));
        assert!(indicator.tick(start + 2300 * MS));
        assert_eq!(indicator.status(), &SaveStatus::Hidden);
        assert!(!indicator.tick(start + 9000 * MS));
    }

    #[test]
    fn test_failure_sticks_until_next_save() {
        let start = Instant::now();
        let mut indicator = SaveIndicator::default();
        indicator.failed("disk full", start);

        assert!(!indicator.tick(start + 60_000 * MS));
        assert_eq!(indicator.status().label().as_deref(), Some("Save failed: disk full"));

        indicator.saving(start + 60_000 * MS);
        assert_eq!(indicator.status(), &SaveStatus::Saving);
    }
}
