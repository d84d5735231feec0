//! Save coalescing.
//!
//! One `SaveChannel` per persistence stream (lists index, todos of the
//! selected list). Mutations enqueue; the host's pump drains channels that
//! have come due and serializes whatever the state is *then*, so a burst of
//! edits collapses into a single save carrying the latest data. The channel
//! owns no IO and no clock; callers pass `Instant`s in, which keeps tests
//! deterministic.

use std::time::{Duration, Instant};

/// Quiet period for debounced saves.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Due at once; cancels any running debounce timer.
    Immediate,
    /// (Re)starts the timer: the save fires after a quiet period.
    Debounced(Duration),
}

#[derive(Debug, Default)]
pub struct SaveChannel {
    dirty: bool,
    due_at: Option<Instant>,
}

impl SaveChannel {
    /// Mark the channel dirty and set when it comes due. A debounced
    /// enqueue while the timer runs restarts it, coalescing the burst.
    pub fn enqueue(&mut self, now: Instant, mode: SaveMode) {
        self.dirty = true;
        self.due_at = Some(match mode {
            SaveMode::Immediate => now,
            SaveMode::Debounced(delay) => now + delay,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.dirty
    }

    /// True exactly once when the channel is dirty and its deadline has
    /// passed; the caller performs the save.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.dirty && self.due_at.is_some_and(|due| due <= now) {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Drain regardless of the timer. True if a save should be performed.
    pub fn flush(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.reset();
        was_dirty
    }

    /// Drop pending work without saving (e.g. the list it belonged to was
    /// deleted).
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.dirty = false;
        self.due_at = None;
    }
}
