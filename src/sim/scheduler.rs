//! Game-clock timers
//!
//! Timers are plain data ordered by fire time and advanced by the frame
//! delta, so a frame that covers several intervals fires each one in order.
//! Ending a session clears the queue; nothing fires afterwards.

use serde::{Deserialize, Serialize};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// One second off the session clock
    Countdown,
    /// Spawn a fish and re-arm with a difficulty-dependent delay
    FishSpawn,
    /// Roll for a whale
    WhaleSpawn,
    /// Spawn a treasure
    TreasureSpawn,
}

/// A pending timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    /// Game time (ms) at which the timer fires
    pub fire_at: f64,
    pub kind: TimerKind,
    /// Re-arm interval for looping timers
    pub repeat_ms: Option<f64>,
    /// Insertion order, breaks ties between equal fire times
    seq: u64,
}

/// Sorted timer queue plus the game clock it runs against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: f64,
    timers: Vec<Timer>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current game time in ms
    pub fn now(&self) -> f64 {
        self.now_ms
    }

    /// Pending timers, soonest first
    pub fn pending(&self) -> &[Timer] {
        &self.timers
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Fire once, `delay_ms` from now
    pub fn once(&mut self, delay_ms: f64, kind: TimerKind) {
        self.insert(self.now_ms + delay_ms, kind, None);
    }

    /// Fire every `interval_ms`, first time one interval from now
    pub fn every(&mut self, interval_ms: f64, kind: TimerKind) {
        self.insert(self.now_ms + interval_ms, kind, Some(interval_ms));
    }

    fn insert(&mut self, fire_at: f64, kind: TimerKind, repeat_ms: Option<f64>) {
        // Finite times and positive intervals only, or the queue never drains
        if !fire_at.is_finite() || repeat_ms.is_some_and(|ms| !(ms > 0.0)) {
            log::warn!("Dropping {kind:?} timer at {fire_at} (repeat {repeat_ms:?})");
            return;
        }
        let timer = Timer {
            fire_at,
            kind,
            repeat_ms,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let idx = self
            .timers
            .partition_point(|t| (t.fire_at, t.seq) <= (timer.fire_at, timer.seq));
        self.timers.insert(idx, timer);
    }

    /// Pop the next timer due at or before `until`, moving the clock to its
    /// fire time. Looping timers are re-armed before they are returned.
    pub fn pop_due(&mut self, until: f64) -> Option<TimerKind> {
        let first = self.timers.first()?;
        if first.fire_at > until {
            return None;
        }
        let timer = self.timers.remove(0);
        self.now_ms = self.now_ms.max(timer.fire_at);
        if let Some(interval) = timer.repeat_ms {
            self.insert(timer.fire_at + interval, timer.kind, Some(interval));
        }
        Some(timer.kind)
    }

    /// Move the clock forward to `until` once every due timer has been popped
    pub fn settle(&mut self, until: f64) {
        self.now_ms = self.now_ms.max(until);
    }

    /// Drop every pending timer
    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }
}
