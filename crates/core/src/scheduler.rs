//! Virtual-time timer queue
//!
//! Every timed transition of a draw (reel phase ends, spin hold, reveal
//! freeze) is a typed entry in one queue owned by the session. Nothing
//! blocks: the host advances the clock (from a frame loop, or instantly in
//! tests) and dispatches whatever fell due.
//!
//! Timers carry the epoch or draw number they were scheduled under. Handlers
//! compare it against the live value and drop mismatches, which covers the
//! race where a timer was already due when its owner was reset.

use std::time::Duration;

use crate::reel::ReelStep;

/// Opaque cancellation handle. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// What a timer means when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTimer {
    /// A reel phase has run its course
    Reel {
        reel: usize,
        epoch: u64,
        step: ReelStep,
    },
    /// Spin hold is over, time to draw the winners
    SpinElapsed { draw: u64 },
    /// All reels settled and the freeze elapsed
    Reveal { draw: u64 },
}

/// A timer that came due
#[derive(Debug, Clone, Copy)]
pub struct FiredTimer<K> {
    pub token: TimerToken,
    pub deadline: Duration,
    pub kind: K,
}

struct TimerEntry<K> {
    deadline: Duration,
    token: TimerToken,
    kind: K,
}

/// Timer queue on a virtual clock
pub struct Scheduler<K> {
    now: Duration,
    next_token: u64,
    entries: Vec<TimerEntry<K>>,
}

impl<K: Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_token: 1,
            entries: Vec::new(),
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `kind` to fire `delay` after the current clock
    pub fn schedule(&mut self, delay: Duration, kind: K) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.entries.push(TimerEntry {
            deadline: self.now + delay,
            token,
            kind,
        });
        token
    }

    /// Cancel a pending timer. Returns false if it already fired or was
    /// cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    /// Drop every pending timer matching `predicate`
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&K) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !predicate(&e.kind));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Fire the earliest timer due at or before `until`.
    ///
    /// The clock moves to that timer's deadline, so anything the handler
    /// schedules is measured from the moment the timer fired. Ties fire in
    /// scheduling order. Returns `None` (and leaves the clock alone) when
    /// nothing is due.
    pub fn pop_due(&mut self, until: Duration) -> Option<FiredTimer<K>> {
        let position = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.token.0))
            .map(|(i, _)| i)?;

        let entry = self.entries.swap_remove(position);
        if entry.deadline > self.now {
            self.now = entry.deadline;
        }
        Some(FiredTimer {
            token: entry.token,
            deadline: entry.deadline,
            kind: entry.kind,
        })
    }

    /// Move the clock forward without firing anything. Call after draining
    /// `pop_due`.
    pub fn settle_at(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}

impl<K: Copy> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
