use std::time::Instant;

use crate::engine::Mistake;

/// One stay on an item. Re-entering the same index starts a new generation,
/// so effects scheduled for an earlier stay can be told apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    pub index: usize,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerAction {
    Advance,
    Recover(Mistake),
    ClearCelebration,
}

#[derive(Clone, Debug)]
struct Scheduled {
    due: Instant,
    seq: u64,
    visit: Visit,
    action: TimerAction,
}

/// Delayed effects, polled rather than called back.
#[derive(Clone, Debug, Default)]
pub struct Timers {
    queue: Vec<Scheduled>,
    seq: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, visit: Visit, due: Instant, action: TimerAction) {
        self.seq += 1;
        self.queue.push(Scheduled {
            due,
            seq: self.seq,
            visit,
            action,
        });
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    /// Drop every pending effect whose action matches.
    pub fn cancel_where(&mut self, mut matches: impl FnMut(&TimerAction) -> bool) {
        self.queue.retain(|scheduled| !matches(&scheduled.action));
    }

    /// Removes and returns the earliest effect due at `now`. Ties go to the one
    /// scheduled first.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Visit, TimerAction)> {
        let pos = self
            .queue
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| (s.due, s.seq))
            .map(|(pos, _)| pos)?;
        let fired = self.queue.swap_remove(pos);
        Some((fired.visit, fired.action))
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
