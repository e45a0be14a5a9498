//! Key-sequence watcher
//!
//! Keeps a sliding window of the most recent N tokens and unlocks when the
//! window equals the target sequence exactly. The unlock is transient: it
//! expires on its own after a fixed duration, or immediately on `dismiss()`.

use folio_core::{Error, Result};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, info};

use crate::timer::{SharedTimers, TimerHandle, TimerId};

pub struct SequenceWatcher<T> {
    target: Vec<T>,
    buffer: VecDeque<T>,
    unlocked: bool,
    unlock_for: Duration,
    timers: SharedTimers,
    /// Pending auto-relock. Present only while unlocked.
    relock: Option<TimerHandle>,
}

impl<T: PartialEq + Clone + Debug> SequenceWatcher<T> {
    /// Create a watcher for `target`. An empty target is rejected.
    pub fn new(target: Vec<T>, unlock_for: Duration, timers: SharedTimers) -> Result<Self> {
        if target.is_empty() {
            return Err(Error::empty_sequence("watcher target"));
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(target.len()),
            target,
            unlocked: false,
            unlock_for,
            timers,
            relock: None,
        })
    }

    /// Feed one token. Returns true if this token completed the sequence.
    pub fn observe(&mut self, token: T) -> bool {
        self.buffer.push_back(token);
        if self.buffer.len() > self.target.len() {
            self.buffer.pop_front();
        }

        if self.buffer.len() < self.target.len() || !self.buffer.iter().eq(self.target.iter()) {
            return false;
        }

        // Emptied so overlapping tail data can't retrigger.
        self.buffer.clear();
        self.unlocked = true;
        // Replacing the handle cancels any earlier relock.
        self.relock = Some(self.timers.schedule(self.unlock_for));
        info!("Sequence matched, unlocked for {:?}", self.unlock_for);
        true
    }

    /// Route a fired timer. Returns true if it relocked the watcher.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        match &self.relock {
            Some(handle) if handle.owns(id) => {
                self.relock = None;
                self.unlocked = false;
                debug!("Unlock window expired");
                true
            }
            _ => false,
        }
    }

    /// Relock immediately and cancel the pending auto-relock.
    /// Returns true if the watcher was unlocked.
    pub fn dismiss(&mut self) -> bool {
        self.relock = None;
        std::mem::replace(&mut self.unlocked, false)
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Tokens currently held in the window, oldest first.
    pub fn buffered(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }

    pub fn target(&self) -> &[T] {
        &self.target
    }
}
