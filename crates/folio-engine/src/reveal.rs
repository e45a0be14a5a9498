//! Phased reveal sequencer
//!
//! Shows an ordered list of steps cumulatively. Step `k` stays on screen for
//! its own delay before step `k + 1` appears. Once the last step has been
//! shown and its delay plus the terminal delay have elapsed, the completion
//! callback fires exactly once and the sequencer goes inert.
//!
//! The sequencer owns at most one pending timer. Each transition replaces it;
//! cancellation drops it. Fired ids that don't match the current handle are
//! ignored, so a cancelled sequencer never calls back.

use folio_core::{Error, RevealStep, Result};
use std::time::Duration;
use tracing::debug;

use crate::timer::{SharedTimers, TimerHandle, TimerId};

pub type StepCallback = Box<dyn FnMut(usize, &RevealStep) + Send>;
pub type CompleteCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    /// Steps `0..=cursor` are visible.
    Revealing(usize),
    Completed,
    Cancelled,
}

pub struct RevealSequencer {
    steps: Vec<RevealStep>,
    state: RevealState,
    terminal_delay: Duration,
    timers: SharedTimers,
    pending: Option<TimerHandle>,
    on_step_shown: StepCallback,
    on_complete: Option<CompleteCallback>,
}

impl RevealSequencer {
    /// Start revealing `steps`. Step 0 is shown immediately (`on_step_shown(0)`
    /// fires before this returns). An empty step list is rejected.
    pub fn start(
        steps: Vec<RevealStep>,
        terminal_delay: Duration,
        timers: SharedTimers,
        on_step_shown: impl FnMut(usize, &RevealStep) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::empty_sequence("reveal steps"));
        }
        let mut sequencer = Self {
            steps,
            state: RevealState::Revealing(0),
            terminal_delay,
            timers,
            pending: None,
            on_step_shown: Box::new(on_step_shown),
            on_complete: Some(Box::new(on_complete)),
        };
        sequencer.show(0);
        Ok(sequencer)
    }

    fn show(&mut self, index: usize) {
        self.state = RevealState::Revealing(index);
        (self.on_step_shown)(index, &self.steps[index]);

        let mut wait = self.steps[index].delay();
        if index == self.last_index() {
            wait += self.terminal_delay;
        }
        debug!("Reveal step {} shown, next transition in {:?}", index, wait);
        self.pending = Some(self.timers.schedule(wait));
    }

    /// Route a fired timer. Returns true if it belonged to this sequencer.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if !self.pending.as_ref().is_some_and(|h| h.owns(id)) {
            return false;
        }
        self.pending = None;

        match self.state {
            RevealState::Revealing(k) if k < self.last_index() => self.show(k + 1),
            RevealState::Revealing(_) => {
                self.state = RevealState::Completed;
                debug!("Reveal complete");
                if let Some(done) = self.on_complete.take() {
                    done();
                }
            }
            RevealState::Completed | RevealState::Cancelled => {}
        }
        true
    }

    /// Tear down without completing. No callback fires after this returns.
    /// Returns false if the sequencer had already finished.
    pub fn cancel(&mut self) -> bool {
        self.pending = None;
        self.on_complete = None;
        match self.state {
            RevealState::Revealing(_) => {
                self.state = RevealState::Cancelled;
                debug!("Reveal cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Index of the most recently revealed step.
    pub fn cursor(&self) -> Option<usize> {
        match self.state {
            RevealState::Revealing(k) => Some(k),
            RevealState::Completed => Some(self.last_index()),
            RevealState::Cancelled => None,
        }
    }

    /// Steps currently on screen.
    pub fn visible(&self) -> &[RevealStep] {
        match self.cursor() {
            Some(k) => &self.steps[..=k],
            None => &[],
        }
    }

    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.state, RevealState::Revealing(_))
    }

    fn last_index(&self) -> usize {
        self.steps.len() - 1
    }
}

impl std::fmt::Debug for RevealSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealSequencer")
            .field("steps", &self.steps.len())
            .field("state", &self.state)
            .field("pending", &self.pending.as_ref().map(|h| h.id()))
            .finish()
    }
}
