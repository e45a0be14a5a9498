//! Headless replay
//!
//! Drives a [`Showcase`] from a script of timed actions on a [`ManualClock`]
//! and records every output event with the virtual time it was produced at.
//!
//! Script format (JSON array, entries in any order, stable-sorted by time).
//! A `frames` entry is spread into one entry per frame before sorting, so it
//! interleaves with the rest of the script instead of holding the clock:
//!
//! ```json
//! [
//!   {"at_ms": 0,    "type": "keys", "codes": ["ArrowUp", "ArrowUp"]},
//!   {"at_ms": 1200, "type": "scroll", "offset": 60, "content_height": 400, "viewport_height": 40},
//!   {"at_ms": 1500, "type": "toggle_perf"}
//! ]
//! ```

use folio_core::{FolioConfig, KeyToken, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::scroll::ScrollMetrics;
use crate::showcase::{OutputEvent, Showcase, ShowcaseEvent};
use crate::timer::{ManualClock, TimerService};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    Key { code: KeyToken },
    Keys { codes: Vec<KeyToken> },
    Scroll(ScrollMetrics),
    Interact,
    TogglePerf,
    Dismiss,
    SkipIntro,
    /// `count` rendered frames, one per `every_ms`, starting now.
    Frames { count: u32, every_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// One output event stamped with virtual time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedOutput {
    pub at_ms: u64,
    pub event: OutputEvent,
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>> {
    Ok(serde_json::from_str(text)?)
}

struct Replayer {
    clock: std::sync::Arc<ManualClock>,
    showcase: Showcase,
    out: Vec<TimedOutput>,
}

impl Replayer {
    fn record(&mut self, events: Vec<OutputEvent>) {
        let at_ms = self.clock.now().as_millis() as u64;
        self.out
            .extend(events.into_iter().map(|event| TimedOutput { at_ms, event }));
    }

    fn dispatch(&mut self, event: ShowcaseEvent) {
        let events = self.showcase.handle(event);
        self.record(events);
    }

    /// Advance virtual time, feeding every fired timer through the showcase.
    fn advance_to(&mut self, target: Duration) {
        let by = target.saturating_sub(self.clock.now());
        let clock = self.clock.clone();
        clock.advance(by, |id| self.dispatch(ShowcaseEvent::Timer(id)));
    }

    fn apply(&mut self, action: ScriptAction) {
        match action {
            ScriptAction::Key { code } => self.dispatch(ShowcaseEvent::Key(code)),
            ScriptAction::Keys { codes } => {
                for code in codes {
                    self.dispatch(ShowcaseEvent::Key(code));
                }
            }
            ScriptAction::Scroll(metrics) => self.dispatch(ShowcaseEvent::Scroll(metrics)),
            ScriptAction::Interact => self.dispatch(ShowcaseEvent::Interaction),
            ScriptAction::TogglePerf => self.dispatch(ShowcaseEvent::TogglePerf),
            ScriptAction::Dismiss => self.dispatch(ShowcaseEvent::DismissEasterEgg),
            ScriptAction::SkipIntro => self.dispatch(ShowcaseEvent::SkipIntro),
            ScriptAction::Frames { count, .. } => {
                for _ in 0..count {
                    self.dispatch(ShowcaseEvent::Frame);
                }
            }
        }
    }
}

/// Split every `frames` entry into single-frame entries at their own times.
fn spread_frames(steps: Vec<ScriptStep>) -> Vec<ScriptStep> {
    let mut out = Vec::with_capacity(steps.len());
    for step in steps {
        match step.action {
            ScriptAction::Frames { count, every_ms } => {
                out.extend((0..u64::from(count)).map(|i| ScriptStep {
                    at_ms: step.at_ms + i * every_ms,
                    action: ScriptAction::Frames { count: 1, every_ms },
                }));
            }
            action => out.push(ScriptStep { at_ms: step.at_ms, action }),
        }
    }
    out
}

/// Run `steps` against a fresh showcase, then keep the clock running for
/// `tail` after the last step so pending timers can settle.
pub fn replay(config: FolioConfig, steps: Vec<ScriptStep>, tail: Duration) -> Result<Vec<TimedOutput>> {
    let clock = ManualClock::shared();
    let mut replayer = Replayer {
        showcase: Showcase::new(config, clock.clone())?,
        clock,
        out: Vec::new(),
    };

    let started = replayer.showcase.start()?;
    replayer.record(started);

    let mut steps = spread_frames(steps);
    steps.sort_by_key(|s| s.at_ms);
    info!("Replaying {} script steps", steps.len());

    for step in steps {
        replayer.advance_to(Duration::from_millis(step.at_ms));
        debug!("t={}ms {:?}", step.at_ms, step.action);
        replayer.apply(step.action);
    }

    let end = replayer.clock.now() + tail;
    replayer.advance_to(end);
    Ok(replayer.out)
}
