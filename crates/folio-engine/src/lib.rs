//! Folio engine: timer-driven showcase components
//!
//! Components own their timers through [`timer::TimerHandle`]s and react to
//! fired ids routed back by the [`showcase::Showcase`] host. Nothing here
//! sleeps or reads a wall clock directly, so everything runs identically
//! under [`timer::TokioTimers`] and [`timer::ManualClock`].

pub mod contact;
pub mod favicon;
pub mod particles;
pub mod perf;
pub mod replay;
pub mod reveal;
pub mod scroll;
pub mod showcase;
pub mod timer;
pub mod watcher;

pub use favicon::{FaviconAnimator, FaviconFrame};
pub use replay::{parse_script, replay, ScriptAction, ScriptStep, TimedOutput};
pub use reveal::{RevealSequencer, RevealState};
pub use scroll::ScrollMetrics;
pub use showcase::{DismissReason, OutputEvent, Phase, Showcase, ShowcaseEvent};
pub use timer::{ManualClock, SharedTimers, TimerHandle, TimerId, TimerService, TokioTimers};
pub use watcher::SequenceWatcher;
