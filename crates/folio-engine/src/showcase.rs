//! Showcase: the single consumer of presentation events
//!
//! Every input enters through [`Showcase::handle`]: key presses, scroll
//! updates, rendered frames, and fired timers. The showcase routes each event
//! to the component that owns it and returns the resulting [`OutputEvent`]s in
//! the order they happened. The presentation layer only ever reads those.
//!
//! Timers fired by a [`TimerService`](crate::timer::TimerService) must be fed
//! back as [`ShowcaseEvent::Timer`]. Ids no component claims are dropped.

use folio_core::{FolioConfig, KeyToken, Result, RevealStep};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::favicon::{FaviconAnimator, FaviconFrame};
use crate::perf::{resident_mb, FrameMeter, PerfPanel, PerfSnapshot};
use crate::reveal::{RevealSequencer, RevealState};
use crate::scroll::{navbar_condensed, ScrollMetrics};
use crate::timer::{SharedTimers, TimerHandle, TimerId};
use crate::watcher::SequenceWatcher;

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ShowcaseEvent {
    /// A key was pressed.
    Key(KeyToken),
    /// The page scrolled or was resized.
    Scroll(ScrollMetrics),
    /// A click or any other non-key interaction.
    Interaction,
    /// Show or hide the performance panel.
    TogglePerf,
    /// Close the easter-egg overlay.
    DismissEasterEgg,
    /// Skip the intro.
    SkipIntro,
    /// A frame was rendered.
    Frame,
    /// A timer fired.
    Timer(TimerId),
}

// ---------------------------------------------------------------------------
// Output events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// The intro ran past its time cap.
    Failsafe,
    /// The visitor skipped it.
    Skipped,
}

/// Render triggers for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    /// Intro step `index` became visible (steps `0..=index` are on screen).
    IntroStep { index: usize, label: String },
    /// The caption under the intro letters became visible.
    IntroSubtitle { text: String },
    /// The intro finished on its own.
    IntroComplete,
    /// The intro was torn down before finishing.
    IntroDismissed { reason: DismissReason },
    /// The key sequence was entered.
    Unlocked,
    /// The easter-egg overlay closed.
    Relocked,
    Favicon(FaviconFrame),
    ScrollProgress { progress: f64 },
    Navbar { condensed: bool },
    PerfPanel { visible: bool },
    PerfSample(PerfSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    Page,
}

// ---------------------------------------------------------------------------
// Showcase
// ---------------------------------------------------------------------------

pub struct Showcase {
    config: FolioConfig,
    timers: SharedTimers,
    phase: Phase,
    intro: Option<RevealSequencer>,
    /// Caps intro duration. Present only while the intro runs.
    failsafe: Option<TimerHandle>,
    watcher: SequenceWatcher<KeyToken>,
    favicon: FaviconAnimator,
    perf: PerfPanel,
    meter: FrameMeter,
    scroll: ScrollMetrics,
    navbar_condensed: bool,
    interactive_after: Option<Duration>,
    last_sample: Option<PerfSnapshot>,
    /// Reveal callbacks and direct emits share this queue so output order
    /// matches the order things happened.
    output_tx: mpsc::UnboundedSender<OutputEvent>,
    output_rx: mpsc::UnboundedReceiver<OutputEvent>,
}

impl Showcase {
    /// Build the showcase. The config is validated here; nothing is scheduled
    /// until [`Showcase::start`].
    pub fn new(config: FolioConfig, timers: SharedTimers) -> Result<Self> {
        config.validate()?;
        let watcher = SequenceWatcher::new(
            config.easter_egg.sequence.clone(),
            config.easter_egg.unlock_duration(),
            timers.clone(),
        )?;
        let favicon = FaviconAnimator::new(
            config.favicon.glyph,
            config.favicon.pulse_interval(),
            config.favicon.pulse_step,
            timers.clone(),
        );
        let perf = PerfPanel::new(config.perf.sample_interval(), timers.clone());
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        Ok(Self {
            config,
            timers,
            phase: Phase::Intro,
            intro: None,
            failsafe: None,
            watcher,
            favicon,
            perf,
            meter: FrameMeter::new(),
            scroll: ScrollMetrics::default(),
            navbar_condensed: false,
            interactive_after: None,
            last_sample: None,
            output_tx,
            output_rx,
        })
    }

    /// Draw the initial favicon and start the intro and its failsafe.
    pub fn start(&mut self) -> Result<Vec<OutputEvent>> {
        self.emit(OutputEvent::Favicon(self.favicon.current()));

        let steps = self.config.intro.steps.clone();
        let last = steps.len().saturating_sub(1);
        let subtitle = self.config.intro.subtitle.clone();
        let step_tx = self.output_tx.clone();
        let done_tx = self.output_tx.clone();

        let intro = RevealSequencer::start(
            steps,
            self.config.intro.terminal_delay(),
            self.timers.clone(),
            move |index, step: &RevealStep| {
                let _ = step_tx.send(OutputEvent::IntroStep {
                    index,
                    label: step.label.clone(),
                });
                if index == last && !subtitle.is_empty() {
                    let _ = step_tx.send(OutputEvent::IntroSubtitle {
                        text: subtitle.clone(),
                    });
                }
            },
            move || {
                let _ = done_tx.send(OutputEvent::IntroComplete);
            },
        )?;
        self.intro = Some(intro);
        self.failsafe = Some(self.timers.schedule(self.config.intro.failsafe()));
        self.phase = Phase::Intro;
        info!("Showcase started");
        Ok(self.drain())
    }

    /// Process one event and return what changed.
    pub fn handle(&mut self, event: ShowcaseEvent) -> Vec<OutputEvent> {
        match event {
            ShowcaseEvent::Key(token) => {
                self.favicon.on_interaction();
                if self.watcher.observe(token) {
                    self.emit(OutputEvent::Unlocked);
                }
            }

            ShowcaseEvent::Scroll(metrics) => self.handle_scroll(metrics),

            ShowcaseEvent::Interaction => self.favicon.on_interaction(),

            ShowcaseEvent::TogglePerf => {
                let visible = self.perf.toggle();
                self.emit(OutputEvent::PerfPanel { visible });
                if visible {
                    self.sample();
                }
            }

            ShowcaseEvent::DismissEasterEgg => {
                if self.watcher.dismiss() {
                    self.emit(OutputEvent::Relocked);
                }
            }

            ShowcaseEvent::SkipIntro => self.dismiss_intro(DismissReason::Skipped),

            ShowcaseEvent::Frame => {
                let now = self.timers.now();
                self.meter.record(now);
            }

            ShowcaseEvent::Timer(id) => self.handle_timer(id),
        }
        self.drain()
    }

    fn handle_timer(&mut self, id: TimerId) {
        if let Some(intro) = self.intro.as_mut() {
            if intro.on_timer(id) {
                if intro.state() == RevealState::Completed {
                    self.finish_intro();
                }
                return;
            }
        }

        if self.failsafe.as_ref().is_some_and(|h| h.owns(id)) {
            self.failsafe = None;
            self.dismiss_intro(DismissReason::Failsafe);
            return;
        }

        if self.watcher.on_timer(id) {
            self.emit(OutputEvent::Relocked);
            return;
        }

        if let Some(frame) = self.favicon.on_timer(id) {
            self.emit(OutputEvent::Favicon(frame));
            return;
        }

        if self.perf.on_timer(id) {
            self.sample();
            return;
        }

        debug!("Dropping unclaimed {}", id);
    }

    fn handle_scroll(&mut self, metrics: ScrollMetrics) {
        let progress_changed = metrics.progress() != self.scroll.progress();
        self.scroll = metrics;

        if progress_changed {
            self.emit(OutputEvent::ScrollProgress {
                progress: metrics.progress(),
            });
            if let Some(frame) = self.favicon.on_scroll(metrics.progress()) {
                self.emit(OutputEvent::Favicon(frame));
            }
        }

        let condensed = navbar_condensed(metrics.offset, self.config.navbar.condensed_after);
        if condensed != self.navbar_condensed {
            self.navbar_condensed = condensed;
            self.emit(OutputEvent::Navbar { condensed });
        }
    }

    fn finish_intro(&mut self) {
        self.failsafe = None;
        self.intro = None;
        self.enter_page();
        info!("Intro complete");
    }

    fn dismiss_intro(&mut self, reason: DismissReason) {
        if self.phase != Phase::Intro {
            return;
        }
        if let Some(mut intro) = self.intro.take() {
            intro.cancel();
        }
        self.failsafe = None;
        self.emit(OutputEvent::IntroDismissed { reason });
        self.enter_page();
        info!("Intro dismissed: {:?}", reason);
    }

    fn enter_page(&mut self) {
        self.phase = Phase::Page;
        self.interactive_after = Some(self.timers.now());
    }

    fn sample(&mut self) {
        let now = self.timers.now();
        let snapshot = PerfSnapshot {
            fps: self.meter.fps(now),
            frame_time_ms: self.meter.mean_frame_ms(),
            uptime_ms: now.as_millis() as u64,
            interactive_after_ms: self.interactive_after.map(|d| d.as_millis() as u64),
            resident_mb: resident_mb(),
        };
        self.last_sample = Some(snapshot.clone());
        self.emit(OutputEvent::PerfSample(snapshot));
    }

    fn emit(&self, event: OutputEvent) {
        let _ = self.output_tx.send(event);
    }

    fn drain(&mut self) -> Vec<OutputEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.output_rx.try_recv() {
            out.push(event);
        }
        out
    }

    // -----------------------------------------------------------------------
    // Read-only state for rendering
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    /// Intro steps on screen right now.
    pub fn intro_visible(&self) -> &[RevealStep] {
        self.intro.as_ref().map(|i| i.visible()).unwrap_or(&[])
    }

    /// True once the last intro step is on screen.
    pub fn intro_subtitle_visible(&self) -> bool {
        self.intro
            .as_ref()
            .is_some_and(|i| i.visible().len() == i.steps().len())
    }

    pub fn is_unlocked(&self) -> bool {
        self.watcher.is_unlocked()
    }

    pub fn favicon(&self) -> FaviconFrame {
        self.favicon.current()
    }

    pub fn scroll(&self) -> ScrollMetrics {
        self.scroll
    }

    pub fn navbar_condensed(&self) -> bool {
        self.navbar_condensed
    }

    pub fn perf_visible(&self) -> bool {
        self.perf.is_visible()
    }

    pub fn last_sample(&self) -> Option<&PerfSnapshot> {
        self.last_sample.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.timers.now()
    }
}
