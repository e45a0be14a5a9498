//! Performance overlay: frame-rate meter and a sampler that runs only while
//! the panel is visible.

use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use crate::timer::{SharedTimers, TimerHandle, TimerId};

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Counts frames over a trailing one-second window.
#[derive(Debug, Default)]
pub struct FrameMeter {
    frames: VecDeque<Duration>,
}

impl FrameMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, at: Duration) {
        self.frames.push_back(at);
        self.evict(at);
    }

    /// Frames rendered in the second leading up to `now`.
    pub fn fps(&mut self, now: Duration) -> u32 {
        self.evict(now);
        self.frames.len() as u32
    }

    /// Mean interval between recorded frames in the window, in milliseconds.
    pub fn mean_frame_ms(&self) -> Option<f64> {
        let (first, last) = (self.frames.front()?, self.frames.back()?);
        let gaps = self.frames.len().checked_sub(1).filter(|n| *n > 0)?;
        Some((*last - *first).as_secs_f64() * 1000.0 / gaps as f64)
    }

    fn evict(&mut self, now: Duration) {
        while let Some(&oldest) = self.frames.front() {
            if now.saturating_sub(oldest) >= FPS_WINDOW {
                self.frames.pop_front();
            } else {
                break;
            }
        }
    }
}

/// One reading shown on the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfSnapshot {
    pub fps: u32,
    pub frame_time_ms: Option<f64>,
    pub uptime_ms: u64,
    /// When the intro handed over to the page, if it has.
    pub interactive_after_ms: Option<u64>,
    pub resident_mb: Option<f64>,
}

/// Resident memory of this process, where the platform exposes it.
pub fn resident_mb() -> Option<f64> {
    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        ProcessRefreshKind::new().with_memory(),
    );
    let process = sys.process(pid)?;
    Some(process.memory() as f64 / 1_048_576.0)
}

pub struct PerfPanel {
    interval: Duration,
    timers: SharedTimers,
    /// Present exactly while the panel is visible.
    sampler: Option<TimerHandle>,
}

impl PerfPanel {
    pub fn new(interval: Duration, timers: SharedTimers) -> Self {
        Self { interval, timers, sampler: None }
    }

    /// Show or hide the panel. Returns the new visibility.
    pub fn toggle(&mut self) -> bool {
        if self.sampler.take().is_none() {
            self.sampler = Some(self.timers.schedule(self.interval));
        }
        debug!("Perf panel visible: {}", self.is_visible());
        self.is_visible()
    }

    /// Route a fired timer. Returns true when a sample is due.
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if !self.sampler.as_ref().is_some_and(|h| h.owns(id)) {
            return false;
        }
        self.sampler = Some(self.timers.schedule(self.interval));
        true
    }

    pub fn is_visible(&self) -> bool {
        self.sampler.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn meter_counts_last_second() {
        let mut meter = FrameMeter::new();
        for i in 0..120 {
            meter.record(ms(i * 16));
        }
        // frames at 0..=1904ms; window is (904, 1904]
        assert_eq!(meter.fps(ms(1904)), 63);
        assert!((meter.mean_frame_ms().unwrap() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn meter_drains_when_idle() {
        let mut meter = FrameMeter::new();
        meter.record(ms(0));
        meter.record(ms(10));
        assert_eq!(meter.fps(ms(500)), 2);
        assert_eq!(meter.fps(ms(2000)), 0);
        assert_eq!(meter.mean_frame_ms(), None);
    }

    #[test]
    fn single_frame_has_no_interval() {
        let mut meter = FrameMeter::new();
        meter.record(ms(5));
        assert_eq!(meter.mean_frame_ms(), None);
    }

    #[test]
    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    fn resident_memory_is_reported() {
        let mb = resident_mb().expect("own process is visible");
        // a running test binary holds at least a few hundred KiB
        assert!(mb > 0.1 && mb < 65_536.0, "implausible RSS: {mb} MB");
    }

    #[test]
    fn panel_samples_only_while_visible() {
        let clock = ManualClock::shared();
        let mut panel = PerfPanel::new(ms(1000), clock.clone());
        assert!(clock.advance_collect(ms(5000)).is_empty());

        assert!(panel.toggle());
        let mut samples = 0;
        clock.advance(ms(3000), |id| {
            if panel.on_timer(id) {
                samples += 1;
            }
        });
        assert_eq!(samples, 3);

        assert!(!panel.toggle());
        assert_eq!(clock.pending(), 0);
        assert!(clock.advance_collect(ms(5000)).is_empty());
    }
}
