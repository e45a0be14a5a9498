//! Dynamic favicon
//!
//! The icon is a two-stop gradient whose hues track scroll progress. Any
//! interaction plays a short pulse: the gradient sweeps from 0 to 1 in fixed
//! steps, then snaps back to the scroll-derived frame.

use serde::Serialize;
use std::time::Duration;

use crate::timer::{SharedTimers, TimerHandle, TimerId};

const SATURATION: f64 = 0.70;
const LIGHTNESS: f64 = 0.60;

/// One rendered state of the icon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaviconFrame {
    pub glyph: char,
    /// Gradient start hue in degrees.
    pub start_hue: f64,
    /// Gradient end hue in degrees.
    pub end_hue: f64,
}

impl FaviconFrame {
    /// Frame for a progress value in `[0, 1]`.
    pub fn at(progress: f64, glyph: char) -> Self {
        let p = progress.clamp(0.0, 1.0);
        Self {
            glyph,
            start_hue: 280.0 + p * 80.0,
            end_hue: 320.0 + p * 40.0,
        }
    }

    pub fn start_rgb(&self) -> (u8, u8, u8) {
        hsl_to_rgb(self.start_hue, SATURATION, LIGHTNESS)
    }

    pub fn end_rgb(&self) -> (u8, u8, u8) {
        hsl_to_rgb(self.end_hue, SATURATION, LIGHTNESS)
    }
}

/// HSL to 8-bit RGB. Hue in degrees (any range), saturation and lightness in `[0, 1]`.
pub fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}

struct Pulse {
    tick: u32,
    timer: TimerHandle,
}

pub struct FaviconAnimator {
    glyph: char,
    scroll_progress: f64,
    interval: Duration,
    step: f64,
    timers: SharedTimers,
    pulse: Option<Pulse>,
}

impl FaviconAnimator {
    pub fn new(glyph: char, interval: Duration, step: f64, timers: SharedTimers) -> Self {
        Self {
            glyph,
            scroll_progress: 0.0,
            interval,
            step,
            timers,
            pulse: None,
        }
    }

    /// The frame the icon should show right now.
    pub fn current(&self) -> FaviconFrame {
        match &self.pulse {
            Some(pulse) if pulse.tick > 0 => {
                FaviconFrame::at(self.level(pulse.tick), self.glyph)
            }
            _ => FaviconFrame::at(self.scroll_progress, self.glyph),
        }
    }

    /// Record new scroll progress. Returns a frame to draw unless a pulse is
    /// playing, in which case the pulse owns the icon until it ends.
    pub fn on_scroll(&mut self, progress: f64) -> Option<FaviconFrame> {
        self.scroll_progress = progress.clamp(0.0, 1.0);
        if self.is_pulsing() {
            None
        } else {
            Some(self.current())
        }
    }

    /// Start (or restart) the pulse.
    pub fn on_interaction(&mut self) {
        self.pulse = Some(Pulse {
            tick: 0,
            timer: self.timers.schedule(self.interval),
        });
    }

    /// Route a fired timer. Returns the new frame if it advanced the pulse.
    pub fn on_timer(&mut self, id: TimerId) -> Option<FaviconFrame> {
        let pulse = self.pulse.as_mut().filter(|p| p.timer.owns(id))?;
        pulse.tick += 1;
        let tick = pulse.tick;

        if self.level(tick) > 1.0 {
            self.pulse = None;
            return Some(self.current());
        }

        let timer = self.timers.schedule(self.interval);
        if let Some(pulse) = self.pulse.as_mut() {
            pulse.timer = timer;
        }
        Some(FaviconFrame::at(self.level(tick), self.glyph))
    }

    pub fn is_pulsing(&self) -> bool {
        self.pulse.is_some()
    }

    fn level(&self, tick: u32) -> f64 {
        tick as f64 * self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_hues_follow_progress() {
        let start = FaviconFrame::at(0.0, 'R');
        assert_eq!((start.start_hue, start.end_hue), (280.0, 320.0));
        let end = FaviconFrame::at(1.0, 'R');
        assert_eq!((end.start_hue, end.end_hue), (360.0, 360.0));
        let mid = FaviconFrame::at(0.5, 'R');
        assert_eq!((mid.start_hue, mid.end_hue), (320.0, 340.0));
    }

    #[test]
    fn frame_clamps_progress() {
        assert_eq!(FaviconFrame::at(2.0, 'R'), FaviconFrame::at(1.0, 'R'));
        assert_eq!(FaviconFrame::at(-1.0, 'R'), FaviconFrame::at(0.0, 'R'));
    }

    #[test]
    fn hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.5), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 1.0, 0.5), (0, 0, 255));
        assert_eq!(hsl_to_rgb(360.0, 1.0, 0.5), (255, 0, 0));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 1.0), (255, 255, 255));
    }

    #[test]
    fn purple_start_stop() {
        let (r, g, b) = FaviconFrame::at(0.0, 'R').start_rgb();
        assert!(r > g && b > g, "expected a purple, got {:?}", (r, g, b));
    }
}
