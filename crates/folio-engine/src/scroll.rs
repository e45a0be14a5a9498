//! Scroll position → page progress and navbar style

use serde::{Deserialize, Serialize};

/// A snapshot of the scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top.
    pub offset: f64,
    /// Total height of the content.
    pub content_height: f64,
    /// Height of the visible area.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, content_height: f64, viewport_height: f64) -> Self {
        Self { offset, content_height, viewport_height }
    }

    /// How far through the page we are, in `[0, 1]`. Zero when the content
    /// fits in the viewport.
    pub fn progress(&self) -> f64 {
        let range = self.content_height - self.viewport_height;
        if range > 0.0 {
            (self.offset / range).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Largest meaningful offset.
    pub fn max_offset(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }

    /// Scroll by `delta`, keeping the offset within the page.
    pub fn scrolled_by(&self, delta: f64) -> Self {
        Self {
            offset: (self.offset + delta).clamp(0.0, self.max_offset()),
            ..*self
        }
    }
}

/// Navbar switches to its condensed style strictly past `threshold`.
pub fn navbar_condensed(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_fraction_of_scrollable_range() {
        let m = ScrollMetrics::new(250.0, 1100.0, 100.0);
        assert_eq!(m.progress(), 0.25);
    }

    #[test]
    fn progress_zero_when_not_scrollable() {
        assert_eq!(ScrollMetrics::new(10.0, 80.0, 100.0).progress(), 0.0);
        assert_eq!(ScrollMetrics::new(0.0, 100.0, 100.0).progress(), 0.0);
    }

    #[test]
    fn progress_clamps_overscroll() {
        assert_eq!(ScrollMetrics::new(5000.0, 1100.0, 100.0).progress(), 1.0);
        assert_eq!(ScrollMetrics::new(-20.0, 1100.0, 100.0).progress(), 0.0);
    }

    #[test]
    fn scrolled_by_stays_in_bounds() {
        let m = ScrollMetrics::new(0.0, 300.0, 100.0);
        assert_eq!(m.scrolled_by(-5.0).offset, 0.0);
        assert_eq!(m.scrolled_by(150.0).offset, 150.0);
        assert_eq!(m.scrolled_by(500.0).offset, 200.0);
    }

    #[test]
    fn navbar_threshold_is_strict() {
        assert!(!navbar_condensed(50.0, 50.0));
        assert!(navbar_condensed(50.5, 50.0));
        assert!(!navbar_condensed(0.0, 50.0));
    }
}
