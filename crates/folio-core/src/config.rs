//! Folio configuration
//!
//! All tunable timings and thresholds in one place. Loaded from TOML at
//! startup, falls back to defaults if no config file exists.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::{konami_code, KeyToken, RevealStep};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Intro letter reveal.
    pub intro: IntroConfig,
    /// Key-sequence easter egg.
    pub easter_egg: EasterEggConfig,
    /// Dynamic favicon.
    pub favicon: FaviconConfig,
    /// Navigation bar.
    pub navbar: NavbarConfig,
    /// Background particle field.
    pub particles: ParticleConfig,
    /// Performance overlay.
    pub perf: PerfConfig,
    /// Contact form validation.
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Steps revealed in order. Each delay is the wait after that step is shown.
    pub steps: Vec<RevealStep>,
    /// Pause after the last step before the intro reports completion.
    pub terminal_delay_ms: u64,
    /// Hard cap on intro duration; the intro is dismissed when this elapses.
    pub failsafe_ms: u64,
    /// Caption shown under the letters once the last one is visible.
    pub subtitle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EasterEggConfig {
    /// Key codes that unlock the easter egg, in order.
    pub sequence: Vec<KeyToken>,
    /// How long the unlocked overlay stays up.
    pub unlock_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconConfig {
    /// Glyph drawn on the icon.
    pub glyph: char,
    /// Interval between pulse frames.
    pub pulse_interval_ms: u64,
    /// Pulse level added per frame; the pulse ends once the level exceeds 1.0.
    pub pulse_step: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavbarConfig {
    /// Scroll offset (rows) past which the navbar switches to its condensed style.
    pub condensed_after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Fixed RNG seed. `None` seeds from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfConfig {
    /// Sampling interval while the panel is visible.
    pub sample_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub min_name_chars: usize,
    pub min_message_chars: usize,
}

// ============================================================
// Defaults
// ============================================================

impl Default for IntroConfig {
    fn default() -> Self {
        let steps = ["Р", "О", "Т", "М", "А", "Н"]
            .iter()
            .enumerate()
            .map(|(i, label)| RevealStep::new(*label, Duration::from_millis(i as u64 * 100)))
            .collect();
        Self {
            steps,
            terminal_delay_ms: 1_000,
            failsafe_ms: 4_000,
            subtitle: "Frontend Developer".into(),
        }
    }
}

impl Default for EasterEggConfig {
    fn default() -> Self {
        Self { sequence: konami_code(), unlock_ms: 10_000 }
    }
}

impl Default for FaviconConfig {
    fn default() -> Self {
        Self { glyph: 'Р', pulse_interval_ms: 50, pulse_step: 0.2 }
    }
}

impl Default for NavbarConfig {
    fn default() -> Self {
        Self { condensed_after: 50.0 }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self { count: 100, seed: None }
    }
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self { sample_interval_ms: 1_000 }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self { min_name_chars: 2, min_message_chars: 10 }
    }
}

// ============================================================
// Loading
// ============================================================

impl FolioConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject configurations the runtime cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.intro.steps.is_empty() {
            return Err(Error::empty_sequence("intro.steps"));
        }
        if self.easter_egg.sequence.is_empty() {
            return Err(Error::empty_sequence("easter_egg.sequence"));
        }
        if self.favicon.pulse_step.is_nan() || self.favicon.pulse_step <= 0.0 {
            return Err(Error::invalid_config("favicon.pulse_step must be positive"));
        }
        if self.favicon.pulse_interval_ms == 0 {
            return Err(Error::invalid_config("favicon.pulse_interval_ms must be non-zero"));
        }
        if self.perf.sample_interval_ms == 0 {
            return Err(Error::invalid_config("perf.sample_interval_ms must be non-zero"));
        }
        if self.particles.count == 0 {
            return Err(Error::invalid_config("particles.count must be non-zero"));
        }
        Ok(())
    }
}

impl IntroConfig {
    pub fn terminal_delay(&self) -> Duration {
        Duration::from_millis(self.terminal_delay_ms)
    }

    pub fn failsafe(&self) -> Duration {
        Duration::from_millis(self.failsafe_ms)
    }
}

impl EasterEggConfig {
    pub fn unlock_duration(&self) -> Duration {
        Duration::from_millis(self.unlock_ms)
    }
}

impl FaviconConfig {
    pub fn pulse_interval(&self) -> Duration {
        Duration::from_millis(self.pulse_interval_ms)
    }
}

impl PerfConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}
