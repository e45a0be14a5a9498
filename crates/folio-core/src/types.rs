//! Core types for Folio

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

/// A single key press, named by its physical key code (`ArrowUp`, `KeyB`,
/// `Digit1`, `Enter`, ...). Cheaply cloneable.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyToken(Arc<str>);

impl KeyToken {
    pub const ARROW_UP: &'static str = "ArrowUp";
    pub const ARROW_DOWN: &'static str = "ArrowDown";
    pub const ARROW_LEFT: &'static str = "ArrowLeft";
    pub const ARROW_RIGHT: &'static str = "ArrowRight";

    /// Build a token from a code, rejecting empty codes and codes with whitespace.
    pub fn parse(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        if code.is_empty() || code.chars().any(char::is_whitespace) {
            return Err(Error::InvalidToken(code));
        }
        Ok(Self(Arc::from(code)))
    }

    /// Token for a letter key. Case-insensitive: `b` and `B` are both `KeyB`.
    pub fn letter(c: char) -> Self {
        Self(Arc::from(format!("Key{}", c.to_ascii_uppercase())))
    }

    /// Token for a digit key (`Digit0`..`Digit9`).
    pub fn digit(d: u8) -> Self {
        Self(Arc::from(format!("Digit{}", d % 10)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn named(code: &'static str) -> Self {
        Self(Arc::from(code))
    }
}

impl std::fmt::Display for KeyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for KeyToken {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<KeyToken> for String {
    fn from(token: KeyToken) -> Self {
        token.0.to_string()
    }
}

/// The classic up-up-down-down-left-right-left-right-B-A sequence.
pub fn konami_code() -> Vec<KeyToken> {
    vec![
        KeyToken::named(KeyToken::ARROW_UP),
        KeyToken::named(KeyToken::ARROW_UP),
        KeyToken::named(KeyToken::ARROW_DOWN),
        KeyToken::named(KeyToken::ARROW_DOWN),
        KeyToken::named(KeyToken::ARROW_LEFT),
        KeyToken::named(KeyToken::ARROW_RIGHT),
        KeyToken::named(KeyToken::ARROW_LEFT),
        KeyToken::named(KeyToken::ARROW_RIGHT),
        KeyToken::letter('b'),
        KeyToken::letter('a'),
    ]
}

/// One unit of a phased reveal: what to show, and how long to wait after
/// showing it before the sequence moves on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealStep {
    pub label: String,
    pub delay_ms: u64,
}

impl RevealStep {
    pub fn new(label: impl Into<String>, delay: Duration) -> Self {
        Self {
            label: label.into(),
            delay_ms: delay.as_millis() as u64,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Page sections, in scroll order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    About,
    Projects,
    Skills,
    Experience,
    Contact,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Hero,
        Section::About,
        Section::Projects,
        Section::Skills,
        Section::Experience,
        Section::Contact,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Hero => "Home",
            Section::About => "About",
            Section::Projects => "Projects",
            Section::Skills => "Skills",
            Section::Experience => "Experience",
            Section::Contact => "Contact",
        }
    }
}
