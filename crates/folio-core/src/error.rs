//! Error types for Folio

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("empty sequence: {what} needs at least one entry")]
    EmptySequence { what: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid key token: {0:?}")]
    InvalidToken(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn empty_sequence(what: &'static str) -> Self {
        Self::EmptySequence { what }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
