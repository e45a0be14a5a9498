//! Command implementations shared by the binary and its tests

use anyhow::Context;
use folio_core::FolioConfig;
use folio_engine::{parse_script, replay};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Load the config from `path` (or `./folio.toml`), falling back to defaults
/// when the file is missing or unreadable. A config that loads but can't be
/// honored is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FolioConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = FolioConfig::load(&path);
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Replay a script and render each output event as one JSON line.
pub fn replay_lines(config: FolioConfig, script: &str, tail: Duration) -> anyhow::Result<Vec<String>> {
    let steps = parse_script(script).context("failed to parse replay script")?;
    let outputs = replay(config, steps, tail)?;
    outputs
        .iter()
        .map(|o| serde_json::to_string(o).map_err(anyhow::Error::from))
        .collect()
}

pub fn replay_file(config: FolioConfig, script: &Path, tail: Duration) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read {}", script.display()))?;
    replay_lines(config, &text, tail)
}
