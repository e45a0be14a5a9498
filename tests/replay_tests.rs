//! End-to-end tests for the folio binary's commands: config loading and scripted replay

use folio::commands::{load_config, replay_file, replay_lines};
use folio_core::FolioConfig;
use serde_json::Value;
use std::io::Write;
use std::time::Duration;

fn events(lines: &[String]) -> Vec<Value> {
    lines
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn of_type<'a>(events: &'a [Value], kind: &str) -> Vec<&'a Value> {
    events
        .iter()
        .filter(|e| e["event"]["type"] == kind)
        .collect()
}

const KONAMI: &str = r#"["ArrowUp","ArrowUp","ArrowDown","ArrowDown","ArrowLeft","ArrowRight","ArrowLeft","ArrowRight","KeyB","KeyA"]"#;

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn missing_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.easter_egg.unlock_ms, 10_000);
    assert_eq!(config.intro.steps.len(), 6);
}

#[test]
fn config_file_overrides_timings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[easter_egg]\nunlock_ms = 2000\n\n[intro]\nfailsafe_ms = 500").unwrap();
    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.easter_egg.unlock_ms, 2_000);
    assert_eq!(config.intro.failsafe_ms, 500);
    assert_eq!(config.favicon.pulse_interval_ms, 50);
}

#[test]
fn unusable_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[perf]\nsample_interval_ms = 0").unwrap();
    let err = load_config(Some(file.path())).unwrap_err();
    assert!(format!("{:#}", err).contains("sample_interval_ms"));
}

// ===========================================================================
// Replay
// ===========================================================================

#[test]
fn replay_konami_then_relock() {
    let script = format!(r#"[{{"at_ms": 3000, "type": "keys", "codes": {}}}]"#, KONAMI);
    let lines = replay_lines(FolioConfig::default(), &script, Duration::from_secs(15)).unwrap();
    let all = events(&lines);

    let unlocked = of_type(&all, "unlocked");
    let relocked = of_type(&all, "relocked");
    assert_eq!(unlocked.len(), 1);
    assert_eq!(relocked.len(), 1);
    assert_eq!(unlocked[0]["at_ms"], 3000);
    assert_eq!(relocked[0]["at_ms"], 13000);
}

#[test]
fn replay_dismiss_cancels_relock() {
    let script = format!(
        r#"[
            {{"at_ms": 3000, "type": "keys", "codes": {}}},
            {{"at_ms": 4000, "type": "dismiss"}}
        ]"#,
        KONAMI
    );
    let lines = replay_lines(FolioConfig::default(), &script, Duration::from_secs(20)).unwrap();
    let relocked = of_type(&events(&lines), "relocked")
        .iter()
        .map(|e| e["at_ms"].as_u64().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(relocked, vec![4000]);
}

#[test]
fn replay_failsafe_with_slow_intro() {
    let mut config = FolioConfig::default();
    config.intro.terminal_delay_ms = 10_000;
    let lines = replay_lines(config, "[]", Duration::from_secs(20)).unwrap();
    let all = events(&lines);

    let dismissed = of_type(&all, "intro_dismissed");
    assert_eq!(dismissed.len(), 1);
    assert_eq!(dismissed[0]["at_ms"], 4000);
    assert_eq!(dismissed[0]["event"]["reason"], "failsafe");
    assert!(of_type(&all, "intro_complete").is_empty());
}

#[test]
fn replay_scroll_and_perf() {
    let script = r#"[
        {"at_ms": 3000, "type": "frames", "count": 10, "every_ms": 16},
        {"at_ms": 3200, "type": "scroll", "offset": 60, "content_height": 400, "viewport_height": 40},
        {"at_ms": 3300, "type": "toggle_perf"},
        {"at_ms": 5400, "type": "toggle_perf"}
    ]"#;
    let lines = replay_lines(FolioConfig::default(), script, Duration::from_secs(5)).unwrap();
    let all = events(&lines);

    let navbar = of_type(&all, "navbar");
    assert_eq!(navbar.len(), 1);
    assert_eq!(navbar[0]["event"]["condensed"], true);

    let samples = of_type(&all, "perf_sample");
    let at: Vec<u64> = samples.iter().map(|s| s["at_ms"].as_u64().unwrap()).collect();
    assert_eq!(at, vec![3300, 4300, 5300]);
    assert_eq!(samples[0]["event"]["interactive_after_ms"], 2500);
}

#[test]
fn replay_rejects_malformed_script() {
    let err = replay_lines(FolioConfig::default(), "{not json", Duration::ZERO).unwrap_err();
    assert!(err.to_string().contains("replay script"));
}

#[test]
fn replay_reads_script_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"[{{"at_ms": 100, "type": "skip_intro"}}]"#).unwrap();
    let lines = replay_file(FolioConfig::default(), file.path(), Duration::ZERO).unwrap();
    let dismissed = of_type(&events(&lines), "intro_dismissed")
        .iter()
        .map(|e| (e["at_ms"].as_u64().unwrap(), e["event"]["reason"].clone()))
        .collect::<Vec<_>>();
    assert_eq!(dismissed, vec![(100, Value::from("skipped"))]);
}
