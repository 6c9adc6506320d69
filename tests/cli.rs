use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const EPISODE: &str = r#"{
    "title": "Pilot",
    "duration": "0:10:00",
    "segments": [{"start": 0.0, "end": 5.0, "text": "hello"}],
    "terms": [["rust", 300.0], ["cargo", 330.0]]
}"#;

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    Ok(())
}

#[test]
fn duration_command_prints_seconds() {
    Command::cargo_bin("transcript-sync")
        .unwrap()
        .args(["duration", "1:23:45"])
        .assert()
        .success()
        .stdout("5025\n");
}

#[test]
fn duration_command_falls_back_for_zero() {
    Command::cargo_bin("transcript-sync")
        .unwrap()
        .args(["duration", "0:00"])
        .assert()
        .success()
        .stdout("3600\n");
}

#[test]
fn ticker_command_emits_chart_json() -> Result<()> {
    let temp = tempdir()?;
    let episode = temp.path().join("episode.json");
    write(&episode, EPISODE)?;

    let output = Command::cargo_bin("transcript-sync")?
        .args(["ticker", episode.to_str().unwrap(), "--scroll", "0.5"])
        .output()?;
    assert!(output.status.success());
    let chart: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let annotations = chart["annotations"].as_array().unwrap();
    assert_eq!(annotations.len(), 2);
    assert_eq!(annotations[0]["text"], "rust");
    assert_eq!(annotations[0]["x"], 60.0);
    assert_eq!(annotations[1]["y"], 1);
    assert_eq!(chart["height"], 600.0);
    Ok(())
}

#[test]
fn ticker_command_reports_no_update_without_lanes() -> Result<()> {
    let temp = tempdir()?;
    let episode = temp.path().join("episode.json");
    write(&episode, r#"{"duration": "5:00", "segments": []}"#)?;

    Command::cargo_bin("transcript-sync")?
        .args(["ticker", episode.to_str().unwrap(), "--scroll", "0.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no update"));
    Ok(())
}

#[test]
fn ticker_command_honours_config_override() -> Result<()> {
    let temp = tempdir()?;
    let episode = temp.path().join("episode.json");
    let config = temp.path().join("engine.json");
    write(&episode, EPISODE)?;
    write(&config, r#"{"window_width": 20.0, "fallback_viewport_height": 480.0}"#)?;

    let output = Command::cargo_bin("transcript-sync")?
        .args([
            "ticker",
            episode.to_str().unwrap(),
            "--scroll",
            "0.5",
            "--config",
            config.to_str().unwrap(),
        ])
        .output()?;
    assert!(output.status.success());
    let chart: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(chart["x_range"][1], 20.0);
    assert_eq!(chart["height"], 480.0);
    Ok(())
}

#[test]
fn ticker_command_rejects_bad_scroll() -> Result<()> {
    let temp = tempdir()?;
    let episode = temp.path().join("episode.json");
    write(&episode, EPISODE)?;

    Command::cargo_bin("transcript-sync")?
        .args(["ticker", episode.to_str().unwrap(), "--scroll", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Scroll fraction"));
    Ok(())
}

#[test]
fn missing_episode_fails_with_context() {
    Command::cargo_bin("transcript-sync")
        .unwrap()
        .args(["ticker", "/nonexistent/episode.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read episode file"));
}
