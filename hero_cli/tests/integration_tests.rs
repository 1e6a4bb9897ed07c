//! Integration tests for the hero binary.
//!
//! These tests verify end-to-end behavior including:
//! - Planning with location, intensity and seed options
//! - Catalog loading failures
//! - Running a headless session without waiting

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CATALOG: &str = r#"
categories:
  cardio:
    - name: jumping_jacks
      location: indoor
      max_reps: 2
      duration_sec:
        easy: [20, 30]
        medium: [30, 45]
        heroic: [45, 60]
    - name: hill_sprint
      location: outdoor
      max_reps: 2
      duration_sec:
        easy: [10, 15]
        medium: [15, 20]
        heroic: [20, 30]
  strength:
    - name: push_ups
      location: indoor
      props: [mat]
      variants: [wide, diamond]
    - name: bench_dips
      location: outdoor
      props: [bench]
"#;

/// Helper to create a test directory with a config that keeps music local
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let music_dir = temp_dir.path().join("music");
    let config = format!("[music]\ndir = '{}'\n", music_dir.display());
    fs::write(temp_dir.path().join("config.toml"), config).expect("Failed to write config");
    temp_dir
}

fn write_catalog(dir: &Path) -> PathBuf {
    let path = dir.join("heroic_exercises.yaml");
    fs::write(&path, CATALOG).expect("Failed to write catalog");
    path
}

/// Helper to get the CLI binary with the test config applied
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hero"));
    cmd.arg("--config").arg(dir.join("config.toml"));
    cmd
}

fn plan_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("plan --json should print JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chaos exercise planner"));
}

#[test]
fn test_plan_json_from_builtin_catalog() {
    let temp_dir = setup_test_dir();

    let value = plan_json(
        cli(temp_dir.path())
            .arg("plan")
            .arg("-n")
            .arg("6")
            .arg("--seed")
            .arg("7")
            .arg("--json"),
    );

    let exercises = value["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 6);
    for exercise in exercises {
        let location = exercise["location"].as_str().unwrap();
        assert!(location == "indoor" || location == "outdoor");
    }

    // Mixed plans put indoor first
    let locations: Vec<&str> = exercises
        .iter()
        .map(|e| e["location"].as_str().unwrap())
        .collect();
    let mut sorted = locations.clone();
    sorted.sort();
    assert_eq!(locations, sorted);
}

#[test]
fn test_logs_stay_off_json_stdout() {
    let temp_dir = setup_test_dir();

    let output = cli(temp_dir.path())
        .env("RUST_LOG", "info")
        .arg("plan")
        .arg("-n")
        .arg("2")
        .arg("--json")
        .assert()
        .success()
        .stderr(predicate::str::contains("num_exercises: 2"))
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["exercises"].as_array().unwrap().len(), 2);
}

#[test]
fn test_plan_respects_location_filter() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path());

    let value = plan_json(
        cli(temp_dir.path())
            .arg("--catalog")
            .arg(&catalog)
            .arg("plan")
            .arg("--location")
            .arg("indoor")
            .arg("--json"),
    );

    let exercises = value["exercises"].as_array().unwrap();
    // jumping_jacks x2 and push_ups x1
    assert_eq!(exercises.len(), 3);
    assert!(exercises.iter().all(|e| e["location"] == "indoor"));
    assert_eq!(value["props"]["indoor"], serde_json::json!(["mat"]));
    assert!(value["props"].get("outdoor").is_none());
}

#[test]
fn test_plan_assigns_duration_for_intensity() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path());

    let value = plan_json(
        cli(temp_dir.path())
            .arg("--catalog")
            .arg(&catalog)
            .arg("plan")
            .arg("-l")
            .arg("outdoor")
            .arg("-i")
            .arg("heroic")
            .arg("--json"),
    );

    for exercise in value["exercises"].as_array().unwrap() {
        if exercise["name"] == "hill_sprint" {
            let duration = exercise["assigned_duration"].as_u64().unwrap();
            assert!((20..=30).contains(&duration));
        } else {
            assert!(exercise["assigned_duration"].is_null());
        }
    }
}

#[test]
fn test_same_seed_same_plan() {
    let temp_dir = setup_test_dir();

    let run = || {
        cli(temp_dir.path())
            .arg("plan")
            .arg("--seed")
            .arg("1234")
            .arg("--json")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_missing_catalog_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("--catalog")
        .arg(temp_dir.path().join("nonexistent.yaml"))
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Load"));
}

#[test]
fn test_no_eligible_exercises_fails() {
    let temp_dir = setup_test_dir();
    let catalog = temp_dir.path().join("outdoor_only.yaml");
    fs::write(
        &catalog,
        "categories:\n  cardio:\n    - name: hill_sprint\n      location: outdoor\n",
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("--catalog")
        .arg(&catalog)
        .arg("plan")
        .arg("--location")
        .arg("indoor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("NoEligibleExercises"));
}

#[test]
fn test_invalid_location_rejected() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("plan")
        .arg("--location")
        .arg("underwater")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown location"));
}

#[test]
fn test_catalog_command_lists_categories() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path());

    cli(temp_dir.path())
        .arg("--catalog")
        .arg(&catalog)
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("cardio (2 exercises)"))
        .stdout(predicate::str::contains("push_ups [indoor] max reps 1, props: mat"));
}

#[test]
fn test_headless_instant_session_completes() {
    let temp_dir = setup_test_dir();
    let catalog = write_catalog(temp_dir.path());

    cli(temp_dir.path())
        .arg("--catalog")
        .arg(&catalog)
        .arg("run")
        .arg("--headless")
        .arg("--instant")
        .arg("-n")
        .arg("3")
        .arg("--seed")
        .arg("3")
        .assert()
        .success()
        .stdout(predicate::str::contains("Prepare Your Props!"))
        .stdout(predicate::str::contains("GO!").not())
        .stdout(predicate::str::contains("Go!"))
        .stdout(predicate::str::contains("Routine Completed!"))
        .stdout(predicate::str::contains("Session complete: 3 exercises"));
}
