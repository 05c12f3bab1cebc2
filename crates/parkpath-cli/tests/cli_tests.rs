//! Integration tests for the `parkpath` binary.
//!
//! Each test writes a facility map into a temporary directory and runs the
//! binary against it with `assert_cmd`.

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

/// Two-level garage: ramp at (2, 2), exit at (1, 9, 0), free slots A-02
/// downstairs and B-01 upstairs.
fn garage_json() -> Value {
    json!({
        "building": "garage",
        "levels": [
            {
                "level": 1,
                "entrances": [{"x": 0, "y": 0, "type": "vehicle"}],
                "exits": [{"x": 9, "y": 0}],
                "slots": [
                    {"x": 5, "y": 3, "slot_id": "A-01", "status": "occupied"},
                    {"x": 9, "y": 3, "slot_id": "A-02", "status": "available"}
                ],
                "ramps": [{"x": 2, "y": 2, "cost": 1.5}],
                "corridors": [{"points": [[0, 0], [2, 0], [2, 2], [9, 2], [9, 0]]}]
            },
            {
                "level": 2,
                "slots": [{"x": 6, "y": 3, "slot_id": "B-01", "status": "available"}],
                "ramps": [{"x": 2, "y": 2, "cost": 1.5}],
                "corridors": [{"points": [[2, 2], [6, 2]]}]
            }
        ]
    })
}

fn write_map(value: &Value) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("map.json");
    fs::write(&path, value.to_string()).expect("write map");
    (dir, path)
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("parkpath");
    cmd.env("RUST_LOG", "error").env_remove("PARKPATH_MAP");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

#[test]
fn route_text_output() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["route", "--from", "1,0,0", "--to", "2,6,3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Route: (1, 0, 0) -> (2, 6, 3) (10.5 m",
        ))
        .stdout(predicate::str::contains("ramp"));
}

#[test]
fn route_json_output() {
    let (_dir, map) = write_map(&garage_json());
    let value = stdout_json(
        cli()
            .arg("--map")
            .arg(&map)
            .args(["--format", "json", "route", "--from", "1,0,1", "--to", "1,9,0"]),
    );

    assert_eq!(value["coordinates"][0]["y"], 1);
    assert_eq!(value["steps"][1]["via"], "ad_hoc");
    assert_eq!(value["total_distance"], 14.0);
}

#[test]
fn map_path_falls_back_to_environment() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .env("PARKPATH_MAP", &map)
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("Building garage"))
        .stdout(predicate::str::contains("Slots: 2 of 3 available"))
        .stdout(predicate::str::contains("Exits: (1, 9, 0)"));
}

#[test]
fn missing_map_is_reported() {
    cli()
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PARKPATH_MAP"));
}

#[test]
fn nearest_slot_prefers_walking_distance() {
    let (_dir, map) = write_map(&garage_json());
    let value = stdout_json(
        cli()
            .arg("--map")
            .arg(&map)
            .args(["--format", "json", "nearest-slot", "--from", "1,0,0"]),
    );

    assert_eq!(value["slot_id"], "B-01");
    assert_eq!(value["path"]["total_distance"], 10.5);
}

#[test]
fn nearest_slot_with_explicit_candidates() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["nearest-slot", "--from", "1,0,0", "--slots", "A-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nearest slot A-02 at (1, 9, 3)"));
}

#[test]
fn unknown_slot_suggests_a_match() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["nearest-slot", "--from", "1,0,0", "--slots", "A-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'A-02'?"));
}

#[test]
fn nearest_exit_rich_output() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["--format", "rich", "nearest-exit", "--from", "2,6,3"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Nearest exit at `(1, 9, 0)`"))
        .stdout(predicate::str::contains("(15.5 m"));
}

#[test]
fn negative_level_is_parsed_and_rejected_as_unreachable() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["route", "--from", "-1,0,0", "--to", "1,9,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be attached"));
}

#[test]
fn malformed_coordinate_is_a_usage_error() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["route", "--from", "1,2", "--to", "1,9,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected LEVEL,X,Y"));
}

#[test]
fn malformed_map_fails_the_build() {
    let (_dir, map) = write_map(&json!({
        "building": "broken",
        "levels": [{"level": 1, "corridors": [{"points": [[0, 0], [1]]}]}]
    }));
    cli()
        .arg("--map")
        .arg(&map)
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed map"));
}

#[test]
fn walking_speed_must_be_positive() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["--walking-speed", "0", "inspect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid --walking-speed"));
}

#[test]
fn small_attach_radius_isolates_off_corridor_slots() {
    let (_dir, map) = write_map(&garage_json());
    cli()
        .arg("--map")
        .arg(&map)
        .args(["--attach-radius", "0.5", "nearest-slot", "--from", "1,0,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no available slot reachable"));
}
