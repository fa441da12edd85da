use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CLASSIC: &str = "max 3 2\n2 1 <= 18\n2 3 <= 42\n3 1 <= 24\nvar 1 2 >= 0\n";

fn twophase() -> Command {
    Command::cargo_bin("twophase").unwrap()
}

fn write_problem(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).unwrap();
    path
}

#[test]
fn solve_prints_optimum() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "classic.txt", CLASSIC);

    twophase()
        .arg("solve")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("x1 = 3.000000"))
        .stdout(predicate::str::contains("x2 = 12.000000"))
        .stdout(predicate::str::contains("Objective value (max): 33.000000"));
}

#[test]
fn solve_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "classic.txt", CLASSIC);

    let output = twophase()
        .args(["solve", "--format", "json"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["direction"], "max");
    assert_eq!(report["variables"][1]["name"], "x2");
    let objective = report["objective_value"].as_f64().unwrap();
    assert!((objective - 33.0).abs() < 1e-6);
}

#[test]
fn solve_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "classic.txt", CLASSIC);

    twophase()
        .args(["solve", "--format", "yaml"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'yaml'"));
}

#[test]
fn solve_rejects_out_of_range_number() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "huge.txt", "max 1\n1 <= 1e999\nvar 1 >= 0\n");

    twophase()
        .arg("solve")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid number '1e999' at line 2, column 6"));
}

#[test]
fn solve_writes_log_file() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "classic.txt", CLASSIC);
    let log = dir.path().join("classic_solution.txt");

    twophase()
        .arg("solve")
        .arg(&path)
        .arg("--log")
        .arg(&log)
        .assert()
        .success()
        .stderr(predicate::str::contains("Solution log written to"));

    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("=== Canonical form ==="));
    assert!(text.contains("=== Auxiliary problem ==="));
    assert!(text.contains("Objective value (max): 33.000000"));
}

#[test]
fn solve_reports_infeasible() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "bad.txt", "min 1\n1 <= 1\n1 >= 5\nvar 1 >= 0\n");

    twophase()
        .arg("solve")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("problem has no feasible solution"));
}

#[test]
fn solve_reports_unbounded() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "open.txt", "max 1\nvar 1 >= 0\n");

    twophase()
        .arg("solve")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("objective is unbounded"));
}

#[test]
fn solve_honours_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "classic.txt", CLASSIC);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"max_iterations": 1}"#).unwrap();

    twophase()
        .arg("solve")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("phase 1 did not converge within 1 iterations"));
}

#[test]
fn check_shows_canonical_form() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "free.txt", "min 1 1\n1 1 >= -3\n1 -1 = 1\nvar x2 >= 0\n");

    twophase()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 free variables"))
        .stdout(predicate::str::contains("-1.00*x1+"));
}

#[test]
fn parse_errors_fail() {
    let dir = TempDir::new().unwrap();
    let path = write_problem(&dir, "broken.txt", "max 1 2\n1 2 18\n");

    twophase()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parse error"));
}
