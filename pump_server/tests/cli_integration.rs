use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn help_describes_the_server() {
    Command::cargo_bin("pump_server")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Glucose pump controller"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--log-level"));
}

#[test]
fn malformed_config_fails_fast() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "this is { not toml").unwrap();

    Command::cargo_bin("pump_server")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsing config"));
}

#[test]
fn invalid_config_values_fail_validation() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[injection]\ntick_ms = 0\n").unwrap();

    Command::cargo_bin("pump_server")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("validating config"));
}
