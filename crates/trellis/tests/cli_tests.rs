use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_version_compare() {
    Command::cargo_bin("trellis")
        .unwrap()
        .args(["version", "compare", "1.2.3", "1.10.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.3 < 1.10.0"));
}

#[test]
fn test_version_matches() {
    Command::cargo_bin("trellis")
        .unwrap()
        .args(["version", "matches", "1.4.2", "^1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("matches"));

    Command::cargo_bin("trellis")
        .unwrap()
        .args(["version", "matches", "2.0.0", "^1.0.0"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not match"));
}

#[test]
fn test_compare_rejects_malformed_version() {
    Command::cargo_bin("trellis")
        .unwrap()
        .args(["version", "compare", "1.2", "1.0.0"])
        .assert()
        .failure();
}

#[test]
fn test_demo_runs_to_completion() {
    Command::cargo_bin("trellis")
        .unwrap()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::contains("'crm-sync' is now UNINSTALLED"));
}
