//! End-to-end runs of the `bpdb` binary against the shared fixtures.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
}

fn bpdb() -> Command {
    let mut cmd = Command::cargo_bin("bpdb").unwrap();
    cmd.env("BPDB_LOG", "warn");
    cmd
}

fn json_report(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn cleanse_writes_output_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.json");

    let assert = bpdb()
        .arg("--json")
        .arg("cleanse")
        .arg(fixture("drifted.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let report = json_report(&assert.get_output().stdout);
    assert_eq!(report["command"], "cleanse");
    assert_eq!(report["blueprints"], 3);
    assert_eq!(report["users"], 5);
    assert_eq!(report["tags"], 2);
    assert_eq!(report["total_anomalies"], 12);
    assert_eq!(report["anomalies"]["summary_missing"], 1);
    assert_eq!(report["census"]["privates_derived"], 2);

    let written = fs::read(&out).unwrap();
    assert!(written.ends_with(b"\n"));
    assert_eq!(report["output_sha256"].as_str().map(str::len), Some(64));
}

#[test]
fn second_cleanse_is_clean_and_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");

    bpdb()
        .args(["cleanse", "--out"])
        .arg(&first)
        .arg(fixture("drifted.json"))
        .assert()
        .success();

    let assert = bpdb()
        .arg("--json")
        .arg("cleanse")
        .arg(&first)
        .arg("--out")
        .arg(&second)
        .assert()
        .success();

    let report = json_report(&assert.get_output().stdout);
    assert_eq!(report["total_anomalies"], 0);
    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn check_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("db.json");
    fs::copy(fixture("drifted.json"), &input).unwrap();

    let assert = bpdb().arg("check").arg(&input).arg("--json").assert().success();
    let report = json_report(&assert.get_output().stdout);
    assert_eq!(report["command"], "check");
    assert!(report.get("output").is_none());

    let entries = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn fatal_inconsistency_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.json");

    let assert = bpdb()
        .arg("cleanse")
        .arg(fixture("corrupted_favorite.json"))
        .arg("--out")
        .arg(&out)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("corrupted input"), "{stderr}");
    assert!(!out.exists());
}

#[test]
fn input_limit_is_enforced() {
    let assert = bpdb()
        .arg("check")
        .arg(fixture("drifted.json"))
        .args(["--max-input-bytes", "16"])
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("too large"), "{stderr}");
}

#[test]
fn fallback_date_flag_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.json");

    bpdb()
        .arg("cleanse")
        .arg(fixture("drifted.json"))
        .arg("--out")
        .arg(&out)
        .args(["--fallback-date", "2018-06-01T00:00:00Z"])
        .assert()
        .success();

    let db: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
    assert_eq!(
        db["blueprintSummaries"]["bp2"]["lastUpdatedDate"],
        "2018-06-01T00:00:00Z"
    );
}

#[test]
fn human_report_mentions_anomalies() {
    let assert = bpdb().arg("check").arg(fixture("drifted.json")).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("blueprints 3"), "{stdout}");
    assert!(stdout.contains("favorite_only_in_blueprint"), "{stdout}");
}
