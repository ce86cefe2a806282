use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};

fn fairshare() -> Command {
    Command::cargo_bin("fairshare").unwrap()
}

fn write(dir: &Path, name: &str, v: &Value) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, serde_json::to_vec_pretty(v).unwrap()).unwrap();
    p
}

fn read(p: &Path) -> Value {
    serde_json::from_slice(&fs::read(p).unwrap()).unwrap()
}

fn single_store() -> Value {
    json!({"Only": {"quantity": 200, "competitors": ["A", "B", "C", "D"]}})
}

#[test]
fn run_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "stores.json", &single_store());
    let out = dir.path().join("out");

    fairshare()
        .args(["--minimum", "15", "--max-variance", "10", "--out"])
        .arg(&out)
        .arg("--input")
        .arg(&input)
        .assert()
        .success()
        .stderr(predicate::str::contains("validation: valid"));

    let alloc = read(&out.join("allocation.json"));
    assert_eq!(alloc, json!({"Only": {"quantity": 200, "competitors": {"A": 50, "B": 50, "C": 50, "D": 50}}}));

    let validation = read(&out.join("validation.json"));
    assert_eq!(validation["valid"], json!(true));
    assert_eq!(validation["statistics"]["total_products"], json!(200));

    let record = read(&out.join("run_record.json"));
    assert_eq!(record["engine"]["name"], json!("fairshare"));
    for key in ["input_sha256", "params_sha256", "allocation_sha256"] {
        assert_eq!(record[key].as_str().unwrap().len(), 64, "{key}");
    }
    assert!(!out.join("trace.json").exists());
}

#[test]
fn envelope_params_and_trace() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "stores.json",
        &json!({
            "params": {"minimumPerCompetitor": 10, "maxVariancePercent": 15},
            "stores": {
                "L1": {"quantity": 100, "competitors": ["A", "B"]},
                "L2": {"quantity": 150, "competitors": ["A", "B", "C"]}
            }
        }),
    );
    let out = dir.path().join("out");

    fairshare().arg("--input").arg(&input).arg("--out").arg(&out).args(["--trace", "--quiet"]).assert().success();

    let trace = read(&out.join("trace.json"));
    let steps = trace["steps"].as_array().unwrap();
    assert_eq!(steps.first().unwrap()["phase"], json!("initial"));
    assert_eq!(steps.last().unwrap()["phase"], json!("final"));
    assert_eq!(trace["strategy"], json!("proportional"));
}

#[test]
fn params_file_overrides_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "stores.json",
        &json!({"params": {"minimum_per_competitor": 90, "max_variance_percent": 1}, "stores": single_store()}),
    );
    let params = write(dir.path(), "params.json", &json!({"minimum_per_competitor": 15, "max_variance_percent": 10}));
    let out = dir.path().join("out");

    fairshare()
        .arg("--input")
        .arg(&input)
        .arg("--params")
        .arg(&params)
        .arg("--out")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success();
}

#[test]
fn missing_params_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "stores.json", &single_store());
    fairshare()
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "5"])
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no parameters"));
}

#[test]
fn missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    fairshare()
        .arg("--input")
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn network_paths_are_refused() {
    fairshare()
        .args(["--input", "https://example.invalid/stores.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("path must be local"));
}

#[test]
fn malformed_input_is_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.json");
    fs::write(&input, b"{ nope").unwrap();
    fairshare()
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "1", "--max-variance", "10"])
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .code(2);
}

#[test]
fn empty_store_is_refused_by_engine() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "stores.json", &json!({"S": {"quantity": 10, "competitors": []}}));
    fairshare()
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "1", "--max-variance", "10"])
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("no competitors"));
}

#[test]
fn check_accepts_own_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "stores.json", &single_store());
    let out = dir.path().join("out");
    fairshare()
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "15", "--max-variance", "10", "--quiet"])
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    fairshare()
        .arg("--check")
        .arg("--input")
        .arg(out.join("allocation.json"))
        .args(["--minimum", "15", "--max-variance", "10"])
        .arg("--out")
        .arg(dir.path().join("check"))
        .assert()
        .success()
        .stderr(predicate::str::contains("check: 1 store(s)"));
}

#[test]
fn check_reports_bad_sum() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "alloc.json", &json!({"S": {"quantity": 10, "competitors": {"A": 4, "B": 5}}}));
    let out = dir.path().join("check");
    fairshare()
        .arg("--check")
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "1", "--max-variance", "50"])
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("S: sum (9) differs from expected (10)"));

    let validation = read(&out.join("validation.json"));
    assert_eq!(validation["valid"], json!(false));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(
        dir.path(),
        "stores.json",
        &json!({
            "Store 1": {"quantity": 180, "competitors": ["A", "B", "C"]},
            "Store 2": {"quantity": 200, "competitors": ["A", "B", "C", "E"]},
            "Store 3": {"quantity": 400, "competitors": ["A", "B", "C", "D", "E"]}
        }),
    );
    let mut outputs = Vec::new();
    for run in ["a", "b"] {
        let out = dir.path().join(run);
        fairshare()
            .arg("--input")
            .arg(&input)
            .args(["--minimum", "20", "--max-variance", "15", "--quiet"])
            .arg("--out")
            .arg(&out)
            .assert()
            .success();
        outputs.push((fs::read(out.join("allocation.json")).unwrap(), fs::read(out.join("run_record.json")).unwrap()));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn verbose_flag_enables_debug_logs() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "stores.json", &single_store());
    fairshare()
        .env_remove("RUST_LOG")
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "15", "--max-variance", "10", "--quiet", "-v"])
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("input loaded"));
}

#[test]
fn rust_log_takes_precedence_over_verbose_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "stores.json", &single_store());
    fairshare()
        .env("RUST_LOG", "off")
        .arg("--input")
        .arg(&input)
        .args(["--minimum", "15", "--max-variance", "10", "--quiet", "-vv"])
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}
