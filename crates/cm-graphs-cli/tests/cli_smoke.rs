use assert_cmd::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(name: &str) -> PathBuf {
    let path = repo_root().join("fixtures").join(name);
    assert!(path.exists(), "fixture missing: {}", path.display());
    path
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn cli_lays_out_a_fixture() {
    let exe = assert_cmd::cargo_bin!("cm-graphs");
    let output = Command::new(exe)
        .args(["layout", fixture("tree.json").to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let layout = json_stdout(&output);
    assert_eq!(layout["type"], "tree");
    let ids: Vec<&str> = layout["nodes"]
        .as_array()
        .expect("nodes")
        .iter()
        .filter_map(|n| n["id"].as_str())
        .collect();
    assert_eq!(ids, ["root", "eng", "web", "infra", "ops"]);
    assert!(layout["viewport"]["fit"]["scale"].is_number());
}

#[test]
fn cli_reads_stdin_and_pretty_prints() {
    let text = fs::read_to_string(fixture("pie.json")).expect("read fixture");
    let exe = assert_cmd::cargo_bin!("cm-graphs");
    let assert = assert_cmd::Command::new(exe)
        .args(["--pretty", "-"])
        .write_stdin(text)
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("\n  \"type\": \"donut\""), "{stdout}");

    let layout: Value = serde_json::from_str(&stdout).expect("stdout is JSON");
    assert_eq!(layout["pie"]["slices"].as_array().map(Vec::len), Some(4));
    assert_eq!(layout["legend"]["entries"].as_array().map(Vec::len), Some(4));
}

#[test]
fn cli_prints_the_merged_configuration() {
    let exe = assert_cmd::cargo_bin!("cm-graphs");
    let output = Command::new(exe)
        .args(["config", fixture("histogram.json").to_string_lossy().as_ref()])
        .output()
        .expect("run");
    assert!(output.status.success());

    let config = json_stdout(&output);
    assert_eq!(config["type"], "histogram");
    assert_eq!(config["groupedType"], "stacked");
    assert_eq!(config["maxDisplayedNumber"], 4);
    assert_eq!(config["groups"][1]["label"], "Group-2");
    assert_eq!(config["legend"]["position"], "right");
}

#[test]
fn cli_lays_out_every_fixture() {
    for name in ["pie.json", "tree.json", "flow.json", "histogram.json"] {
        let exe = assert_cmd::cargo_bin!("cm-graphs");
        Command::new(exe)
            .arg(fixture(name))
            .assert()
            .success();
    }
}

#[test]
fn cli_reports_bad_requests_with_exit_code_1() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let request = tmp.path().join("bad.json");
    fs::write(
        &request,
        r#"{"config": {"type": "pie"}, "data": [{"label": "a"}], "width": 100, "height": 100}"#,
    )
    .expect("write request");

    let exe = assert_cmd::cargo_bin!("cm-graphs");
    let output = Command::new(exe).arg(&request).output().expect("run");
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("data[0]"), "{stderr}");

    let missing = tmp.path().join("missing.json");
    let exe = assert_cmd::cargo_bin!("cm-graphs");
    let output = Command::new(exe).arg(&missing).output().expect("run");
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn cli_usage_errors_exit_with_code_2() {
    let exe = assert_cmd::cargo_bin!("cm-graphs");
    let output = Command::new(exe).arg("--bogus").output().expect("run");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("USAGE"));
}
