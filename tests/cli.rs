use assert_cmd::Command;

fn repo_etl() -> Command {
    let mut cmd = Command::cargo_bin("repo-etl").unwrap();
    cmd.env_remove("GITHUB_TOKEN").env_remove("RUST_LOG");
    cmd
}

#[test]
fn runs() {
    repo_etl().assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = repo_etl();
    cmd.arg("-V");
    cmd.assert().success().stdout("repo-etl 0.1.0\n");
}

// Convert subcommand tests

#[test]
fn convert_prints_json() {
    let mut cmd = repo_etl();
    cmd.args(["convert", "tests/fixtures/stocks_toy.csv"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"ticker\": \"AAA\""))
        .stdout(predicates::str::contains("\"price\": \"20\""));
}

#[test]
fn convert_writes_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("stocks.json");

    let mut cmd = repo_etl();
    cmd.args(["convert", "tests/fixtures/stocks_toy.csv", "--output"])
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("2 rows, 2 columns"));

    let written = std::fs::read_to_string(&out).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&written).expect("valid json");
    assert_eq!(value.as_array().map(Vec::len), Some(2));
    assert_eq!(value[1]["ticker"], "BBB");
}

#[test]
fn convert_lenient_keeps_overflow() {
    let mut cmd = repo_etl();
    cmd.args(["convert", "tests/fixtures/ragged.csv"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"_overflow\""))
        .stdout(predicates::str::contains("\"volume\": null"))
        .stderr(predicates::str::contains("PaddedRow"));
}

#[test]
fn convert_strict_rejects_ragged_rows() {
    let mut cmd = repo_etl();
    cmd.args(["convert", "tests/fixtures/ragged.csv", "--strict"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Malformed tabular input"))
        .stderr(predicates::str::contains("line 2"));
}

#[test]
fn convert_custom_delimiter() {
    let mut cmd = repo_etl();
    cmd.args([
        "convert",
        "tests/fixtures/semicolon.csv",
        "--delimiter",
        ";",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"price\": \"10\""));
}

#[test]
fn convert_nonexistent_file_fails() {
    let mut cmd = repo_etl();
    cmd.args(["convert", "nonexistent_file.csv"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("IO error"));
}

// Run subcommand tests

#[test]
fn run_without_token_fails() {
    let mut cmd = repo_etl();
    cmd.args(["run", "--config", "tests/fixtures/pipeline.yaml"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("GITHUB_TOKEN"));
}

#[test]
fn run_rejects_bad_source_reference() {
    let mut cmd = repo_etl();
    cmd.args([
        "run",
        "--source",
        "just-a-repo",
        "--dest",
        "o/r/out.json",
        "--token",
        "ghp_test",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Invalid file reference 'just-a-repo'"));
}

#[test]
fn run_rejects_unknown_config_keys() {
    let mut cmd = repo_etl();
    cmd.args(["run", "--config", "tests/fixtures/bad_config.yaml"])
        .env("GITHUB_TOKEN", "ghp_test");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Failed to parse config"));
}

#[test]
fn run_reports_extract_stage_on_connection_failure() {
    let mut cmd = repo_etl();
    cmd.args(["run", "--config", "tests/fixtures/pipeline.yaml"])
        .env("GITHUB_TOKEN", "ghp_test");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("extract stage failed"))
        .stderr(predicates::str::contains(
            "/repos/Shazizan/data/contents/stocks_toy.csv",
        ));
}

#[test]
fn run_accepts_negated_switches() {
    let mut cmd = repo_etl();
    cmd.args([
        "run",
        "--config",
        "tests/fixtures/pipeline.yaml",
        "--strict",
        "--no-strict",
        "--no-timestamp",
    ])
    .env("GITHUB_TOKEN", "ghp_test");
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("extract stage failed"));
}
