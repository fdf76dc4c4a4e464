use predicates::str::{contains, diff};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};

fn write_temp_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be available")
        .as_nanos();
    path.push(format!("clinic-config-{}.{}", nanos, extension));
    fs::write(&path, contents).expect("config write should succeed");
    path
}

#[test]
fn config_file_toml_summary_runs() {
    let config = r#"
horizon = 0.0
seed = 42
call_policy = "reject-when-desk-busy"
coverage_timing = "service-start"
initial_desk_backlog = 3
"#;
    let path = write_temp_config(config, "toml");

    let expected = concat!(
        "Metadata:\n",
        "seed: 42\n",
        "horizon: 0\n",
        "call_policy: reject-when-desk-busy\n",
        "coverage_timing: service-start\n",
        "events: 0\n",
        "final_clock: 0.000\n",
        "Summary:\n",
        "lost_calls: 0\n",
        "average_wait: 0.000\n",
        "waits: 1 (total 0.000)\n",
    );
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("clinic-sim");
    cmd.args([
        "run",
        "--config",
        path.to_str().unwrap(),
        "--format",
        "summary",
    ]);
    cmd.assert().success().stdout(diff(expected));
}

#[test]
fn config_file_json_runs() {
    let config = r#"{ "horizon": 0.0, "initial_desk_backlog": 0, "seed": 5 }"#;
    let path = write_temp_config(config, "json");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("clinic-sim");
    cmd.args(["--config", path.to_str().unwrap(), "--format", "summary"]);
    cmd.assert()
        .success()
        .stdout(contains("seed: 5\n"))
        .stdout(contains("waits: 0 (total 0.000)\n"));
}

#[test]
fn flags_override_config_file() {
    let config = "horizon = 100.0\nseed = 1\n";
    let path = write_temp_config(config, "toml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("clinic-sim");
    cmd.args([
        "--config",
        path.to_str().unwrap(),
        "--horizon",
        "0",
        "--format",
        "summary",
    ]);
    cmd.assert()
        .success()
        .stdout(contains("seed: 1\nhorizon: 0\n"));
}

#[test]
fn invalid_values_in_file_are_rejected() {
    let path = write_temp_config("notice_duration = -0.5\n", "toml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("clinic-sim");
    cmd.args(["--config", path.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: notice_duration must be > 0 (got -0.5)"));
}

#[test]
fn unsupported_extension_is_rejected() {
    let path = write_temp_config("horizon: 10", "yaml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("clinic-sim");
    cmd.args(["--config", path.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stderr(contains("Error: unsupported config format 'yaml'"));
}
