use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use telemdash_core::fixtures::CaptureBuilder;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("telemdash"));
    for var in [
        "TELEMDASH_CONFIG",
        "TELEMDASH_F1_PORT",
        "TELEMDASH_PCARS_PORT",
        "TELEMDASH_FORWARDER_PORT",
        "TELEMDASH_MAX_PACKET_LEN",
        "TELEMDASH_MAX_JSON_LEN",
        "TELEMDASH_F1_STALE_AFTER_MS",
        "TELEMDASH_PCARS_STALE_AFTER_MS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Capture with one good forwarder packet and one malformed one.
fn write_capture(dir: &Path, port: u16) -> PathBuf {
    let path = dir.join("session.pcapng");
    let relay = "192.168.1.30:40000".parse().unwrap();
    let listener = format!("192.168.1.50:{port}").parse().unwrap();
    let mut capture = CaptureBuilder::new();
    capture
        .push_udp(1_000_000, relay, listener, br#"{"speed": 150.0, "gear": 4}"#)
        .push_udp(1_100_000, relay, listener, br#"{"speed": nope}"#);
    capture.write_pcapng(&path).unwrap();
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("replay").and(contains("decode")).and(contains("encode")));
}

#[test]
fn version_reports_build_info() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("telemdash"));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    cmd()
        .arg("replay")
        .arg(temp.path().join("missing.pcapng"))
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("session.txt");
    std::fs::write(&input, b"not a capture").unwrap();
    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn replay_stdout_outputs_report() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    let assert = cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .assert()
        .success();
    let report = stdout_json(assert.get_output());
    assert_eq!(report["tool"]["name"], "telemdash");
    assert_eq!(report["streams"][1]["protocol"], "pcars");
    assert_eq!(report["streams"][1]["decoded"], 1);
    assert_eq!(report["streams"][1]["rejected"], 1);
    assert_eq!(report["streams"][1]["final_snapshot"]["gear"], 4);
}

#[test]
fn replay_writes_report_file() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    let report = temp.path().join("out").join("report.json");
    cmd()
        .arg("replay")
        .arg(input)
        .arg("-o")
        .arg(&report)
        .arg("--pretty")
        .assert()
        .success()
        .stderr(contains("OK: report written"));
    let json: Value = serde_json::from_str(&std::fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(json["report_version"], 1);
}

#[test]
fn replay_resolves_single_glob_match() {
    let temp = TempDir::new().expect("tempdir");
    write_capture(temp.path(), 20778);
    let pattern = temp.path().join("*.pcapng");
    cmd()
        .arg("replay")
        .arg(pattern)
        .arg("--stdout")
        .assert()
        .success();
}

#[test]
fn report_must_not_overwrite_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    cmd()
        .arg("replay")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    cmd()
        .arg("replay")
        .arg(input)
        .arg("-o")
        .arg(temp.path().join("report.json"))
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn list_rejections_outputs_ids() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("--list-rejections")
        .assert()
        .success()
        .stderr(contains("Rejected packets:").and(contains("TD-PCARS-PARSE")));
}

#[test]
fn strict_fails_when_packets_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);
    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(contains("rejected packets detected"));
}

#[test]
fn port_flag_and_env_route_custom_listener() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 7000);

    let assert = cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .arg("--forwarder-port")
        .arg("7000")
        .assert()
        .success();
    assert_eq!(stdout_json(assert.get_output())["streams"][1]["packets"], 2);

    let assert = cmd()
        .env("TELEMDASH_FORWARDER_PORT", "7000")
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .assert()
        .success();
    assert_eq!(stdout_json(assert.get_output())["streams"][1]["packets"], 2);
}

#[test]
fn staleness_windows_come_from_flags_and_env() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 20778);

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .arg("--pcars-stale-after-ms")
        .arg("0")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("pcars_stale_after_ms"));

    cmd()
        .env("TELEMDASH_F1_STALE_AFTER_MS", "0")
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("f1_stale_after_ms"));

    let assert = cmd()
        .env("TELEMDASH_PCARS_STALE_AFTER_MS", "50")
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .assert()
        .success();
    // the last good packet is 100 ms before the capture ends
    assert_eq!(stdout_json(assert.get_output())["streams"][1]["valid_at_end"], false);
}

#[test]
fn config_file_is_loaded_and_validated() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), 7000);
    let config = temp.path().join("telemdash.json");

    std::fs::write(&config, r#"{"forwarder_port": 7000}"#).unwrap();
    let assert = cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    assert_eq!(stdout_json(assert.get_output())["streams"][1]["decoded"], 1);

    std::fs::write(&config, r#"{"forwarder_port": 20777}"#).unwrap();
    cmd()
        .arg("replay")
        .arg(&input)
        .arg("--stdout")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(contains("more than one listener"));
}

#[test]
fn encode_then_decode_f1() {
    let temp = TempDir::new().expect("tempdir");
    let payload = temp.path().join("f1.bin");
    cmd()
        .args(["encode", "f1", "--speed", "250", "--gear", "4", "--rpm", "11000"])
        .args(["--throttle", "0.5", "--player-index", "3", "-o"])
        .arg(&payload)
        .assert()
        .success();
    assert_eq!(std::fs::metadata(&payload).unwrap().len(), 1308);

    let assert = cmd()
        .args(["decode", "--protocol", "f1"])
        .arg(&payload)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["outcome"], "updated");
    assert_eq!(json["display"]["protocol"], "f1");
    assert_eq!(json["display"]["snapshot"]["speed_kmh"], 250.0);
    assert_eq!(json["display"]["snapshot"]["gear"], 4);
    assert_eq!(json["display"]["snapshot"]["rpm"], 11000);
    assert_eq!(json["display"]["snapshot"]["valid"], true);
    assert_eq!(json["display"]["last_packet_type"], "F1 CarTelemetry");
    assert_eq!(json["display"]["last_packet_len"], 1308);
}

#[test]
fn encode_then_decode_forwarder() {
    let temp = TempDir::new().expect("tempdir");
    let payload = temp.path().join("pcars.json");
    cmd()
        .args(["encode", "forwarder", "--speed", "180.5", "--gear", "5", "--lap-time", "92.5", "-o"])
        .arg(&payload)
        .assert()
        .success();
    let written = std::fs::read_to_string(&payload).unwrap();
    assert_eq!(written, r#"{"speed":180.5,"gear":5,"lapTime":92.5}"#);

    let assert = cmd()
        .args(["decode", "--protocol", "pcars"])
        .arg(&payload)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["display"]["snapshot"]["source"], "forwarder");
    assert_eq!(json["display"]["snapshot"]["lap_time_s"], 92.5);
    assert_eq!(json["display"]["last_packet_type"], "PCARS JSON");
}

#[test]
fn decode_failure_reports_error_id() {
    let temp = TempDir::new().expect("tempdir");
    let payload = temp.path().join("short.bin");
    std::fs::write(&payload, [0xe4, 0x07, 1, 19]).unwrap();
    cmd()
        .args(["decode", "--protocol", "f1"])
        .arg(&payload)
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("TD-F1-TOO-SMALL-FOR-HEADER")));
}

#[test]
fn decode_reports_ignored_packet_type() {
    let temp = TempDir::new().expect("tempdir");
    let payload = temp.path().join("lap.bin");
    cmd()
        .args(["encode", "f1", "--speed", "1", "--gear", "1", "--rpm", "1", "-o"])
        .arg(&payload)
        .assert()
        .success();
    let mut bytes = std::fs::read(&payload).unwrap();
    bytes[5] = 2;
    std::fs::write(&payload, bytes).unwrap();

    let assert = cmd()
        .args(["decode", "--protocol", "f1"])
        .arg(&payload)
        .assert()
        .success();
    let json = stdout_json(assert.get_output());
    assert_eq!(json["outcome"], "ignored");
    assert_eq!(json["packet_id"], 2);
    assert_eq!(json["display"]["snapshot"]["valid"], false);
}
