use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("wiredecode"))
}

/// Ethernet + IPv4 + UDP carrying `payload`.
fn udp_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x02; 6];
    frame.extend_from_slice(&[0x04; 6]);
    frame.extend_from_slice(&[0x08, 0x00]);

    let total_len = (20 + 8 + payload.len()) as u16;
    frame.extend_from_slice(&[0x45, 0x00]);
    frame.extend_from_slice(&total_len.to_be_bytes());
    frame.extend_from_slice(&[0x00, 0x01, 0x40, 0x00, 0x40, 0x11, 0x00, 0x00]);
    frame.extend_from_slice(&[10, 0, 0, 1, 10, 0, 0, 2]);

    frame.extend_from_slice(&40000u16.to_be_bytes());
    frame.extend_from_slice(&53u16.to_be_bytes());
    frame.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    frame.extend_from_slice(&[0x00, 0x00]);
    frame.extend_from_slice(payload);
    frame
}

fn write_pcap(path: &Path, frames: &[Vec<u8>]) {
    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&65_535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (idx, frame) in frames.iter().enumerate() {
        out.extend_from_slice(&(idx as u32 + 1).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    std::fs::write(path, out).expect("write pcap");
}

fn sample_capture(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("sample.pcap");
    write_pcap(&path, &[udp_frame(b"ping"), udp_frame(b"pong")]);
    path
}

fn capture_with_failure(temp: &TempDir) -> PathBuf {
    let path = temp.path().join("broken.pcap");
    let mut truncated = udp_frame(b"ping");
    truncated.truncate(40);
    write_pcap(&path, &[udp_frame(b"ping"), truncated]);
    path
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

#[test]
fn help_supports_decode_and_dissect() {
    cmd()
        .args(["pcap", "decode", "--help"])
        .assert()
        .success()
        .stdout(contains("--wep-key"));
    cmd()
        .args(["pcap", "dissect", "--help"])
        .assert()
        .success();
}

#[test]
fn stdout_outputs_layer_report() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let assert = cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .assert()
        .success();

    let report = stdout_json(&assert);
    assert_eq!(report["tool"]["name"], "wiredecode");
    assert_eq!(report["capture_summary"]["packets_decoded"], 2);
    assert_eq!(report["protocols"]["udp"], 2);

    let kinds: Vec<&str> = report["packets"][0]["layers"]
        .as_array()
        .expect("layers")
        .iter()
        .map(|layer| layer["kind"].as_str().expect("kind"))
        .collect();
    assert_eq!(kinds, vec!["ethernet", "ipv4", "udp", "data"]);
    assert_eq!(report["packets"][0]["layers"][2]["fields"]["destination_port"], 53);
    assert_eq!(report["packets"][0]["layers"][3]["body_len"], 4);
}

#[test]
fn report_file_is_written() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("out").join("report.json");

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--pretty")
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let text = std::fs::read_to_string(&report).expect("report");
    assert!(text.contains('\n'));
    let value: Value = serde_json::from_str(&text).expect("valid json");
    assert_eq!(value["capture_summary"]["packets_total"], 2);
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");
    let report = temp.path().join("report.json");

    cmd()
        .args(["pcap", "decode"])
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .code(2)
        .stderr(contains("error: input file not found").and(contains("hint:")));
}

#[test]
fn wrong_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.txt");
    std::fs::write(&input, b"not a capture").expect("write input");

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_must_not_overwrite_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn invalid_wep_key_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .args(["--wep-key", "0102zz"])
        .assert()
        .code(2)
        .stderr(contains("invalid --wep-key").and(contains("hint:")));
}

#[test]
fn wep_options_are_accepted() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .args(["--wep-key", "01:02:03:04:05", "--icv-policy", "discard", "--no-fcs"])
        .assert()
        .success();
}

#[test]
fn failed_packets_are_reported_but_not_fatal() {
    let temp = TempDir::new().expect("tempdir");
    let input = capture_with_failure(&temp);
    let assert = cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .assert()
        .success();

    let report = stdout_json(&assert);
    assert_eq!(report["capture_summary"]["packets_failed"], 1);
    assert!(
        report["packets"][1]["error"]
            .as_str()
            .expect("error")
            .starts_with("ipv4:")
    );
}

#[test]
fn strict_fails_when_packets_fail() {
    let temp = TempDir::new().expect("tempdir");
    let input = capture_with_failure(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--strict")
        .assert()
        .code(2)
        .stderr(contains("1 packet(s) failed to decode"));
    assert!(report.exists());
}

#[test]
fn strict_passes_on_clean_capture() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);

    cmd()
        .args(["pcap", "decode"])
        .arg(&input)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();
}

#[test]
fn glob_input_must_name_one_capture() {
    let temp = TempDir::new().expect("tempdir");
    sample_capture(&temp);
    let pattern = temp.path().join("*.pcap");

    cmd()
        .args(["pcap", "decode"])
        .arg(&pattern)
        .arg("--stdout")
        .assert()
        .success();

    capture_with_failure(&temp);
    cmd()
        .args(["pcap", "decode"])
        .arg(&pattern)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("matched 2 files").and(contains("hint:")));
}
