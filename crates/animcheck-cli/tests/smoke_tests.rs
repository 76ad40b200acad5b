//! Smoke tests for the animcheck CLI

#![allow(deprecated)] // Command::cargo_bin until assert_cmd settles the replacement
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the animcheck binary with colors disabled
fn animcheck() -> Command {
    let mut cmd = Command::cargo_bin("animcheck").expect("animcheck binary should exist");
    cmd.env_remove("RUST_LOG").args(["--color", "never"]);
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    animcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_lists_commands() {
    animcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("encode"))
        .stdout(predicate::str::contains("matrix"));
}

#[test]
fn test_no_args_fails() {
    animcheck().assert().failure();
}

// ============================================================================
// verify
// ============================================================================

#[test]
fn test_verify_passes() {
    animcheck()
        .args(["verify", "--width", "16", "--height", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("8 of 8 decoded frames"));
}

#[test]
fn test_verify_json_ping_pong() {
    animcheck()
        .args([
            "verify",
            "--width",
            "16",
            "--height",
            "4",
            "--mode",
            "ping-pong",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"decoded_frames\": 14"))
        .stdout(predicate::str::contains("\"mode\": \"ping-pong\""));
}

#[test]
fn test_verify_size_mismatch_fails() {
    animcheck()
        .args(["verify", "--width", "16", "--height", "4", "--size", "32x32"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("size mismatch"));
}

#[test]
fn test_verify_center_into_larger_stream() {
    animcheck()
        .args([
            "verify",
            "--width",
            "16",
            "--height",
            "4",
            "--size",
            "32x32",
            "--size-handling",
            "center",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("32x32"));
}

#[test]
fn test_verify_released_frame_is_skipped() {
    animcheck()
        .args([
            "verify", "--width", "16", "--height", "4", "--release", "2", "--format", "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"skipped_frames\": [\n    2\n  ]"))
        .stdout(predicate::str::contains("\"compared_frames\": 7"));
}

#[test]
fn test_verify_warns_on_release_past_last_frame() {
    animcheck()
        .args(["verify", "--width", "16", "--height", "4", "--release", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "WARN released frame 50 is past the last source frame (8 frames)",
        ))
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn test_verify_one_pixel_wide_with_floyd_steinberg() {
    animcheck()
        .args([
            "verify",
            "--width",
            "1",
            "--height",
            "4",
            "--ditherer",
            "floyd-steinberg",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[test]
fn test_verify_reads_run_file() {
    let tmp = TempDir::new().unwrap();
    let run_file = tmp.path().join("run.yaml");
    fs::write(&run_file, "width: 10\nheight: 3\nmode: ping-pong\n").unwrap();

    animcheck()
        .args(["verify", "--format", "json", "--config"])
        .arg(&run_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"decoded_frames\": 10"))
        .stdout(predicate::str::contains("\"stream_size\": \"10x6\""));
}

#[test]
fn test_flags_override_run_file() {
    let tmp = TempDir::new().unwrap();
    let run_file = tmp.path().join("run.yaml");
    fs::write(&run_file, "width: 10\nheight: 3\nmode: ping-pong\n").unwrap();

    animcheck()
        .args(["verify", "--mode", "normal", "--format", "json", "--config"])
        .arg(&run_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"decoded_frames\": 6"));
}

#[test]
fn test_bad_run_file_fails() {
    let tmp = TempDir::new().unwrap();
    let run_file = tmp.path().join("run.yaml");
    fs::write(&run_file, "hieght: 3\n").unwrap();

    animcheck()
        .args(["verify", "--config"])
        .arg(&run_file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML"));
}

#[test]
fn test_verify_saves_stream() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("artifacts");

    animcheck()
        .args(["verify", "--width", "10", "--height", "3", "--save-dir"])
        .arg(&out)
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("verify_normal."));
    assert!(names[0].ends_with(".gif"));
}

#[test]
fn test_true_color_wide_gradient_fails() {
    animcheck()
        .args([
            "verify",
            "--width",
            "600",
            "--height",
            "2",
            "--quantizer",
            "rgb888",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("256"));
}

// ============================================================================
// encode
// ============================================================================

#[test]
fn test_encode_writes_gif() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("nested").join("wipe.gif");

    animcheck()
        .args(["encode", "--width", "10", "--height", "3", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("wipe.gif"));

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"GIF89a"));
    assert_eq!(bytes.last(), Some(&0x3B));
}

#[test]
fn test_encode_rejects_bad_delays() {
    let tmp = TempDir::new().unwrap();
    animcheck()
        .args([
            "encode",
            "--step-delay-ms",
            "100",
            "--hold-delay-ms",
            "50",
            "--out",
        ])
        .arg(tmp.path().join("x.gif"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid argument"));
}

// ============================================================================
// matrix
// ============================================================================

#[test]
fn test_matrix_summary() {
    animcheck()
        .args([
            "matrix", "--width", "10", "--height", "3", "--size", "16x8",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("expected-failure"))
        .stdout(predicate::str::contains("ping-pong"))
        .stdout(predicate::str::contains(
            "4 of 4 combinations passed, 2 expected failures",
        ));
}

#[test]
fn test_matrix_json() {
    animcheck()
        .args(["matrix", "--width", "10", "--height", "3", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"passed\""));
}
