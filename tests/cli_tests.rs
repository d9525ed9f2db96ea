//! Command-line behavior of the segmenter binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn segmenter() -> Command {
    let mut cmd = Command::cargo_bin("segmenter").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_filename_prints_deterministic_name() {
    segmenter()
        .args([
            "filename",
            "--clip-id",
            "42",
            "--start",
            "00:00:10.000",
            "--end",
            "00:00:20.000",
        ])
        .assert()
        .success()
        .stdout("clip-42-00-00-10-000--00-00-20-000.mp4\n");
}

#[test]
fn test_filename_accepts_comma_decimal_mark() {
    segmenter()
        .args([
            "filename",
            "--clip-id",
            "42",
            "--start",
            "00:00:10,000",
            "--end",
            "00:00:20,000",
            "--audio-only",
        ])
        .assert()
        .success()
        .stdout("clip-42-00-00-10-000--00-00-20-000.aac\n");
}

#[test]
fn test_filename_rejects_malformed_time() {
    segmenter()
        .args(["filename", "--clip-id", "1", "--start", "1:2", "--end", "00:00:20.000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid time format"));
}

#[test]
fn test_segment_enforces_danmaku_interval_limits() {
    let dir = TempDir::new().unwrap();
    segmenter()
        .current_dir(dir.path())
        .args([
            "segment",
            "--clip-id",
            "1",
            "--start",
            "00:00:10.000",
            "--end",
            "00:00:15.000",
            "--danmaku",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the allowed range"));
}

#[test]
fn test_sweep_dry_run_lists_leftovers() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("segments");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("clip-1-a--b.mp4.raw.mp4"), b"leftover").unwrap();

    segmenter()
        .current_dir(dir.path())
        .arg("--output-dir")
        .arg(&out)
        .args(["sweep", "--dry-run", "--min-age-secs", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would remove 1 file(s)"));

    assert!(out.join("clip-1-a--b.mp4.raw.mp4").exists());
}

#[test]
fn test_unknown_log_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    segmenter()
        .current_dir(dir.path())
        .args(["--log-level", "chatty", "sweep"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid log level"));
}
