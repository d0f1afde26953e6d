//! End-to-end tests for the compare-screenshots binary

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

use compare_screenshots::{ComparisonReport, ImageCodec, PixelBuffer, PngCodec, Status};

fn run(args: &[&str], cwd: &Path) -> Output {
    run_with_env(args, &[], cwd)
}

fn run_with_env(args: &[&str], vars: &[(&str, &str)], cwd: &Path) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_compare-screenshots"));
    command
        .args(args)
        .current_dir(cwd)
        .env_remove("VRT_BASELINE_DIR")
        .env_remove("VRT_CURRENT_DIR")
        .env_remove("VRT_DIFF_DIR")
        .env_remove("VRT_THRESHOLD")
        .env_remove("VRT_OUTPUT")
        .env_remove("VRT_PIXEL_THRESHOLD");
    for (key, value) in vars {
        command.env(key, value);
    }
    command.output().expect("Failed to run compare-screenshots")
}

fn write_images(root: &Path, name: &str, baseline: &PixelBuffer, current: &PixelBuffer) {
    PngCodec.write(&root.join("screenshots-production").join(name), baseline).unwrap();
    PngCodec.write(&root.join("screenshots").join(name), current).unwrap();
}

fn write_pair(root: &Path, name: &str, changed_rows: u32) {
    let plain = PixelBuffer::with_color(20, 20, [255, 255, 255, 255]);
    let mut current = plain.clone();
    current.draw_rect(0, 5, 20, changed_rows, [0, 0, 0, 255]);
    write_images(root, name, &plain, &current);
}

#[test]
fn test_default_paths_and_success_exit() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 0);

    let output = run(&[], tmp.path());
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Visual Regression Comparison"));
    assert!(stdout.contains("Passed: 1"));

    let report = ComparisonReport::read_from(&tmp.path().join("vrt-report.json")).unwrap();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].status, Status::Pass);
    assert_eq!(report.threshold, 0.001);
}

#[test]
fn test_failure_exit_and_last_flag_wins() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 1);

    let output = run(
        &["--threshold", "0.5", "--threshold", "0.001", "--output", "out/report.json"],
        tmp.path(),
    );
    assert_eq!(output.status.code(), Some(1));

    let report = ComparisonReport::read_from(&tmp.path().join("out/report.json")).unwrap();
    assert_eq!(report.threshold, 0.001);
    assert_eq!(report.summary.failed, 1);
    assert!(tmp.path().join("screenshot-diffs/diff-home.png").exists());
}

#[test]
fn test_malformed_threshold_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 0);

    let output = run(&["--threshold", "abc"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(!tmp.path().join("vrt-report.json").exists());

    let output = run(&["--threshold", "2"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_corrupt_image_writes_no_report() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 0);
    std::fs::write(tmp.path().join("screenshots/home.png"), b"garbage").unwrap();

    let output = run(&["--quiet"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(!tmp.path().join("vrt-report.json").exists());
}

#[test]
fn test_fatal_error_reported_with_logging_off() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "a.png", 0);
    std::fs::write(tmp.path().join("screenshots/a.png"), b"garbage").unwrap();

    let output = run_with_env(&["--quiet"], &[("RUST_LOG", "off")], tmp.path());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr was: {}", stderr);
}

#[test]
fn test_threshold_env_overrides_default() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 1);

    // 5% of pixels differ: fails at the 0.1% default, passes at 10%
    let output = run_with_env(&["--quiet"], &[("VRT_THRESHOLD", "0.1")], tmp.path());
    assert_eq!(output.status.code(), Some(0));

    let report = ComparisonReport::read_from(&tmp.path().join("vrt-report.json")).unwrap();
    assert_eq!(report.threshold, 0.1);
    assert_eq!(report.results[0].status, Status::Pass);
}

#[test]
fn test_threshold_flag_overrides_env() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 1);

    let output = run_with_env(
        &["--quiet", "--threshold", "0.001"],
        &[("VRT_THRESHOLD", "0.1")],
        tmp.path(),
    );
    assert_eq!(output.status.code(), Some(1));

    let report = ComparisonReport::read_from(&tmp.path().join("vrt-report.json")).unwrap();
    assert_eq!(report.threshold, 0.001);
    assert_eq!(report.results[0].status, Status::Fail);
}

#[test]
fn test_malformed_threshold_env_is_fatal() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 0);

    let output = run_with_env(&["--quiet"], &[("VRT_THRESHOLD", "abc")], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(!tmp.path().join("vrt-report.json").exists());
}

#[test]
fn test_output_env_sets_report_path() {
    let tmp = TempDir::new().unwrap();
    write_pair(tmp.path(), "home.png", 0);

    let output = run_with_env(&["--quiet"], &[("VRT_OUTPUT", "env/report.json")], tmp.path());
    assert_eq!(output.status.code(), Some(0));
    assert!(tmp.path().join("env/report.json").exists());
    assert!(!tmp.path().join("vrt-report.json").exists());
}

#[test]
fn test_pixel_threshold_flag_and_env() {
    let tmp = TempDir::new().unwrap();
    let baseline = PixelBuffer::with_color(10, 10, [200, 200, 200, 255]);
    let current = PixelBuffer::with_color(10, 10, [202, 201, 200, 255]);
    write_images(tmp.path(), "tint.png", &baseline, &current);

    // A slight tint is within the default per-pixel tolerance
    let output = run(&["--quiet"], tmp.path());
    assert_eq!(output.status.code(), Some(0));

    let output = run(&["--quiet", "--pixel-threshold", "0"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    let report = ComparisonReport::read_from(&tmp.path().join("vrt-report.json")).unwrap();
    assert_eq!(report.results[0].diff_pixels, Some(100));

    let output = run_with_env(&["--quiet"], &[("VRT_PIXEL_THRESHOLD", "0")], tmp.path());
    assert_eq!(output.status.code(), Some(1));

    let output = run(&["--quiet", "--pixel-threshold", "-1"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_include_aa_flag_counts_edge_pixels() {
    let tmp = TempDir::new().unwrap();
    let mut baseline = PixelBuffer::with_color(10, 10, [255, 255, 255, 255]);
    baseline.draw_rect(0, 0, 5, 10, [0, 0, 0, 255]);
    let mut current = baseline.clone();
    current.draw_rect(5, 0, 1, 10, [128, 128, 128, 255]);
    write_images(tmp.path(), "edge.png", &baseline, &current);

    let output = run(&["--quiet"], tmp.path());
    assert_eq!(output.status.code(), Some(0));

    let output = run(&["--quiet", "--include-aa"], tmp.path());
    assert_eq!(output.status.code(), Some(1));
    let report = ComparisonReport::read_from(&tmp.path().join("vrt-report.json")).unwrap();
    assert_eq!(report.results[0].diff_pixels, Some(10));
}

#[test]
fn test_piped_logs_have_no_ansi_escapes() {
    let tmp = TempDir::new().unwrap();
    write_images(
        tmp.path(),
        "size.png",
        &PixelBuffer::with_color(10, 10, [255, 255, 255, 255]),
        &PixelBuffer::with_color(12, 10, [255, 255, 255, 255]),
    );

    let output = run_with_env(&["--quiet"], &[("RUST_LOG", "info")], tmp.path());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Size mismatch for size.png"), "stderr was: {}", stderr);
    assert!(!stderr.contains('\u{1b}'), "stderr has ANSI escapes: {:?}", stderr);
}
