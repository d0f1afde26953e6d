use anyhow::Context;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use compare_screenshots::config::{self, Settings};
use compare_screenshots::{Comparator, PngCodec, Summary, exit_code};

/// Compare Screenshots - visual regression comparison of screenshot directories
#[derive(Parser, Debug)]
#[command(
    name = "compare-screenshots",
    version,
    about = "Compare current screenshots against a baseline and write a JSON report",
    args_override_self = true,
    after_help = "ENVIRONMENT VARIABLES:\n\
        VRT_BASELINE_DIR       Baseline screenshot directory\n\
        VRT_CURRENT_DIR        Current screenshot directory\n\
        VRT_DIFF_DIR           Output directory for diff images\n\
        VRT_THRESHOLD          Tolerated fraction of differing pixels\n\
        VRT_OUTPUT             Report file path\n\
        VRT_PIXEL_THRESHOLD    Per-pixel colour tolerance\n\
        RUST_LOG               Log filter (default: info)\n\n\
        EXIT STATUS:\n\
        0  every compared screenshot passed and none are missing\n\
        1  a screenshot failed or is missing, or the run aborted"
)]
struct Args {
    /// Baseline (accepted-good) screenshot directory
    #[arg(long, env = config::ENV_BASELINE_DIR, default_value = config::DEFAULT_BASELINE_DIR)]
    baseline: PathBuf,

    /// Freshly captured screenshot directory
    #[arg(long, env = config::ENV_CURRENT_DIR, default_value = config::DEFAULT_CURRENT_DIR)]
    current: PathBuf,

    /// Output directory for diff images
    #[arg(long, env = config::ENV_DIFF_DIR, default_value = config::DEFAULT_DIFF_DIR)]
    diff: PathBuf,

    /// Tolerated fraction of differing pixels (0.001 = 0.1%)
    #[arg(long, env = config::ENV_THRESHOLD, default_value = "0.001", value_parser = parse_threshold)]
    threshold: f64,

    /// Report file path
    #[arg(long, env = config::ENV_OUTPUT, default_value = config::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Per-pixel colour tolerance (0 = exact match)
    #[arg(long, env = config::ENV_PIXEL_THRESHOLD, default_value = "0.1", value_parser = parse_pixel_threshold)]
    pixel_threshold: f64,

    /// Count anti-aliased pixels as differences
    #[arg(long)]
    include_aa: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress the banner and summary on stdout
    #[arg(short, long)]
    quiet: bool,
}

fn parse_threshold(raw: &str) -> Result<f64, String> {
    config::parse_fraction("threshold", raw).map_err(|e| e.to_string())
}

fn parse_pixel_threshold(raw: &str) -> Result<f64, String> {
    config::parse_fraction("pixel-threshold", raw).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            // Help and version go to stdout and are not failures
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(args.verbose);

    match run(&args) {
        Ok(summary) => ExitCode::from(exit_code(&summary)),
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> anyhow::Result<Summary> {
    let settings = Settings::defaults()
        .baseline_dir(&args.baseline)
        .current_dir(&args.current)
        .diff_dir(&args.diff)
        .threshold(args.threshold)
        .output(&args.output)
        .pixel_threshold(args.pixel_threshold)
        .include_aa(args.include_aa);
    settings.validate()?;

    if !args.quiet {
        println!("Visual Regression Comparison");
        println!("============================");
        println!("Baseline directory: {}", settings.baseline_dir.display());
        println!("Current directory: {}", settings.current_dir.display());
        println!("Diff directory: {}", settings.diff_dir.display());
        println!("Threshold: {}%", settings.threshold * 100.0);
        println!();
    }

    let comparator = Comparator::new(PngCodec, settings.differ());
    let report = comparator
        .compare(&settings.compare_options())
        .context("screenshot comparison failed")?;

    report
        .write_to(&settings.output)
        .with_context(|| format!("failed to write report to {}", settings.output.display()))?;

    let summary = report.summary;
    if !args.quiet {
        println!();
        println!("Summary");
        println!("-------");
        println!("Total: {}", summary.total);
        println!("Passed: {}", summary.passed);
        println!("Failed: {}", summary.failed);
        println!("New: {}", summary.new);
        println!("Missing: {}", summary.missing);
        println!();
        println!("Report written to: {}", settings.output.display());
    }

    Ok(summary)
}
