//! Comparison orchestration: merge two screenshot sets, diff matched pairs,
//! apply the threshold and build the report.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::codec::{ImageCodec, PixelBuffer, PngCodec};
use super::differ::{DIFF_COLOR, PixelDiffer, Pixelmatch};
use super::scanner::list_screenshots;
use super::types::{CompareError, CompareResult};
use crate::config;
use crate::report::{ComparisonReport, ComparisonResult, PixelStats, Status, Summary};

/// Prefix for persisted diff image names
pub const DIFF_PREFIX: &str = "diff-";

/// Where a screenshot name was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    BaselineOnly,
    CurrentOnly,
    Both,
}

/// Merge two name sets into one entry per distinct name
pub fn merge(baseline: &BTreeSet<String>, current: &BTreeSet<String>) -> BTreeMap<String, Presence> {
    let mut merged: BTreeMap<String, Presence> = baseline
        .iter()
        .map(|name| (name.clone(), Presence::BaselineOnly))
        .collect();

    for name in current {
        merged
            .entry(name.clone())
            .and_modify(|presence| *presence = Presence::Both)
            .or_insert(Presence::CurrentOnly);
    }

    merged
}

/// Map a summary to a process exit code: 1 on any failure or missing entry
pub fn exit_code(summary: &Summary) -> u8 {
    if summary.is_success() { 0 } else { 1 }
}

/// Inputs for one comparison run
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Accepted-good screenshots
    pub baseline_dir: PathBuf,
    /// Freshly captured screenshots
    pub current_dir: PathBuf,
    /// Output directory for diff images
    pub diff_dir: PathBuf,
    /// Maximum tolerated fraction of differing pixels, in `[0, 1]`
    pub threshold: f64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from(config::DEFAULT_BASELINE_DIR),
            current_dir: PathBuf::from(config::DEFAULT_CURRENT_DIR),
            diff_dir: PathBuf::from(config::DEFAULT_DIFF_DIR),
            threshold: config::DEFAULT_THRESHOLD,
        }
    }
}

impl CompareOptions {
    pub fn new(
        baseline_dir: impl Into<PathBuf>,
        current_dir: impl Into<PathBuf>,
        diff_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            baseline_dir: baseline_dir.into(),
            current_dir: current_dir.into(),
            diff_dir: diff_dir.into(),
            ..Default::default()
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Path of the diff image for a screenshot name
    pub fn diff_path(&self, name: &str) -> PathBuf {
        self.diff_dir.join(format!("{}{}", DIFF_PREFIX, name))
    }
}

/// Runs comparisons with a codec and a pixel differ
#[derive(Debug, Clone)]
pub struct Comparator<C = PngCodec, D = Pixelmatch> {
    codec: C,
    differ: D,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(PngCodec, Pixelmatch::default())
    }
}

impl<C: ImageCodec, D: PixelDiffer> Comparator<C, D> {
    pub fn new(codec: C, differ: D) -> Self {
        Self { codec, differ }
    }

    /// Compare the baseline and current directories and build a report.
    ///
    /// Writes a diff image for every failing pair. Any unreadable directory
    /// or image aborts the whole run.
    pub fn compare(&self, options: &CompareOptions) -> CompareResult<ComparisonReport> {
        config::validate_fraction("threshold", options.threshold)?;

        let extension = self.codec.extension();
        let baseline = list_screenshots(&options.baseline_dir, extension)?;
        let current = list_screenshots(&options.current_dir, extension)?;

        fs::create_dir_all(&options.diff_dir)
            .map_err(|e| CompareError::io(&options.diff_dir, e))?;

        let mut results = Vec::new();
        for (name, presence) in merge(&baseline, &current) {
            let result = match presence {
                Presence::CurrentOnly => {
                    info!("[NEW] {}", name);
                    ComparisonResult::new_screenshot(name)
                }
                Presence::BaselineOnly => {
                    info!("[MISSING] {}", name);
                    ComparisonResult::missing(name)
                }
                Presence::Both => {
                    let result = self.compare_pair(
                        &name,
                        &options.baseline_dir.join(&name),
                        &options.current_dir.join(&name),
                        &options.diff_path(&name),
                        options.threshold,
                    )?;
                    let icon = if result.status == Status::Pass { '✓' } else { '✗' };
                    info!(
                        "[{}] {}: {:.3}% diff",
                        icon,
                        name,
                        result.diff_percentage.unwrap_or_default()
                    );
                    result
                }
            };
            results.push(result);
        }

        Ok(ComparisonReport::new(
            &options.baseline_dir,
            &options.current_dir,
            &options.diff_dir,
            options.threshold,
            results,
        ))
    }

    /// Compare one baseline/current pair, writing `diff_path` if it fails
    pub fn compare_pair(
        &self,
        name: &str,
        baseline_path: &Path,
        current_path: &Path,
        diff_path: &Path,
        threshold: f64,
    ) -> CompareResult<ComparisonResult> {
        let baseline = self.codec.read(baseline_path)?;
        let current = self.codec.read(current_path)?;

        if !baseline.same_dimensions(&current) {
            warn!(
                "Size mismatch for {}: baseline {}x{} vs current {}x{}",
                name,
                baseline.width(),
                baseline.height(),
                current.width(),
                current.height()
            );
            let larger = if baseline.area() >= current.area() { &baseline } else { &current };
            let stats = PixelStats::all_different(larger.area());
            let marked = PixelBuffer::with_color(
                larger.width(),
                larger.height(),
                [DIFF_COLOR[0], DIFF_COLOR[1], DIFF_COLOR[2], 255],
            );
            self.persist_diff(diff_path, &marked)?;
            return Ok(ComparisonResult::fail(name, stats, diff_path.to_path_buf()));
        }

        let diff = self.differ.diff(&baseline, &current);
        let stats = PixelStats::new(diff.diff_pixels, baseline.area());

        if stats.percentage() <= threshold * 100.0 {
            Ok(ComparisonResult::pass(name, stats))
        } else {
            self.persist_diff(diff_path, &diff.diff_image)?;
            Ok(ComparisonResult::fail(name, stats, diff_path.to_path_buf()))
        }
    }

    fn persist_diff(&self, diff_path: &Path, image: &PixelBuffer) -> CompareResult<()> {
        self.codec.write(diff_path, image)?;
        debug!(path = %diff_path.display(), "wrote diff image");
        Ok(())
    }
}

/// Compare two screenshot directories with the PNG codec and default differ
pub fn compare(
    baseline_dir: impl Into<PathBuf>,
    current_dir: impl Into<PathBuf>,
    diff_dir: impl Into<PathBuf>,
    threshold: f64,
) -> CompareResult<ComparisonReport> {
    let options = CompareOptions::new(baseline_dir, current_dir, diff_dir).threshold(threshold);
    let comparator: Comparator = Comparator::default();
    comparator.compare(&options)
}
