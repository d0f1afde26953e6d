//! Types for comparison run results.
//!
//! A `ComparisonReport` is built once per run, fully in memory, and written
//! as pretty-printed JSON with camelCase keys.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

use crate::compare::types::{CompareError, CompareResult};

/// Classification of one screenshot name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Present in both sets and within the threshold
    Pass,
    /// Present in both sets and over the threshold
    Fail,
    /// Present only in the current set
    New,
    /// Present only in the baseline set
    Missing,
}

/// Pixel counts for a compared pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelStats {
    pub diff_pixels: u64,
    pub total_pixels: u64,
}

impl PixelStats {
    pub fn new(diff_pixels: u64, total_pixels: u64) -> Self {
        Self {
            diff_pixels: diff_pixels.min(total_pixels),
            total_pixels,
        }
    }

    /// Every pixel counted as different (used for dimension mismatches)
    pub fn all_different(total_pixels: u64) -> Self {
        Self::new(total_pixels, total_pixels)
    }

    /// Percentage of differing pixels; an empty image has none
    pub fn percentage(&self) -> f64 {
        if self.total_pixels == 0 {
            return 0.0;
        }
        100.0 * self.diff_pixels as f64 / self.total_pixels as f64
    }
}

/// Result for a single screenshot name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub name: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_pixels: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pixels: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_path: Option<PathBuf>,
}

impl ComparisonResult {
    /// A screenshot present only in the current set
    pub fn new_screenshot(name: impl Into<String>) -> Self {
        Self::unmatched(name, Status::New)
    }

    /// A screenshot present only in the baseline set
    pub fn missing(name: impl Into<String>) -> Self {
        Self::unmatched(name, Status::Missing)
    }

    /// A compared pair within the threshold
    pub fn pass(name: impl Into<String>, stats: PixelStats) -> Self {
        Self::matched(name, Status::Pass, stats, None)
    }

    /// A compared pair over the threshold, with its persisted diff image
    pub fn fail(name: impl Into<String>, stats: PixelStats, diff_path: PathBuf) -> Self {
        Self::matched(name, Status::Fail, stats, Some(diff_path))
    }

    fn unmatched(name: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            status,
            diff_pixels: None,
            total_pixels: None,
            diff_percentage: None,
            diff_path: None,
        }
    }

    fn matched(
        name: impl Into<String>,
        status: Status,
        stats: PixelStats,
        diff_path: Option<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            diff_pixels: Some(stats.diff_pixels),
            total_pixels: Some(stats.total_pixels),
            diff_percentage: Some(stats.percentage()),
            diff_path,
        }
    }
}

/// Counts derived from a result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub new: usize,
    pub missing: usize,
}

impl Summary {
    /// Tally results by status
    pub fn tally<'a>(results: impl IntoIterator<Item = &'a ComparisonResult>) -> Self {
        let mut summary = Summary::default();
        for result in results {
            summary.total += 1;
            match result.status {
                Status::Pass => summary.passed += 1,
                Status::Fail => summary.failed += 1,
                Status::New => summary.new += 1,
                Status::Missing => summary.missing += 1,
            }
        }
        summary
    }

    /// A run succeeds when nothing failed and nothing is missing
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.missing == 0
    }
}

/// Report for one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub baseline_dir: PathBuf,
    pub current_dir: PathBuf,
    pub diff_dir: PathBuf,
    pub threshold: f64,
    pub results: Vec<ComparisonResult>,
    pub summary: Summary,
}

impl ComparisonReport {
    /// Build a report stamped now, deriving the summary from `results`
    pub fn new(
        baseline_dir: impl Into<PathBuf>,
        current_dir: impl Into<PathBuf>,
        diff_dir: impl Into<PathBuf>,
        threshold: f64,
        results: Vec<ComparisonResult>,
    ) -> Self {
        let summary = Summary::tally(&results);
        Self {
            timestamp: Utc::now(),
            baseline_dir: baseline_dir.into(),
            current_dir: current_dir.into(),
            diff_dir: diff_dir.into(),
            threshold,
            results,
            summary,
        }
    }

    /// Look up the result for a screenshot name
    pub fn result(&self, name: &str) -> Option<&ComparisonResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn to_json(&self) -> CompareResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty-printed JSON, creating parent directories
    pub fn write_to(&self, path: &Path) -> CompareResult<()> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CompareError::io(parent, e))?;
        }
        fs::write(path, json).map_err(|e| CompareError::io(path, e))
    }

    /// Read a previously written report
    pub fn read_from(path: &Path) -> CompareResult<Self> {
        let json = fs::read_to_string(path).map_err(|e| CompareError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}
