//! Configuration management with environment variable support.
//!
//! This module provides the run configuration for screenshot comparison:
//! - Defaults for every command-line flag
//! - Environment variable names the command line falls back to
//! - Validation of fractional thresholds (malformed values are fatal)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `VRT_BASELINE_DIR` | Baseline screenshot directory | `./screenshots-production` |
//! | `VRT_CURRENT_DIR` | Current screenshot directory | `./screenshots` |
//! | `VRT_DIFF_DIR` | Output directory for diff images | `./screenshot-diffs` |
//! | `VRT_THRESHOLD` | Tolerated fraction of differing pixels | `0.001` |
//! | `VRT_OUTPUT` | Report file path | `./vrt-report.json` |
//! | `VRT_PIXEL_THRESHOLD` | Per-pixel colour tolerance | `0.1` |
//!
//! # Example
//!
//! ```bash
//! # Allow 0.5% of pixels to differ and write the report elsewhere
//! export VRT_THRESHOLD=0.005
//! export VRT_OUTPUT="target/vrt/report.json"
//! ```

use std::path::PathBuf;

use crate::compare::differ::Pixelmatch;
use crate::compare::orchestrator::CompareOptions;
use crate::compare::types::{CompareError, CompareResult};

// ============================================================================
// Default Values
// ============================================================================

/// Default baseline screenshot directory
pub const DEFAULT_BASELINE_DIR: &str = "./screenshots-production";

/// Default current screenshot directory
pub const DEFAULT_CURRENT_DIR: &str = "./screenshots";

/// Default diff image directory
pub const DEFAULT_DIFF_DIR: &str = "./screenshot-diffs";

/// Default tolerated fraction of differing pixels (0.1%)
pub const DEFAULT_THRESHOLD: f64 = 0.001;

/// Default report path
pub const DEFAULT_OUTPUT: &str = "./vrt-report.json";

/// Default per-pixel colour tolerance
pub const DEFAULT_PIXEL_THRESHOLD: f64 = 0.1;

/// Default screenshot file extension
pub const DEFAULT_EXTENSION: &str = "png";

// ============================================================================
// Environment Variable Names
// ============================================================================

pub const ENV_BASELINE_DIR: &str = "VRT_BASELINE_DIR";
pub const ENV_CURRENT_DIR: &str = "VRT_CURRENT_DIR";
pub const ENV_DIFF_DIR: &str = "VRT_DIFF_DIR";
pub const ENV_THRESHOLD: &str = "VRT_THRESHOLD";
pub const ENV_OUTPUT: &str = "VRT_OUTPUT";
pub const ENV_PIXEL_THRESHOLD: &str = "VRT_PIXEL_THRESHOLD";

/// Resolved settings for one comparison run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Baseline screenshot directory
    pub baseline_dir: PathBuf,
    /// Current screenshot directory
    pub current_dir: PathBuf,
    /// Diff image directory
    pub diff_dir: PathBuf,
    /// Tolerated fraction of differing pixels
    pub threshold: f64,
    /// Report path
    pub output: PathBuf,
    /// Per-pixel colour tolerance
    pub pixel_threshold: f64,
    /// Count anti-aliased pixels as differences
    pub include_aa: bool,
}

impl Settings {
    /// Create settings with all defaults
    pub fn defaults() -> Self {
        Self {
            baseline_dir: PathBuf::from(DEFAULT_BASELINE_DIR),
            current_dir: PathBuf::from(DEFAULT_CURRENT_DIR),
            diff_dir: PathBuf::from(DEFAULT_DIFF_DIR),
            threshold: DEFAULT_THRESHOLD,
            output: PathBuf::from(DEFAULT_OUTPUT),
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
            include_aa: false,
        }
    }

    pub fn baseline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_dir = dir.into();
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = dir.into();
        self
    }

    pub fn diff_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diff_dir = dir.into();
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn pixel_threshold(mut self, threshold: f64) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    pub fn include_aa(mut self, include_aa: bool) -> Self {
        self.include_aa = include_aa;
        self
    }

    /// Check both thresholds lie in `[0, 1]`
    pub fn validate(&self) -> CompareResult<()> {
        validate_fraction("threshold", self.threshold)?;
        validate_fraction("pixel-threshold", self.pixel_threshold)?;
        Ok(())
    }

    /// Orchestrator inputs for these settings
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions::new(&self.baseline_dir, &self.current_dir, &self.diff_dir)
            .threshold(self.threshold)
    }

    /// Pixel differ configured by these settings
    pub fn differ(&self) -> Pixelmatch {
        Pixelmatch::new(self.pixel_threshold).include_aa(self.include_aa)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Reject values that are not finite or lie outside `[0, 1]`
pub fn validate_fraction(name: &str, value: f64) -> CompareResult<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CompareError::Config(format!(
            "{} must be a number between 0 and 1, got {}",
            name, value
        )))
    }
}

/// Parse a fractional threshold such as `0.001`
pub fn parse_fraction(name: &str, raw: &str) -> CompareResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        CompareError::Config(format!(
            "{} must be a number between 0 and 1, got '{}'",
            name, raw
        ))
    })?;
    validate_fraction(name, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction_valid() {
        assert_eq!(parse_fraction("threshold", "0.001").unwrap(), 0.001);
        assert_eq!(parse_fraction("threshold", " 1 ").unwrap(), 1.0);
        assert_eq!(parse_fraction("threshold", "0").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_fraction_invalid() {
        assert!(matches!(
            parse_fraction("threshold", "abc"),
            Err(CompareError::Config(_))
        ));
        assert!(parse_fraction("threshold", "NaN").is_err());
        assert!(parse_fraction("threshold", "inf").is_err());
        assert!(parse_fraction("threshold", "-0.1").is_err());
        assert!(parse_fraction("threshold", "1.5").is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::defaults();
        assert_eq!(settings.baseline_dir, PathBuf::from(DEFAULT_BASELINE_DIR));
        assert_eq!(settings.current_dir, PathBuf::from(DEFAULT_CURRENT_DIR));
        assert_eq!(settings.diff_dir, PathBuf::from(DEFAULT_DIFF_DIR));
        assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(settings.threshold, 0.001);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_builder() {
        let settings = Settings::defaults()
            .baseline_dir("base")
            .threshold(0.05)
            .pixel_threshold(0.2)
            .include_aa(true);

        let options = settings.compare_options();
        assert_eq!(options.baseline_dir, PathBuf::from("base"));
        assert_eq!(options.threshold, 0.05);

        let differ = settings.differ();
        assert_eq!(differ.threshold, 0.2);
        assert!(differ.include_aa);
    }

    #[test]
    fn test_validate_rejects_bad_pixel_threshold() {
        let settings = Settings::defaults().pixel_threshold(f64::NAN);
        assert!(settings.validate().is_err());
    }
}
