//! Compare Screenshots - visual regression checks over screenshot directories.
//!
//! This crate provides:
//! - Directory scanning and baseline/current set merging
//! - PNG decoding into RGBA pixel buffers
//! - Perceptual pixel diffing with anti-aliasing exclusion
//! - JSON comparison reports and the exit-code policy built on them
//! - The feature-flag document the screenshotted UI renders
//!
//! # Example
//!
//! ```rust,no_run
//! use compare_screenshots::{compare, exit_code};
//!
//! let report = compare("./screenshots-production", "./screenshots", "./screenshot-diffs", 0.001).unwrap();
//! report.write_to("vrt-report.json".as_ref()).unwrap();
//! std::process::exit(exit_code(&report.summary) as i32);
//! ```

pub mod compare;
pub mod config;
pub mod flags;
pub mod report;

// Re-export comparison types
pub use compare::{
    CompareError, CompareOptions, CompareResult, Comparator, ImageCodec, PixelBuffer, PixelDiff,
    PixelDiffer, Pixelmatch, PngCodec, Presence, compare, exit_code, list_screenshots, merge,
};

// Re-export report types
pub use report::{ComparisonReport, ComparisonResult, PixelStats, Status, Summary};

// Re-export configuration
pub use config::Settings;

// Re-export the flags contract
pub use flags::{FeatureFlag, FeatureFlags, FlagsView};
