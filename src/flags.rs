//! Feature-flag document consumed by the demo UI.
//!
//! The UI fetches `GET /flags/features.json` and shows a loading state until
//! the request settles, an error state on a non-2xx status or a bad body, and
//! otherwise a table of flags. This module models that document and those
//! states so fixtures and tooling share one definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One feature flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub enabled: bool,
    pub description: String,
    /// Share of users the flag is active for, 0..=100 (display only)
    pub rollout_percentage: u8,
}

/// The flags document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub flags: BTreeMap<String, FeatureFlag>,
    pub version: String,
    pub last_updated: String,
}

impl FeatureFlags {
    /// Parse and validate a flags document
    pub fn from_json(body: &str) -> Result<Self, String> {
        let doc: FeatureFlags = serde_json::from_str(body).map_err(|e| e.to_string())?;
        if let Some((name, flag)) = doc.flags.iter().find(|(_, f)| f.rollout_percentage > 100) {
            return Err(format!(
                "flag '{}' has rollout_percentage {} (expected 0-100)",
                name, flag.rollout_percentage
            ));
        }
        Ok(doc)
    }

    /// Table rows sorted by flag name
    pub fn rows(&self) -> Vec<(&str, &FeatureFlag)> {
        self.flags.iter().map(|(name, flag)| (name.as_str(), flag)).collect()
    }
}

/// What the UI shows for the flags request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagsView {
    /// Request not settled yet
    Loading,
    /// Non-2xx status, network failure or malformed body
    Error(String),
    /// Flags table
    Loaded(FeatureFlags),
}

impl FlagsView {
    /// Settle the view from an HTTP status and response body
    pub fn from_response(status: u16, body: &str) -> Self {
        if !(200..300).contains(&status) {
            return FlagsView::Error(format!("HTTP {}", status));
        }
        match FeatureFlags::from_json(body) {
            Ok(flags) => FlagsView::Loaded(flags),
            Err(message) => FlagsView::Error(message),
        }
    }

    /// Settle the view from a transport failure
    pub fn from_network_error(message: impl Into<String>) -> Self {
        FlagsView::Error(message.into())
    }

    /// Text the UI renders for non-table states
    pub fn message(&self) -> Option<String> {
        match self {
            FlagsView::Loading => Some("Loading flags...".to_string()),
            FlagsView::Error(message) => Some(format!("Error: {}", message)),
            FlagsView::Loaded(_) => None,
        }
    }
}
