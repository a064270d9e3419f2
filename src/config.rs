//! Run configuration
//!
//! Settings come from defaults, optionally replaced by a JSON file, then
//! individual fields are overridden by command-line flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use crate::error::Result;
use crate::fill::FillSettings;
use crate::index::IndexKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Descend into sub-directories in folder mode (default: false)
    pub recursive: bool,
    /// Worker threads for the batch; 0 lets rayon decide (default: 0)
    pub jobs: usize,
    /// Process everything but leave files on disk untouched (default: false)
    pub dry_run: bool,
    /// Pixel repair options
    pub fill: FillSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            recursive: false,
            jobs: 0,
            dry_run: false,
            fill: FillSettings::default(),
        }
    }
}

/// Values given explicitly on the command line. `None` keeps the loaded value.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub recursive: Option<bool>,
    pub jobs: Option<usize>,
    pub dry_run: Option<bool>,
    pub index: Option<IndexKind>,
    pub reveal_filled: Option<bool>,
}

impl Settings {
    /// Read settings from a JSON file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(recursive) = overrides.recursive {
            self.recursive = recursive;
        }
        if let Some(jobs) = overrides.jobs {
            self.jobs = jobs;
        }
        if let Some(dry_run) = overrides.dry_run {
            self.dry_run = dry_run;
        }
        if let Some(index) = overrides.index {
            self.fill.index = index;
        }
        if let Some(reveal) = overrides.reveal_filled {
            self.fill.reveal_filled = reveal;
        }
    }
}
