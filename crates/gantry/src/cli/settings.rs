//! Project settings file
//!
//! A `gantry.yaml` in the project root supplies the same layout and run
//! configuration overrides the CLI flags do. Flags win over the file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use gantry_core::{LayoutOverrides, RunOptions};

/// Settings file name, looked up in the project root
pub const SETTINGS_FILE: &str = "gantry.yaml";

/// Optional per-project overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Layout overrides applied after config resolution
    pub layout: LayoutOverrides,

    /// Run configuration for the emitted manifest
    pub run_config: RunOptions,
}

impl Settings {
    /// Load settings from the project root, or defaults when absent
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let path = project_root.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let settings: Self = serde_yaml::from_str(&raw)?;
        debug!(path = %path.display(), "loaded project settings");
        Ok(settings)
    }
}
