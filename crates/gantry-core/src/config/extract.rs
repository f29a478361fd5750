//! Best-effort field extraction from framework config sources
//!
//! Framework configs are JavaScript or TypeScript code, not data. Extraction
//! recognizes plain string-literal assignments (`buildDirectory: "dist"`) and
//! nothing else. A value built from template literals, variables, or function
//! calls is reported as absent; resolution then falls back to defaults and
//! surfaces a warning so the user can set an explicit override.

use regex::Regex;
use tracing::trace;

/// Layout fields recovered from one config source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub build_directory: Option<String>,
    pub server_entry_file: Option<String>,
    /// Legacy flat path to the server bundle (classic compiler)
    pub server_entry_path: Option<String>,
    pub client_assets_dir: Option<String>,
    pub app_source_dir: Option<String>,
}

impl ExtractedFields {
    /// Whether nothing was recovered
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Number of recovered fields
    pub fn field_count(&self) -> usize {
        [
            self.build_directory.is_some(),
            self.server_entry_file.is_some(),
            self.server_entry_path.is_some(),
            self.client_assets_dir.is_some(),
            self.app_source_dir.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }
}

/// Extract layout fields from a modern `react-router.config.*` source
pub fn extract_modern(source: &str) -> ExtractedFields {
    ExtractedFields {
        build_directory: capture_string(source, "buildDirectory"),
        server_entry_file: capture_string(source, "serverBuildFile"),
        app_source_dir: capture_string(source, "appDirectory"),
        ..Default::default()
    }
}

/// Extract layout fields from a legacy `remix.config.*` source
pub fn extract_legacy(source: &str) -> ExtractedFields {
    ExtractedFields {
        server_entry_path: capture_string(source, "serverBuildPath"),
        client_assets_dir: capture_string(source, "assetsBuildDirectory"),
        app_source_dir: capture_string(source, "appDirectory"),
        ..Default::default()
    }
}

/// Find `field: "value"` or `field: 'value'` in config source
fn capture_string(source: &str, field: &str) -> Option<String> {
    let pattern = format!(r#"{field}\s*:\s*["']([^"']+)["']"#);
    let value = Regex::new(&pattern)
        .ok()?
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());
    if let Some(ref v) = value {
        trace!(field, value = %v, "extracted config field");
    }
    value
}
