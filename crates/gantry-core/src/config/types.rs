//! Layout types

use serde::{Deserialize, Serialize};

use super::defaults;

/// Effective build output layout of a project
///
/// All fields are slash-separated paths relative to the project root. The
/// layout is fully populated; resolution fills every field from config files,
/// overrides, or defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLayout {
    /// Root of the framework build output
    pub build_directory: String,

    /// File name of the server entry module
    pub server_entry_file: String,

    /// Path to the server entry module
    pub server_entry_path: String,

    /// Directory holding client (static) assets
    pub client_assets_dir: String,

    /// Application source directory
    pub app_source_dir: String,
}

impl Default for ResolvedLayout {
    fn default() -> Self {
        Self {
            build_directory: defaults::DEFAULT_BUILD_DIRECTORY.to_string(),
            server_entry_file: defaults::DEFAULT_SERVER_ENTRY_FILE.to_string(),
            server_entry_path: format!(
                "{}/{}/{}",
                defaults::DEFAULT_BUILD_DIRECTORY,
                defaults::SERVER_SUBDIR,
                defaults::DEFAULT_SERVER_ENTRY_FILE
            ),
            client_assets_dir: format!(
                "{}/{}",
                defaults::DEFAULT_BUILD_DIRECTORY,
                defaults::CLIENT_SUBDIR
            ),
            app_source_dir: defaults::DEFAULT_APP_SOURCE_DIR.to_string(),
        }
    }
}

/// Caller-supplied layout overrides
///
/// Every field is optional; unset fields keep their resolved value. See
/// [`apply_overrides`](super::apply_overrides) for how derived fields react
/// to an overridden build directory or entry file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOverrides {
    /// Replace the build output root
    pub build_directory: Option<String>,

    /// Replace the server entry file name
    pub server_entry_file: Option<String>,

    /// Replace the client assets directory
    pub client_assets_dir: Option<String>,

    /// Replace the application source directory
    pub app_source_dir: Option<String>,
}

impl LayoutOverrides {
    /// Whether any override is set
    pub fn is_empty(&self) -> bool {
        self.build_directory.is_none()
            && self.server_entry_file.is_none()
            && self.client_assets_dir.is_none()
            && self.app_source_dir.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = ResolvedLayout::default();
        assert_eq!(layout.build_directory, "build");
        assert_eq!(layout.server_entry_path, "build/server/index.js");
        assert_eq!(layout.client_assets_dir, "build/client");
        assert_eq!(layout.app_source_dir, "app");
    }

    #[test]
    fn test_overrides_empty() {
        assert!(LayoutOverrides::default().is_empty());
        let ov = LayoutOverrides {
            build_directory: Some("dist".to_string()),
            ..Default::default()
        };
        assert!(!ov.is_empty());
    }

    #[test]
    fn test_overrides_deserialize_camel_case() {
        let ov: LayoutOverrides =
            serde_yaml::from_str("buildDirectory: dist\nserverEntryFile: server.mjs\n").unwrap();
        assert_eq!(ov.build_directory.as_deref(), Some("dist"));
        assert_eq!(ov.server_entry_file.as_deref(), Some("server.mjs"));
        assert!(ov.client_assets_dir.is_none());
    }
}
