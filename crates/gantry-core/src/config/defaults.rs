//! Default layout values and config file candidates

/// Modern framework config candidates, checked in order
pub const MODERN_CONFIG_FILES: &[&str] = &[
    "react-router.config.ts",
    "react-router.config.js",
    "react-router.config.mjs",
];

/// Legacy (classic compiler) config candidates, checked in order
pub const LEGACY_CONFIG_FILES: &[&str] = &[
    "remix.config.js",
    "remix.config.mjs",
    "remix.config.cjs",
];

/// Default build output root
pub const DEFAULT_BUILD_DIRECTORY: &str = "build";

/// Default server entry file name
pub const DEFAULT_SERVER_ENTRY_FILE: &str = "index.js";

/// Default application source directory
pub const DEFAULT_APP_SOURCE_DIR: &str = "app";

/// Subdirectory of the build root holding the server bundle
pub const SERVER_SUBDIR: &str = "server";

/// Subdirectory of the build root holding client assets
pub const CLIENT_SUBDIR: &str = "client";

/// Byte ceiling for framework config files; bounds parse cost
pub const CONFIG_FILE_MAX_BYTES: u64 = 100 * 1024;
