//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Malformed or out-of-policy input values
    #[error(transparent)]
    Input(#[from] InputError),

    /// Traversal, symlink, and manifest tampering detections
    #[error(transparent)]
    Security(#[from] SecurityError),

    /// Build output verification failures
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Validation errors for names, paths, and configuration values
#[derive(Debug, Error)]
pub enum InputError {
    /// Empty value where one is required
    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    /// Parent-directory traversal sequence in a name or path
    #[error("{what} '{value}' contains a path traversal sequence ('..')")]
    Traversal { what: &'static str, value: String },

    /// Backslash in a name or path
    #[error("{what} '{value}' contains a backslash; use forward slashes")]
    Backslash { what: &'static str, value: String },

    /// Absolute path where a relative one is required
    #[error("path '{0}' must be relative to the project root")]
    AbsolutePath(String),

    /// Doubled or trailing separator in a path
    #[error("path '{0}' contains an empty segment; remove doubled or trailing separators")]
    EmptySegment(String),

    /// Character outside the allowed set
    #[error("{what} '{value}' contains characters outside [A-Za-z0-9._/-]")]
    IllegalCharacters { what: &'static str, value: String },

    /// Package name over the npm length limit
    #[error("package name '{name}' exceeds {limit} characters")]
    NameTooLong { name: String, limit: usize },

    /// Package name starting with a reserved character
    #[error("package name '{0}' must not start with '.' or '_'")]
    BadLeadingCharacter(String),

    /// Malformed scoped package name
    #[error("scoped package name '{0}' must be '@scope/name' with non-empty segments")]
    BadScopedName(String),

    /// Manifest over the read ceiling
    #[error("manifest at {path} exceeds {limit} bytes; refusing to parse")]
    ManifestTooLarge { path: PathBuf, limit: u64 },

    /// Manifest root is not a JSON object
    #[error("manifest at {0} is not a JSON object")]
    NotAnObject(PathBuf),

    /// Dependency field is not a flat map of strings
    #[error("'{field}' in {path} must map package names to version strings")]
    NotAStringMap { field: &'static str, path: PathBuf },

    /// Server bundle and client assets resolve to the same directory
    #[error("server bundle directory '{0}' is also the client assets directory; the two trees must not overlap")]
    ServerClientOverlap(String),

    /// Numeric run configuration value outside its allowed range
    #[error("run config: {field} is {value} but must be between {min} and {max}")]
    RunConfigOutOfRange {
        field: &'static str,
        value: f64,
        min: i64,
        max: i64,
    },

    /// Instance bounds crossed
    #[error("run config: minInstances ({min}) exceeds maxInstances ({max})")]
    InstanceBoundsInverted { min: i64, max: i64 },

    /// Manifest file sets share a directory tree
    #[error("output file sets overlap: '{server}' and '{statics}' cover the same tree")]
    OverlappingFileSets { server: String, statics: String },
}

/// Security detections that always abort bundle generation
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Resolved path lands outside the project root
    #[error("path '{candidate}' escapes the project root '{root}'")]
    PathEscapesRoot { candidate: PathBuf, root: PathBuf },

    /// Symbolic link where a regular file is required
    #[error("{what} at {path} is a symbolic link; refusing to read it")]
    Symlink { what: &'static str, path: PathBuf },

    /// Installed dependency directory is a symbolic link
    #[error("installed dependency '{package}' at {path} is a symbolic link")]
    SymlinkedDependency { package: String, path: PathBuf },

    /// Prototype-chain key in a parsed manifest
    #[error("manifest at {path} declares forbidden key '{key}'")]
    DangerousKey { key: String, path: PathBuf },

    /// Declared devDependencies over the scan ceiling
    #[error("manifest declares {count} devDependencies (limit {limit}); refusing to scan")]
    TooManyDevDependencies { count: usize, limit: usize },

    /// Development-only packages present in the installed tree
    #[error("{count} development-only dependencies are installed; run 'npm prune --omit=dev' or pass --allow-dev-dependencies")]
    DevDependenciesInstalled { count: usize },
}

/// Build output verification errors
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Verification reported fatal findings
    #[error("build output verification failed with {} error(s): {}", .errors.len(), .errors.join("; "))]
    BuildNotVerified { errors: Vec<String> },
}

impl GantryError {
    /// Get exit code for CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input(_) => 2,
            Self::Security(_) => 3,
            Self::Verify(_) => 4,
            Self::Io(_) => 5,
            Self::Json(_) => 6,
            Self::Yaml(_) => 6,
        }
    }
}
