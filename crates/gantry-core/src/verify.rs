//! Build output verification
//!
//! Verification inspects the filesystem against a resolved layout and
//! reports everything wrong at once; it does not stop at the first
//! finding. Fatal findings land in `errors`, advisory ones in `warnings`.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::config::ResolvedLayout;
use crate::error::Result;
use crate::npm::{DEPENDENCY_TREE_DIR, PROJECT_MANIFEST};
use crate::paths::{confine_to_root, parent_dir};

/// File name patterns that suggest secrets in the build output
const SECRET_FILE_PATTERNS: &[&str] = &[".env", ".env.*"];

/// Sample files that are safe to ship despite matching the patterns
const SECRET_FILE_ALLOWLIST: &[&str] = &[".env.example", ".env.sample", ".env.template"];

/// Outcome of verifying a project's build output
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Whether no fatal findings were recorded
    pub valid: bool,
    /// Fatal findings; non-empty exactly when `valid` is false
    pub errors: Vec<String>,
    /// Advisory findings; never affect `valid`
    pub warnings: Vec<String>,
    /// Absolute path of the verified server entry, set only when valid
    pub server_entry: Option<PathBuf>,
    /// Absolute path of the verified client assets directory, set only when valid
    pub client_dir: Option<PathBuf>,
    /// Whether the project manifest is present and regular
    pub has_manifest: bool,
    /// Whether the installed dependency tree is present
    pub has_dependency_tree: bool,
}

impl VerificationReport {
    /// Report used when the caller disables verification outright
    pub fn assumed_valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            server_entry: None,
            client_dir: None,
            has_manifest: false,
            has_dependency_tree: false,
        }
    }
}

/// Verify the build output of a project against its resolved layout
///
/// Every check runs; findings accumulate. The only hard failures here are
/// layout paths that escape the project root, which abort immediately.
#[instrument(skip_all, fields(root = %project_root.display()))]
pub fn verify(project_root: &Path, layout: &ResolvedLayout) -> Result<VerificationReport> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let server_entry = confine_to_root(Path::new(&layout.server_entry_path), project_root)?;
    let client_dir = confine_to_root(Path::new(&layout.client_assets_dir), project_root)?;
    let build_root = confine_to_root(Path::new(&layout.build_directory), project_root)?;

    check_server_entry(&server_entry, &layout.server_entry_path, &mut errors);
    check_server_dir(
        &parent_abs(&server_entry, project_root),
        &parent_dir(&layout.server_entry_path),
        &mut errors,
    );
    check_client_dir(&client_dir, &layout.client_assets_dir, &mut errors, &mut warnings);
    let has_manifest = check_manifest(project_root, &mut errors);
    let has_dependency_tree = check_dependency_tree(project_root, &mut warnings);
    scan_for_secret_files(&build_root, project_root, &mut warnings);

    let valid = errors.is_empty();
    debug!(valid, errors = errors.len(), warnings = warnings.len(), "verification finished");
    Ok(VerificationReport {
        valid,
        server_entry: valid.then_some(server_entry),
        client_dir: valid.then_some(client_dir),
        errors,
        warnings,
        has_manifest,
        has_dependency_tree,
    })
}

fn parent_abs(path: &Path, fallback: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_else(|| fallback.to_path_buf())
}

fn check_server_entry(path: &Path, shown: &str, errors: &mut Vec<String>) {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => {
            errors.push(format!(
                "server entry '{shown}' not found; run the framework build first"
            ));
            return;
        }
    };
    if meta.file_type().is_symlink() {
        errors.push(format!(
            "server entry '{shown}' is a symbolic link; refusing to package it"
        ));
        return;
    }
    if !meta.is_file() {
        errors.push(format!("server entry '{shown}' is not a regular file"));
        return;
    }
    if meta.len() == 0 {
        errors.push(format!("server entry '{shown}' is empty"));
    }
}

fn check_server_dir(path: &Path, shown: &str, errors: &mut Vec<String>) {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => {
            errors.push(format!("server build directory '{shown}' not found"));
            return;
        }
    };
    if meta.file_type().is_symlink() {
        errors.push(format!("server build directory '{shown}' is a symbolic link"));
        return;
    }
    if !meta.is_dir() {
        errors.push(format!("server build directory '{shown}' is not a directory"));
    }
}

fn check_client_dir(
    path: &Path,
    shown: &str,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(_) => {
            errors.push(format!(
                "client assets directory '{shown}' not found; run the framework build first"
            ));
            return;
        }
    };
    if meta.file_type().is_symlink() {
        errors.push(format!(
            "client assets directory '{shown}' is a symbolic link; refusing to package it"
        ));
        return;
    }
    if !meta.is_dir() {
        errors.push(format!("client assets directory '{shown}' is not a directory"));
        return;
    }

    let visible = match std::fs::read_dir(path) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .count(),
        Err(err) => {
            warnings.push(format!("client assets directory '{shown}' could not be listed: {err}"));
            return;
        }
    };
    if visible == 0 {
        warnings.push(format!(
            "client assets directory '{shown}' contains no visible files; the build may be incomplete"
        ));
    }
}

fn check_manifest(project_root: &Path, errors: &mut Vec<String>) -> bool {
    let path = project_root.join(PROJECT_MANIFEST);
    match std::fs::symlink_metadata(&path) {
        Err(_) => {
            errors.push(format!("{PROJECT_MANIFEST} not found in the project root"));
            false
        }
        Ok(meta) if meta.file_type().is_symlink() => {
            errors.push(format!("{PROJECT_MANIFEST} is a symbolic link; refusing to package it"));
            false
        }
        Ok(meta) if !meta.is_file() => {
            errors.push(format!("{PROJECT_MANIFEST} is not a regular file"));
            false
        }
        Ok(_) => true,
    }
}

fn check_dependency_tree(project_root: &Path, warnings: &mut Vec<String>) -> bool {
    let path = project_root.join(DEPENDENCY_TREE_DIR);
    match std::fs::symlink_metadata(&path) {
        Err(_) => {
            warnings.push(format!(
                "{DEPENDENCY_TREE_DIR} not found; install production dependencies before deploying"
            ));
            false
        }
        Ok(meta) if meta.file_type().is_symlink() => {
            warnings.push(format!("{DEPENDENCY_TREE_DIR} is a symbolic link"));
            true
        }
        Ok(_) => true,
    }
}

/// Walk the build output looking for environment files that would leak secrets
fn scan_for_secret_files(build_root: &Path, project_root: &Path, warnings: &mut Vec<String>) {
    if !build_root.is_dir() {
        return;
    }
    let patterns: Vec<glob::Pattern> = SECRET_FILE_PATTERNS
        .iter()
        .filter_map(|p| glob::Pattern::new(p).ok())
        .collect();

    for entry in WalkDir::new(build_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if SECRET_FILE_ALLOWLIST.contains(&name.as_ref()) {
            continue;
        }
        if patterns.iter().any(|p| p.matches(&name)) {
            let shown = entry
                .path()
                .strip_prefix(project_root)
                .unwrap_or_else(|_| entry.path());
            warnings.push(format!(
                "environment file '{}' found in the build output; secrets must not be shipped",
                shown.display()
            ));
        }
    }
}
