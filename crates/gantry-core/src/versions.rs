//! Version resolution from the installed dependency tree
//!
//! Versions come from installed package manifests under `node_modules`, never
//! from declared version ranges in the project manifest. An installed manifest
//! records the exact version on disk; the project manifest only records what
//! was requested.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::npm::{self, DEPENDENCY_TREE_DIR, PROJECT_MANIFEST};
use crate::paths::{confine_to_root, validate_package_name};

/// Framework name stamped into bundle metadata
pub const FRAMEWORK_NAME: &str = "react-router";

/// Version reported when the adapter's own version cannot be determined
pub const UNKNOWN_VERSION: &str = "0.0.0";

/// Packages consulted for the installed framework version, in order
///
/// The core runtime comes first, then the UI integration, then dev tooling
/// and the serve adapters. The first installed candidate wins.
pub const FRAMEWORK_VERSION_PACKAGES: &[&str] = &[
    "react-router",
    "react-router-dom",
    "@react-router/dev",
    "@react-router/serve",
    "@react-router/node",
    "@react-router/express",
];

/// Read the installed version of one package
///
/// Returns `Ok(None)` when the package is not installed or its manifest is
/// unusable; a manifest that is missing, oversized, symlinked, or malformed
/// makes the version unknown, it does not abort resolution. An invalid
/// package name is still an error.
pub fn resolve_package_version(project_root: &Path, package: &str) -> Result<Option<String>> {
    validate_package_name(package)?;

    let node_modules = project_root.join(DEPENDENCY_TREE_DIR);
    let manifest_path = confine_to_root(
        &Path::new(package).join(PROJECT_MANIFEST),
        &node_modules,
    )?;

    if std::fs::symlink_metadata(&manifest_path).is_err() {
        return Ok(None);
    }
    match npm::read_manifest(&manifest_path) {
        Ok(manifest) => match manifest.version {
            Some(version) => {
                debug!(package, version = %version, "resolved installed version");
                Ok(Some(version))
            }
            None => {
                debug!(package, "installed manifest has no version field");
                Ok(None)
            }
        },
        Err(err) => {
            debug!(package, error = %err, "skipping unusable installed manifest");
            Ok(None)
        }
    }
}

/// Infer the installed framework version
///
/// Walks [`FRAMEWORK_VERSION_PACKAGES`] and returns the first version found,
/// or `Ok(None)` when no candidate is installed.
pub fn resolve_framework_version(project_root: &Path) -> Result<Option<String>> {
    for package in FRAMEWORK_VERSION_PACKAGES {
        if let Some(version) = resolve_package_version(project_root, package)? {
            debug!(package, version = %version, "framework version inferred");
            return Ok(Some(version));
        }
    }
    debug!("no framework package installed");
    Ok(None)
}

/// Read the adapter's own version from an npm wrapper install
///
/// Used when Gantry ships as a platform npm package and the wrapper's
/// manifest is the authoritative version. Falls back to [`UNKNOWN_VERSION`]
/// when the manifest is unusable or carries a range instead of a release.
pub fn resolve_adapter_version(adapter_root: &Path) -> String {
    let manifest_path = adapter_root.join(PROJECT_MANIFEST);
    match npm::read_manifest(&manifest_path) {
        Ok(manifest) => match manifest.version {
            Some(version) if is_concrete_version(&version) => version,
            Some(version) => {
                debug!(version = %version, "adapter manifest version is not a concrete release");
                UNKNOWN_VERSION.to_string()
            }
            None => UNKNOWN_VERSION.to_string(),
        },
        Err(err) => {
            debug!(error = %err, "adapter manifest unusable");
            UNKNOWN_VERSION.to_string()
        }
    }
}

/// Whether a version string is a concrete release rather than a range
///
/// `1.2.3` and `1.2.3-beta.1` are concrete; `^1.2.3`, `~1.2`, and `>=2`
/// are ranges.
pub fn is_concrete_version(version: &str) -> bool {
    semver::Version::parse(version).is_ok()
}
