//! Dependency guard
//!
//! A production bundle must not ship development tooling. The guard reads
//! the project manifest's declared devDependencies and fails when any of
//! them is still present in the installed tree. The check answers "is dev
//! tooling installed", not "is the install exactly production"; packages
//! absent from the manifest are out of scope.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::{Result, SecurityError};
use crate::npm::{self, DEPENDENCY_TREE_DIR, PROJECT_MANIFEST};
use crate::paths::{confine_to_root, validate_package_name};

/// Ceiling on declared devDependencies; more than this is not a real project
pub const DEV_DEPENDENCY_LIMIT: usize = 1_000;

/// Fail when development-only dependencies are installed
///
/// With `allow_dev_dependencies` set the check is skipped entirely and only
/// a log line records the fact. Every declared name is validated before it
/// is turned into a path, and a dev dependency whose install directory is a
/// symlink is rejected outright rather than counted.
#[instrument(skip_all, fields(root = %project_root.display()))]
pub fn assert_no_dev_tooling_installed(
    project_root: &Path,
    allow_dev_dependencies: bool,
) -> Result<()> {
    if allow_dev_dependencies {
        warn!("dev dependency check disabled; development tooling may ship with the bundle");
        return Ok(());
    }

    let manifest = npm::read_manifest(&project_root.join(PROJECT_MANIFEST))?;
    let declared = &manifest.dev_dependencies;
    if declared.is_empty() {
        debug!("no devDependencies declared");
        return Ok(());
    }
    if declared.len() > DEV_DEPENDENCY_LIMIT {
        return Err(SecurityError::TooManyDevDependencies {
            count: declared.len(),
            limit: DEV_DEPENDENCY_LIMIT,
        }
        .into());
    }

    let node_modules = project_root.join(DEPENDENCY_TREE_DIR);
    let mut installed = 0usize;
    for name in declared.keys() {
        validate_package_name(name)?;
        let location = confine_to_root(Path::new(name.as_str()), &node_modules)?;
        let meta = match std::fs::symlink_metadata(&location) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if meta.file_type().is_symlink() {
            return Err(SecurityError::SymlinkedDependency {
                package: name.clone(),
                path: location,
            }
            .into());
        }
        debug!(package = %name, "development dependency is installed");
        installed += 1;
    }

    if installed > 0 {
        return Err(SecurityError::DevDependenciesInstalled { count: installed }.into());
    }
    debug!(declared = declared.len(), "no development dependencies installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GantryError;
    use tempfile::TempDir;

    fn write_project_manifest(root: &Path, dev_deps: &[(&str, &str)]) {
        let entries: Vec<String> = dev_deps
            .iter()
            .map(|(name, version)| format!(r#""{name}": "{version}""#))
            .collect();
        std::fs::write(
            root.join(PROJECT_MANIFEST),
            format!(
                r#"{{"name": "my-app", "devDependencies": {{{}}}}}"#,
                entries.join(", ")
            ),
        )
        .unwrap();
    }

    fn install(root: &Path, name: &str) {
        let dir = root.join(DEPENDENCY_TREE_DIR).join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(PROJECT_MANIFEST), r#"{"name": "x"}"#).unwrap();
    }

    #[test]
    fn test_clean_production_install_passes() {
        let temp = TempDir::new().unwrap();
        write_project_manifest(temp.path(), &[("vite", "^6.0.0"), ("typescript", "~5.6.2")]);
        install(temp.path(), "react-router");

        assert!(assert_no_dev_tooling_installed(temp.path(), false).is_ok());
    }

    #[test]
    fn test_installed_dev_dependency_fails() {
        let temp = TempDir::new().unwrap();
        write_project_manifest(temp.path(), &[("vite", "^6.0.0"), ("typescript", "~5.6.2")]);
        install(temp.path(), "vite");

        let err = assert_no_dev_tooling_installed(temp.path(), false).unwrap_err();
        match err {
            GantryError::Security(SecurityError::DevDependenciesInstalled { count }) => {
                assert_eq!(count, 1)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scoped_dev_dependency_detected() {
        let temp = TempDir::new().unwrap();
        write_project_manifest(temp.path(), &[("@react-router/dev", "^7.0.0")]);
        install(temp.path(), "@react-router/dev");

        assert!(assert_no_dev_tooling_installed(temp.path(), false).is_err());
    }

    #[test]
    fn test_allow_flag_skips_check() {
        let temp = TempDir::new().unwrap();
        write_project_manifest(temp.path(), &[("vite", "^6.0.0")]);
        install(temp.path(), "vite");

        assert!(assert_no_dev_tooling_installed(temp.path(), true).is_ok());
    }

    #[test]
    fn test_no_dev_dependencies_declared() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(PROJECT_MANIFEST), r#"{"name": "my-app"}"#).unwrap();

        assert!(assert_no_dev_tooling_installed(temp.path(), false).is_ok());
    }

    #[test]
    fn test_missing_manifest_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(assert_no_dev_tooling_installed(temp.path(), false).is_err());
    }

    #[test]
    fn test_malicious_dev_dependency_name_fails() {
        let temp = TempDir::new().unwrap();
        write_project_manifest(temp.path(), &[("../../../etc/passwd", "1.0.0")]);

        let err = assert_no_dev_tooling_installed(temp.path(), false).unwrap_err();
        assert!(matches!(err, GantryError::Input(_)));
    }

    #[test]
    fn test_declared_ceiling_enforced() {
        let temp = TempDir::new().unwrap();
        let names: Vec<(String, &str)> = (0..=DEV_DEPENDENCY_LIMIT)
            .map(|i| (format!("pkg-{i}"), "1.0.0"))
            .collect();
        let pairs: Vec<(&str, &str)> = names.iter().map(|(n, v)| (n.as_str(), *v)).collect();
        write_project_manifest(temp.path(), &pairs);

        let err = assert_no_dev_tooling_installed(temp.path(), false).unwrap_err();
        assert!(matches!(
            err,
            GantryError::Security(SecurityError::TooManyDevDependencies { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dev_dependency_rejected() {
        let temp = TempDir::new().unwrap();
        write_project_manifest(temp.path(), &[("vite", "^6.0.0")]);
        let real = temp.path().join("elsewhere");
        std::fs::create_dir_all(&real).unwrap();
        std::fs::create_dir_all(temp.path().join(DEPENDENCY_TREE_DIR)).unwrap();
        std::os::unix::fs::symlink(&real, temp.path().join(DEPENDENCY_TREE_DIR).join("vite"))
            .unwrap();

        let err = assert_no_dev_tooling_installed(temp.path(), false).unwrap_err();
        assert!(matches!(
            err,
            GantryError::Security(SecurityError::SymlinkedDependency { .. })
        ));
    }
}
