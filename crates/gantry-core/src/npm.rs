//! Hardened access to npm package manifests
//!
//! Manifests are attacker-influenced input: a compromised dependency can ship
//! an arbitrary `package.json`. Reads are bounded, symlinks are refused, and
//! only the fields Gantry needs are extracted. Everything else is discarded.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{InputError, Result, SecurityError};

/// Project manifest file name
pub const PROJECT_MANIFEST: &str = "package.json";

/// Installed dependency tree directory
pub const DEPENDENCY_TREE_DIR: &str = "node_modules";

/// Byte ceiling for any manifest read; real manifests are a few KB
pub const MANIFEST_MAX_BYTES: u64 = 64 * 1024;

/// Keys that interact with the prototype chain in JavaScript tooling
const DANGEROUS_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// The subset of package.json that Gantry reads
#[derive(Debug, Clone, Default)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub dependencies: HashMap<String, String>,
    pub dev_dependencies: HashMap<String, String>,
}

/// Read and parse a package manifest with hardening applied
///
/// The file must be a regular non-symlink file at most [`MANIFEST_MAX_BYTES`]
/// long whose root is a JSON object free of prototype-chain keys. The two
/// dependency fields must be flat maps of strings when present.
pub fn read_manifest(path: &Path) -> Result<PackageManifest> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Err(SecurityError::Symlink {
            what: "package manifest",
            path: path.to_path_buf(),
        }
        .into());
    }
    if meta.len() > MANIFEST_MAX_BYTES {
        return Err(InputError::ManifestTooLarge {
            path: path.to_path_buf(),
            limit: MANIFEST_MAX_BYTES,
        }
        .into());
    }

    let raw = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    let object = value
        .as_object()
        .ok_or_else(|| InputError::NotAnObject(path.to_path_buf()))?;

    for key in DANGEROUS_KEYS {
        if object.contains_key(*key) {
            return Err(SecurityError::DangerousKey {
                key: (*key).to_string(),
                path: path.to_path_buf(),
            }
            .into());
        }
    }

    let manifest = PackageManifest {
        name: string_field(object, "name"),
        version: string_field(object, "version"),
        dependencies: string_map(object, "dependencies", path)?,
        dev_dependencies: string_map(object, "devDependencies", path)?,
    };
    debug!(
        path = %path.display(),
        deps = manifest.dependencies.len(),
        dev_deps = manifest.dev_dependencies.len(),
        "parsed package manifest"
    );
    Ok(manifest)
}

fn string_field(object: &serde_json::Map<String, Value>, field: &str) -> Option<String> {
    object.get(field).and_then(Value::as_str).map(str::to_string)
}

fn string_map(
    object: &serde_json::Map<String, Value>,
    field: &'static str,
    path: &Path,
) -> Result<HashMap<String, String>> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(HashMap::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, version)| {
                version
                    .as_str()
                    .map(|v| (name.clone(), v.to_string()))
                    .ok_or_else(|| {
                        InputError::NotAStringMap {
                            field,
                            path: path.to_path_buf(),
                        }
                        .into()
                    })
            })
            .collect(),
        Some(_) => Err(InputError::NotAStringMap {
            field,
            path: path.to_path_buf(),
        }
        .into()),
    }
}
