//! Bundle manifest assembly and serialization
//!
//! The manifest tells the deploy pipeline how to run the server and which
//! trees to package. Serialization is deterministic: struct field order is
//! the emitted key order, and optional fields are omitted rather than null.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ResolvedLayout;
use crate::error::{InputError, Result};
use crate::npm::{DEPENDENCY_TREE_DIR, PROJECT_MANIFEST};
use crate::paths::parent_dir;
use crate::verify::VerificationReport;
use crate::versions::FRAMEWORK_NAME;

/// Schema tag for the emitted manifest
pub const BUNDLE_SCHEMA_VERSION: &str = "v1";

/// Production server binary invoked by the default run command
pub const DEFAULT_SERVER_BIN: &str = "react-router-serve";

/// Adapter package name used when no identity is supplied
pub const ADAPTER_NAME: &str = "gantry";

/// Top-level deployment bundle manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub version: String,
    pub run_config: RunConfig,
    pub output_files: OutputFiles,
    pub metadata: BundleMetadata,
}

/// Validated runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub run_command: String,
    pub min_instances: i64,
    pub max_instances: i64,
    pub concurrency: i64,
    pub cpu_count: i64,
    #[serde(rename = "memoryMiB")]
    pub memory_mib: i64,
}

/// File sets the packager copies into the deployed image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFiles {
    pub server_app: FileSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_assets: Option<FileSet>,
}

/// One ordered, duplicate-free list of project-relative paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSet {
    pub include: Vec<String>,
}

/// Provenance stamped into the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    pub adapter_name: String,
    pub adapter_version: String,
    pub framework: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_version: Option<String>,
}

/// Identity of the adapter producing the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    pub name: String,
    pub version: String,
}

impl AdapterInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl Default for AdapterInfo {
    fn default() -> Self {
        Self::new(ADAPTER_NAME, env!("CARGO_PKG_VERSION"))
    }
}

/// Version metadata feeding [`assemble`]
#[derive(Debug, Clone, Default)]
pub struct ResolvedVersions {
    pub adapter: AdapterInfo,
    pub framework_version: Option<String>,
}

/// Caller-supplied run configuration
///
/// Unset numeric fields take their documented defaults. Values are accepted
/// as floats, range-checked on the raw value, then floored to integers, so
/// `100.5` for a field capped at 100 is out of range rather than rounded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunOptions {
    /// Replace the derived run command verbatim
    pub run_command: Option<String>,
    /// Minimum serving instances, 0 to 100, default 0
    pub min_instances: Option<f64>,
    /// Maximum serving instances, 1 to 1000, default 100
    pub max_instances: Option<f64>,
    /// Concurrent requests per instance, 1 to 1000, default 80
    pub concurrency: Option<f64>,
    /// CPUs per instance, 1 to 8, default 1
    pub cpu_count: Option<f64>,
    /// Memory per instance in MiB, 128 to 32768, default 512
    #[serde(rename = "memoryMiB")]
    pub memory_mib: Option<f64>,
    /// Emit client assets as a separate static file set
    pub split_static_assets: bool,
}

impl RunConfig {
    /// Validate and default a caller-supplied run configuration
    pub fn from_options(options: &RunOptions, server_entry_path: &str) -> Result<Self> {
        let min_instances = bounded("minInstances", options.min_instances, 0, 0, 100)?;
        let max_instances = bounded("maxInstances", options.max_instances, 100, 1, 1000)?;
        if min_instances > max_instances {
            return Err(InputError::InstanceBoundsInverted {
                min: min_instances,
                max: max_instances,
            }
            .into());
        }
        let concurrency = bounded("concurrency", options.concurrency, 80, 1, 1000)?;
        let cpu_count = bounded("cpuCount", options.cpu_count, 1, 1, 8)?;
        let memory_mib = bounded("memoryMiB", options.memory_mib, 512, 128, 32768)?;

        let run_command = match &options.run_command {
            Some(command) => command.clone(),
            None => default_run_command(server_entry_path),
        };

        Ok(Self {
            run_command,
            min_instances,
            max_instances,
            concurrency,
            cpu_count,
            memory_mib,
        })
    }
}

fn bounded(
    field: &'static str,
    value: Option<f64>,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64> {
    let Some(raw) = value else {
        return Ok(default);
    };
    if !raw.is_finite() || raw < min as f64 || raw > max as f64 {
        return Err(InputError::RunConfigOutOfRange {
            field,
            value: raw,
            min,
            max,
        }
        .into());
    }
    Ok(raw.floor() as i64)
}

/// Build the default run command for a server entry
///
/// Operands are quoted only when they contain whitespace, so the common
/// case stays clean.
pub fn default_run_command(server_entry_path: &str) -> String {
    format!(
        "{} {}",
        quote_operand(DEFAULT_SERVER_BIN),
        quote_operand(server_entry_path)
    )
}

fn quote_operand(operand: &str) -> String {
    if operand.chars().any(char::is_whitespace) {
        format!("\"{operand}\"")
    } else {
        operand.to_string()
    }
}

/// Assemble a bundle manifest from the pipeline's outputs
///
/// The verification report must be valid; callers gate on verification
/// before assembling. File sets are derived from the layout: the server
/// bundle directory, the client assets, the project manifest, and the
/// installed dependency tree.
pub fn assemble(
    layout: &ResolvedLayout,
    verification: &VerificationReport,
    versions: &ResolvedVersions,
    options: &RunOptions,
) -> Result<BundleManifest> {
    if !verification.valid {
        return Err(crate::error::VerifyError::BuildNotVerified {
            errors: verification.errors.clone(),
        }
        .into());
    }

    let run_config = RunConfig::from_options(options, &layout.server_entry_path)?;
    let output_files = output_files_for(layout, options.split_static_assets)?;
    let metadata = BundleMetadata {
        adapter_name: versions.adapter.name.clone(),
        adapter_version: versions.adapter.version.clone(),
        framework: FRAMEWORK_NAME.to_string(),
        framework_version: versions.framework_version.clone(),
    };

    debug!(
        run_command = %run_config.run_command,
        split = options.split_static_assets,
        "bundle manifest assembled"
    );
    Ok(BundleManifest {
        version: BUNDLE_SCHEMA_VERSION.to_string(),
        run_config,
        output_files,
        metadata,
    })
}

/// Serialize a manifest to YAML
pub fn serialize(manifest: &BundleManifest) -> Result<String> {
    Ok(serde_yaml::to_string(manifest)?)
}

fn output_files_for(layout: &ResolvedLayout, split: bool) -> Result<OutputFiles> {
    let server_dir = parent_dir(&layout.server_entry_path);
    let mut server_includes = vec![
        server_dir,
        layout.client_assets_dir.clone(),
        PROJECT_MANIFEST.to_string(),
        DEPENDENCY_TREE_DIR.to_string(),
    ];

    let static_assets = if split {
        server_includes.retain(|path| path != &layout.client_assets_dir);
        Some(FileSet {
            include: vec![layout.client_assets_dir.clone()],
        })
    } else {
        None
    };

    let output = OutputFiles {
        server_app: FileSet {
            include: collapse_includes(server_includes),
        },
        static_assets,
    };
    ensure_disjoint(&output)?;
    Ok(output)
}

/// Drop duplicates and entries already covered by an ancestor in the list
fn collapse_includes(paths: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();
    for path in paths {
        if kept.iter().any(|k| k == &path || covers(k, &path)) {
            continue;
        }
        kept.retain(|k| !covers(&path, k));
        kept.push(path);
    }
    kept
}

/// Whether `ancestor` is the same tree as `path` or contains it
fn covers(ancestor: &str, path: &str) -> bool {
    ancestor == path || path.starts_with(&format!("{ancestor}/"))
}

fn ensure_disjoint(output: &OutputFiles) -> Result<()> {
    let Some(statics) = &output.static_assets else {
        return Ok(());
    };
    for server_path in &output.server_app.include {
        for static_path in &statics.include {
            if covers(server_path, static_path) || covers(static_path, server_path) {
                return Err(InputError::OverlappingFileSets {
                    server: server_path.clone(),
                    statics: static_path.clone(),
                }
                .into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions() -> ResolvedVersions {
        ResolvedVersions {
            adapter: AdapterInfo::new("gantry", "0.2.1"),
            framework_version: Some("7.1.3".to_string()),
        }
    }

    #[test]
    fn test_run_config_defaults() {
        let config = RunConfig::from_options(&RunOptions::default(), "build/server/index.js")
            .unwrap();
        assert_eq!(config.run_command, "react-router-serve build/server/index.js");
        assert_eq!(config.min_instances, 0);
        assert_eq!(config.max_instances, 100);
        assert_eq!(config.concurrency, 80);
        assert_eq!(config.cpu_count, 1);
        assert_eq!(config.memory_mib, 512);
    }

    #[test]
    fn test_run_command_quotes_whitespace() {
        let command = default_run_command("build output/server/index.js");
        assert_eq!(command, "react-router-serve \"build output/server/index.js\"");
    }

    #[test]
    fn test_explicit_run_command_verbatim() {
        let options = RunOptions {
            run_command: Some("node ./custom-server.mjs --port 8080".to_string()),
            ..Default::default()
        };
        let config = RunConfig::from_options(&options, "build/server/index.js").unwrap();
        assert_eq!(config.run_command, "node ./custom-server.mjs --port 8080");
    }

    #[test]
    fn test_numeric_values_floored_after_range_check() {
        let options = RunOptions {
            concurrency: Some(7.9),
            ..Default::default()
        };
        let config = RunConfig::from_options(&options, "x").unwrap();
        assert_eq!(config.concurrency, 7);

        // 100.5 floors to an in-range value but the raw value is out of range.
        let options = RunOptions {
            min_instances: Some(100.5),
            ..Default::default()
        };
        assert!(RunConfig::from_options(&options, "x").is_err());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        for (field, make) in [
            ("minInstances", RunOptions {
                min_instances: Some(-1.0),
                ..Default::default()
            }),
            ("maxInstances", RunOptions {
                max_instances: Some(0.0),
                ..Default::default()
            }),
            ("concurrency", RunOptions {
                concurrency: Some(1001.0),
                ..Default::default()
            }),
            ("cpuCount", RunOptions {
                cpu_count: Some(9.0),
                ..Default::default()
            }),
            ("memoryMiB", RunOptions {
                memory_mib: Some(64.0),
                ..Default::default()
            }),
        ] {
            assert!(
                RunConfig::from_options(&make, "x").is_err(),
                "{field} should be out of range"
            );
        }
    }

    #[test]
    fn test_nan_rejected() {
        let options = RunOptions {
            cpu_count: Some(f64::NAN),
            ..Default::default()
        };
        assert!(RunConfig::from_options(&options, "x").is_err());
    }

    #[test]
    fn test_inverted_instance_bounds_rejected() {
        let options = RunOptions {
            min_instances: Some(10.0),
            max_instances: Some(5.0),
            ..Default::default()
        };
        assert!(RunConfig::from_options(&options, "x").is_err());
    }

    #[test]
    fn test_assemble_merged_file_sets() {
        let layout = ResolvedLayout::default();
        let manifest = assemble(
            &layout,
            &VerificationReport::assumed_valid(),
            &versions(),
            &RunOptions::default(),
        )
        .unwrap();

        assert_eq!(manifest.version, "v1");
        assert!(manifest.output_files.static_assets.is_none());
        assert_eq!(
            manifest.output_files.server_app.include,
            vec!["build/server", "build/client", "package.json", "node_modules"]
        );
        assert_eq!(manifest.metadata.framework, "react-router");
        assert_eq!(manifest.metadata.framework_version.as_deref(), Some("7.1.3"));
    }

    #[test]
    fn test_assemble_split_file_sets() {
        let layout = ResolvedLayout::default();
        let options = RunOptions {
            split_static_assets: true,
            ..Default::default()
        };
        let manifest = assemble(
            &layout,
            &VerificationReport::assumed_valid(),
            &versions(),
            &options,
        )
        .unwrap();

        assert_eq!(
            manifest.output_files.server_app.include,
            vec!["build/server", "package.json", "node_modules"]
        );
        let statics = manifest.output_files.static_assets.unwrap();
        assert_eq!(statics.include, vec!["build/client"]);
    }

    #[test]
    fn test_split_rejects_nested_trees() {
        // Legacy flat layout: the server dir is the build root, which
        // contains the derived client dir.
        let layout = ResolvedLayout {
            build_directory: "build".to_string(),
            server_entry_file: "index.js".to_string(),
            server_entry_path: "build/index.js".to_string(),
            client_assets_dir: "build/client".to_string(),
            app_source_dir: "app".to_string(),
        };
        let options = RunOptions {
            split_static_assets: true,
            ..Default::default()
        };
        let err = assemble(
            &layout,
            &VerificationReport::assumed_valid(),
            &versions(),
            &options,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::GantryError::Input(InputError::OverlappingFileSets { .. })
        ));
    }

    #[test]
    fn test_merged_collapses_nested_trees() {
        let layout = ResolvedLayout {
            build_directory: "build".to_string(),
            server_entry_file: "index.js".to_string(),
            server_entry_path: "build/index.js".to_string(),
            client_assets_dir: "build/client".to_string(),
            app_source_dir: "app".to_string(),
        };
        let manifest = assemble(
            &layout,
            &VerificationReport::assumed_valid(),
            &versions(),
            &RunOptions::default(),
        )
        .unwrap();

        assert_eq!(
            manifest.output_files.server_app.include,
            vec!["build", "package.json", "node_modules"]
        );
    }

    #[test]
    fn test_assemble_refuses_invalid_report() {
        let layout = ResolvedLayout::default();
        let report = VerificationReport {
            valid: false,
            errors: vec!["server entry 'build/server/index.js' not found".to_string()],
            ..VerificationReport::assumed_valid()
        };
        assert!(assemble(&layout, &report, &versions(), &RunOptions::default()).is_err());
    }

    #[test]
    fn test_manifest_round_trip() {
        let layout = ResolvedLayout::default();
        let versions = ResolvedVersions {
            adapter: AdapterInfo::new("gantry", "0.2.1"),
            framework_version: None,
        };
        let manifest = assemble(
            &layout,
            &VerificationReport::assumed_valid(),
            &versions,
            &RunOptions::default(),
        )
        .unwrap();

        let text = serialize(&manifest).unwrap();
        assert!(text.contains("version: v1"));
        assert!(text.contains("runCommand: react-router-serve build/server/index.js"));
        assert!(text.contains("memoryMiB: 512"));
        // No version resolved, no key at all.
        assert!(!text.contains("frameworkVersion"));

        let parsed: BundleManifest = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.run_config, manifest.run_config);
        assert_eq!(parsed.metadata.adapter_name, "gantry");
        assert!(parsed.metadata.framework_version.is_none());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let layout = ResolvedLayout::default();
        let manifest = assemble(
            &layout,
            &VerificationReport::assumed_valid(),
            &versions(),
            &RunOptions::default(),
        )
        .unwrap();

        let first = serialize(&manifest).unwrap();
        let second = serialize(&manifest).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("version: v1\n"));
    }
}
