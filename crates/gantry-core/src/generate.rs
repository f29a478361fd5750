//! One-shot bundle generation
//!
//! Ties the pipeline together: resolve the layout, verify the build output,
//! resolve versions, run the dependency guard, assemble the manifest. Fatal
//! conditions abort with an error; everything advisory accumulates into the
//! returned warnings in the order it was discovered.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::bundle::{self, AdapterInfo, BundleManifest, ResolvedVersions, RunOptions};
use crate::config::{self, LayoutOverrides, ResolvedLayout, Resolution};
use crate::depguard;
use crate::error::{Result, VerifyError};
use crate::verify::{self, VerificationReport};
use crate::versions::{self, FRAMEWORK_NAME};

/// Options controlling a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Layout overrides applied after config resolution
    pub layout: LayoutOverrides,
    /// Run configuration for the emitted manifest
    pub run: RunOptions,
    /// Skip the dependency guard
    pub allow_dev_dependencies: bool,
    /// Skip build output verification
    pub skip_verification: bool,
    /// Adapter identity for manifest metadata; defaults to this crate
    pub adapter: Option<AdapterInfo>,
}

/// Everything a generation run produced
#[derive(Debug, Clone)]
pub struct Generation {
    pub manifest: BundleManifest,
    pub layout: ResolvedLayout,
    /// Present unless verification was skipped
    pub report: Option<VerificationReport>,
    pub framework_version: Option<String>,
    pub warnings: Vec<String>,
}

/// Generate a deployment bundle manifest for a project
#[instrument(skip_all, fields(root = %project_root.display()))]
pub fn generate(project_root: &Path, options: &GenerateOptions) -> Result<Generation> {
    let Resolution {
        layout,
        mut warnings,
    } = config::resolve(project_root)?;
    let layout = config::apply_overrides(&layout, &options.layout)?;
    debug!(?layout, "effective layout");

    let report = if options.skip_verification {
        warnings.push(
            "build output verification skipped; bundle contents were not checked".to_string(),
        );
        None
    } else {
        let report = verify::verify(project_root, &layout)?;
        if !report.valid {
            return Err(VerifyError::BuildNotVerified {
                errors: report.errors,
            }
            .into());
        }
        warnings.extend(report.warnings.iter().cloned());
        Some(report)
    };

    let framework_version = match versions::resolve_framework_version(project_root)? {
        Some(version) if versions::is_concrete_version(&version) => Some(version),
        Some(version) => {
            warnings.push(format!(
                "installed {FRAMEWORK_NAME} version '{version}' is not a concrete release; omitting it from the manifest"
            ));
            None
        }
        None => {
            warnings.push(format!(
                "could not determine the installed {FRAMEWORK_NAME} version; the manifest will omit it"
            ));
            None
        }
    };

    depguard::assert_no_dev_tooling_installed(project_root, options.allow_dev_dependencies)?;

    let resolved_versions = ResolvedVersions {
        adapter: options.adapter.clone().unwrap_or_default(),
        framework_version: framework_version.clone(),
    };
    let effective_report = report.clone().unwrap_or_else(VerificationReport::assumed_valid);
    let manifest = bundle::assemble(&layout, &effective_report, &resolved_versions, &options.run)?;

    info!(
        framework_version = framework_version.as_deref().unwrap_or("unknown"),
        warnings = warnings.len(),
        "bundle manifest generated"
    );
    Ok(Generation {
        manifest,
        layout,
        report,
        framework_version,
        warnings,
    })
}
