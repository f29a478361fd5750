//! Gantry Core - Deployment bundle generation for React Router apps
//!
//! This crate resolves a project's effective build layout from its framework
//! config, verifies the built output on disk, guards against shipping
//! development tooling, and assembles the deployment bundle manifest the
//! hosting pipeline consumes.

pub mod bundle;
pub mod config;
pub mod depguard;
pub mod error;
pub mod generate;
pub mod npm;
pub mod paths;
pub mod verify;
pub mod versions;

pub use bundle::{
    assemble, default_run_command, serialize, AdapterInfo, BundleManifest, BundleMetadata,
    FileSet, OutputFiles, ResolvedVersions, RunConfig, RunOptions, BUNDLE_SCHEMA_VERSION,
};
pub use config::{apply_overrides, resolve, LayoutOverrides, ResolvedLayout, Resolution};
pub use depguard::assert_no_dev_tooling_installed;
pub use error::{GantryError, InputError, Result, SecurityError, VerifyError};
pub use generate::{generate, GenerateOptions, Generation};
pub use npm::{read_manifest, PackageManifest};
pub use paths::{
    confine_to_root, validate_directory_name, validate_package_name, validate_relative_path,
};
pub use verify::{verify, VerificationReport};
pub use versions::{
    is_concrete_version, resolve_adapter_version, resolve_framework_version,
    resolve_package_version, FRAMEWORK_NAME,
};
