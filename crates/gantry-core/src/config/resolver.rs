//! Layout resolution
//!
//! Resolution probes the project's framework config files in a fixed order,
//! extracts what it can, validates every extracted value, and fills the rest
//! from defaults. It never fails on a missing or unreadable config; it only
//! fails when a value it did extract is malformed.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{InputError, Result};
use crate::paths::{
    normalize_lexically, parent_dir, validate_directory_name, validate_relative_path,
};

use super::defaults::{
    CLIENT_SUBDIR, CONFIG_FILE_MAX_BYTES, DEFAULT_APP_SOURCE_DIR, DEFAULT_BUILD_DIRECTORY,
    DEFAULT_SERVER_ENTRY_FILE, LEGACY_CONFIG_FILES, MODERN_CONFIG_FILES, SERVER_SUBDIR,
};
use super::extract::{extract_legacy, extract_modern, ExtractedFields};
use super::types::{LayoutOverrides, ResolvedLayout};

/// A resolved layout plus anything the user should hear about
#[derive(Debug, Clone)]
pub struct Resolution {
    pub layout: ResolvedLayout,
    pub warnings: Vec<String>,
}

/// Resolve the effective build layout for a project
///
/// Modern config candidates are probed first; legacy candidates are only
/// consulted when no modern candidate yields a field. The first candidate
/// that yields at least one field wins and later candidates are ignored.
pub fn resolve(project_root: &Path) -> Result<Resolution> {
    let mut warnings = Vec::new();

    let fields = probe(project_root, MODERN_CONFIG_FILES, extract_modern, &mut warnings)
        .or_else(|| probe(project_root, LEGACY_CONFIG_FILES, extract_legacy, &mut warnings))
        .unwrap_or_default();

    let layout = derive_layout(&fields)?;
    debug!(?layout, "layout resolved");
    Ok(Resolution { layout, warnings })
}

fn probe(
    project_root: &Path,
    candidates: &[&str],
    extract: fn(&str) -> ExtractedFields,
    warnings: &mut Vec<String>,
) -> Option<ExtractedFields> {
    for name in candidates {
        let path = project_root.join(name);
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if !meta.is_file() {
            debug!(config = name, "candidate is not a regular file; skipping");
            continue;
        }
        if meta.len() > CONFIG_FILE_MAX_BYTES {
            warn!(config = name, size = meta.len(), "config file over size ceiling");
            warnings.push(format!(
                "config file '{name}' is larger than {} KiB; skipping it",
                CONFIG_FILE_MAX_BYTES / 1024
            ));
            continue;
        }
        let source = match std::fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                warnings.push(format!("config file '{name}' could not be read: {err}"));
                continue;
            }
        };
        let fields = extract(&source);
        if fields.is_empty() {
            warnings.push(format!(
                "no usable settings found in '{name}'; its values may be computed at runtime \
                 (set explicit overrides if the defaults are wrong)"
            ));
            continue;
        }
        debug!(config = name, fields = fields.field_count(), "using config file");
        return Some(fields);
    }
    None
}

fn derive_layout(fields: &ExtractedFields) -> Result<ResolvedLayout> {
    if let Some(value) = &fields.build_directory {
        validate_relative_path(value)?;
    }
    if let Some(value) = &fields.server_entry_file {
        validate_directory_name(value)?;
    }
    if let Some(value) = &fields.server_entry_path {
        validate_relative_path(value)?;
    }
    if let Some(value) = &fields.client_assets_dir {
        validate_relative_path(value)?;
    }
    if let Some(value) = &fields.app_source_dir {
        validate_relative_path(value)?;
    }

    // A legacy flat server path only applies when nothing modern set the
    // build directory or entry file; it is kept verbatim, not re-rooted
    // under a server subdirectory.
    let (build_directory, server_entry_file, server_entry_path) = match &fields.server_entry_path {
        Some(flat) if fields.build_directory.is_none() && fields.server_entry_file.is_none() => {
            let file = flat.rsplit_once('/').map(|(_, f)| f).unwrap_or(flat);
            (parent_dir(flat), file.to_string(), flat.clone())
        }
        _ => {
            let build = fields
                .build_directory
                .clone()
                .unwrap_or_else(|| DEFAULT_BUILD_DIRECTORY.to_string());
            let file = fields
                .server_entry_file
                .clone()
                .unwrap_or_else(|| DEFAULT_SERVER_ENTRY_FILE.to_string());
            let path = join_rel(&join_rel(&build, SERVER_SUBDIR), &file);
            (build, file, path)
        }
    };

    let client_assets_dir = fields
        .client_assets_dir
        .clone()
        .unwrap_or_else(|| join_rel(&build_directory, CLIENT_SUBDIR));
    let app_source_dir = fields
        .app_source_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_APP_SOURCE_DIR.to_string());

    let layout = ResolvedLayout {
        build_directory,
        server_entry_file,
        server_entry_path,
        client_assets_dir,
        app_source_dir,
    };
    ensure_server_client_distinct(&layout)?;
    Ok(layout)
}

/// Apply caller overrides on top of a resolved layout
///
/// Overriding the build directory or entry file invalidates the derived
/// paths, so both are recomputed from the effective values. An explicit
/// client assets override in the same set still wins over the recomputed
/// default.
pub fn apply_overrides(
    layout: &ResolvedLayout,
    overrides: &LayoutOverrides,
) -> Result<ResolvedLayout> {
    if overrides.is_empty() {
        return Ok(layout.clone());
    }

    if let Some(value) = &overrides.build_directory {
        validate_relative_path(value)?;
    }
    if let Some(value) = &overrides.server_entry_file {
        validate_directory_name(value)?;
    }
    if let Some(value) = &overrides.client_assets_dir {
        validate_relative_path(value)?;
    }
    if let Some(value) = &overrides.app_source_dir {
        validate_relative_path(value)?;
    }

    let rederive = overrides.build_directory.is_some() || overrides.server_entry_file.is_some();
    let build_directory = overrides
        .build_directory
        .clone()
        .unwrap_or_else(|| layout.build_directory.clone());
    let server_entry_file = overrides
        .server_entry_file
        .clone()
        .unwrap_or_else(|| layout.server_entry_file.clone());

    let (server_entry_path, client_assets_dir) = if rederive {
        (
            join_rel(&join_rel(&build_directory, SERVER_SUBDIR), &server_entry_file),
            overrides
                .client_assets_dir
                .clone()
                .unwrap_or_else(|| join_rel(&build_directory, CLIENT_SUBDIR)),
        )
    } else {
        (
            layout.server_entry_path.clone(),
            overrides
                .client_assets_dir
                .clone()
                .unwrap_or_else(|| layout.client_assets_dir.clone()),
        )
    };

    let out = ResolvedLayout {
        build_directory,
        server_entry_file,
        server_entry_path,
        client_assets_dir,
        app_source_dir: overrides
            .app_source_dir
            .clone()
            .unwrap_or_else(|| layout.app_source_dir.clone()),
    };
    ensure_server_client_distinct(&out)?;
    debug!(?out, "overrides applied");
    Ok(out)
}

fn join_rel(base: &str, child: &str) -> String {
    if base.is_empty() || base == "." {
        child.to_string()
    } else {
        format!("{base}/{child}")
    }
}

fn ensure_server_client_distinct(layout: &ResolvedLayout) -> Result<()> {
    let server_dir = parent_dir(&layout.server_entry_path);
    // "./x" and "x/." alias "x"; compare normalized forms, not raw strings.
    let server = normalize_lexically(Path::new(&server_dir));
    let client = normalize_lexically(Path::new(&layout.client_assets_dir));
    if server == client {
        return Err(InputError::ServerClientOverlap(server_dir).into());
    }
    Ok(())
}
