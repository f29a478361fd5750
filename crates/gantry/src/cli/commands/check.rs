//! Check command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use gantry_core::{apply_overrides, assert_no_dev_tooling_installed, resolve, verify};

use crate::cli::settings::Settings;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Check whether a project is ready to bundle
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Project root containing the built app
    #[arg(default_value = ".")]
    pub project_root: PathBuf,

    /// Override the build output directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<String>,

    /// Override the server entry file name
    #[arg(long, value_name = "FILE")]
    pub server_file: Option<String>,

    /// Override the client assets directory
    #[arg(long, value_name = "DIR")]
    pub client_dir: Option<String>,

    /// Tolerate installed development dependencies
    #[arg(long)]
    pub allow_dev_dependencies: bool,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(strict = self.strict, "executing check command");
        let project_root = self.project_root.canonicalize().with_context(|| {
            format!("project root '{}' not found", self.project_root.display())
        })?;

        let settings = Settings::load(&project_root)?;
        let mut overrides = settings.layout;
        if self.build_dir.is_some() {
            overrides.build_directory = self.build_dir.clone();
        }
        if self.server_file.is_some() {
            overrides.server_entry_file = self.server_file.clone();
        }
        if self.client_dir.is_some() {
            overrides.client_assets_dir = self.client_dir.clone();
        }

        let resolution = resolve(&project_root)?;
        let mut warnings = resolution.warnings;
        let layout = apply_overrides(&resolution.layout, &overrides)?;

        let report = verify(&project_root, &layout)?;
        let mut errors = report.errors.clone();
        warnings.extend(report.warnings.iter().cloned());

        if let Err(err) =
            assert_no_dev_tooling_installed(&project_root, self.allow_dev_dependencies)
        {
            errors.push(err.to_string());
        }

        // If strict, promote warnings to errors
        if self.strict {
            errors.append(&mut warnings);
        }

        let passed = errors.is_empty();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "serverEntry": layout.server_entry_path,
                    "clientAssetsDir": layout.client_assets_dir,
                    "hasManifest": report.has_manifest,
                    "hasDependencyTree": report.has_dependency_tree,
                    "errors": errors,
                    "warnings": warnings
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", style("Check Results").bold());
                    println!();
                    println!("Server entry:  {}", style(&layout.server_entry_path).cyan());
                    println!("Client assets: {}", style(&layout.client_assets_dir).cyan());
                    println!();

                    if !errors.is_empty() {
                        println!("{}", style("Errors:").red().bold());
                        for error in &errors {
                            println!("  {} {}", style("✗").red(), error);
                        }
                        println!();
                    }

                    if !warnings.is_empty() {
                        println!("{}", style("Warnings:").yellow().bold());
                        for warning in &warnings {
                            println!("  {} {}", style("!").yellow(), warning);
                        }
                        println!();
                    }

                    if passed {
                        if warnings.is_empty() {
                            println!("{}", style("✓ Ready to bundle").green().bold());
                        } else {
                            println!(
                                "{} with {} warning(s)",
                                style("✓ Ready to bundle").green().bold(),
                                warnings.len()
                            );
                        }
                    } else {
                        println!(
                            "{} with {} error(s)",
                            style("✗ Not ready to bundle").red().bold(),
                            errors.len()
                        );
                    }
                }
            }
        }

        if !passed {
            std::process::exit(exit_codes::VERIFICATION_FAILED);
        }

        Ok(())
    }
}
