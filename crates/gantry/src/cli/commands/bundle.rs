//! Bundle command

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use gantry_core::{generate, serialize, AdapterInfo, GenerateOptions};

use crate::cli::settings::Settings;
use crate::cli::{Cli, OutputFormat};

/// Generate the deployment bundle manifest
#[derive(Debug, Args)]
pub struct BundleCommand {
    /// Project root containing the built app
    #[arg(default_value = ".")]
    pub project_root: PathBuf,

    /// Manifest output path
    #[arg(short, long, default_value = "bundle.yaml")]
    pub output: PathBuf,

    /// Override the build output directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<String>,

    /// Override the server entry file name
    #[arg(long, value_name = "FILE")]
    pub server_file: Option<String>,

    /// Override the client assets directory
    #[arg(long, value_name = "DIR")]
    pub client_dir: Option<String>,

    /// Replace the derived run command verbatim
    #[arg(long, value_name = "CMD")]
    pub run_command: Option<String>,

    /// Emit client assets as a separate static file set
    #[arg(long)]
    pub split_assets: bool,

    /// Skip build output verification
    #[arg(long)]
    pub skip_verification: bool,

    /// Tolerate installed development dependencies
    #[arg(long)]
    pub allow_dev_dependencies: bool,
}

impl BundleCommand {
    /// Execute the bundle command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(root = %self.project_root.display(), "executing bundle command");
        let project_root = self.project_root.canonicalize().with_context(|| {
            format!("project root '{}' not found", self.project_root.display())
        })?;

        let options = self.generate_options(&project_root)?;
        let generation = match generate(&project_root, &options) {
            Ok(generation) => generation,
            Err(err) => {
                eprintln!("{} {err}", style("✗").red().bold());
                std::process::exit(err.exit_code());
            }
        };

        let text = serialize(&generation.manifest)?;
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.output, &text)
            .with_context(|| format!("could not write {}", self.output.display()))?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "manifest": self.output.to_string_lossy(),
                    "runCommand": generation.manifest.run_config.run_command,
                    "frameworkVersion": generation.framework_version,
                    "warnings": generation.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    if !generation.warnings.is_empty() {
                        println!("{}", style("Warnings:").yellow().bold());
                        for warning in &generation.warnings {
                            println!("  {} {}", style("!").yellow(), warning);
                        }
                        println!();
                    }
                    println!(
                        "{} {}",
                        style("✓ Bundle manifest written to").green().bold(),
                        style(self.output.display()).cyan()
                    );
                    if cli.verbose {
                        println!("  run command: {}", generation.manifest.run_config.run_command);
                        if let Some(version) = &generation.framework_version {
                            println!("  react-router: {version}");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Merge the settings file and CLI flags; flags win
    fn generate_options(&self, project_root: &Path) -> anyhow::Result<GenerateOptions> {
        let settings = Settings::load(project_root)?;

        let mut layout = settings.layout;
        if self.build_dir.is_some() {
            layout.build_directory = self.build_dir.clone();
        }
        if self.server_file.is_some() {
            layout.server_entry_file = self.server_file.clone();
        }
        if self.client_dir.is_some() {
            layout.client_assets_dir = self.client_dir.clone();
        }

        let mut run = settings.run_config;
        if self.run_command.is_some() {
            run.run_command = self.run_command.clone();
        }
        if self.split_assets {
            run.split_static_assets = true;
        }

        Ok(GenerateOptions {
            layout,
            run,
            allow_dev_dependencies: self.allow_dev_dependencies,
            skip_verification: self.skip_verification,
            adapter: Some(AdapterInfo::new(
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
            )),
        })
    }
}
