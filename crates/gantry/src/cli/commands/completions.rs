//! Shell completions command

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use console::style;

use crate::cli::Cli;

const BIN_NAME: &str = "gantry";

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut command = Cli::command();
        match &self.output {
            Some(path) => {
                let mut file = std::fs::File::create(path)
                    .with_context(|| format!("could not create {}", path.display()))?;
                generate(self.shell, &mut command, BIN_NAME, &mut file);
                if !cli.quiet {
                    println!(
                        "{} {}",
                        style("✓ Completions written to").green().bold(),
                        style(path.display()).cyan()
                    );
                }
            }
            None => generate(self.shell, &mut command, BIN_NAME, &mut io::stdout()),
        }
        Ok(())
    }
}
