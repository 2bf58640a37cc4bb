//! Inspect and check coefficient tables

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use utmi_core::CoefficientTable;

#[derive(Subcommand, Debug)]
pub enum CoefficientsCommand {
    /// Print the effective table (defaults, file, environment) as TOML
    Show,

    /// Validate a coefficient file layered over the defaults
    Check {
        /// TOML file to check
        file: PathBuf,
    },
}

/// Handle coefficients command
pub async fn handle(command: CoefficientsCommand, global_file: Option<&Path>) -> Result<()> {
    match command {
        CoefficientsCommand::Show => {
            let table = CoefficientTable::load(global_file)
                .context("Failed to load coefficient table")?;
            print!("{}", table.to_toml()?);
        }
        CoefficientsCommand::Check { file } => {
            let table = CoefficientTable::load(Some(&file))
                .with_context(|| format!("{} is not a valid coefficient table", file.display()))?;
            println!(
                "✓ {} is valid (version {}, {} models)",
                file.display(),
                table.version,
                table.models.len()
            );
        }
    }
    Ok(())
}
