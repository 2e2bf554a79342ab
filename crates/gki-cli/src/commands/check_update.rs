//! Kernel update policy check.

use anyhow::Result;
use colored::Colorize;
use gki_build::{check_kernel_update, UpdateOutcome};

pub async fn execute(from: &str, to: &str) -> Result<()> {
    match check_kernel_update(from, to)? {
        UpdateOutcome::FromLegacy => {
            println!(
                "{} running kernel '{}' is not GKI, update permitted",
                "✓".green().bold(),
                from
            );
        }
        UpdateOutcome::Permitted { from, to } => {
            println!(
                "{} update from {} to {} permitted",
                "✓".green().bold(),
                from.to_string().cyan(),
                to.to_string().cyan()
            );
        }
    }
    Ok(())
}
