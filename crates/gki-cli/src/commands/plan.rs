//! Build graph generation.

use crate::cli::Format;
use anyhow::{Context, Result};
use gki_build::{BuildPlan, EligibilityFacts};
use gki_core::{log, BuildConfig};
use gki_types::LogLevel;
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn execute(
    config: &Path,
    format: Format,
    paths: &[PathBuf],
    level: Option<LogLevel>,
) -> Result<()> {
    let build_config = BuildConfig::load_from(config)
        .with_context(|| format!("Failed to load board config {}", config.display()))?;
    log::init_from_config(&build_config.logs, level)?;

    info!(
        "Board builds {} kernel binaries and supports {} KMI version(s)",
        build_config.board.kernel_binaries.len(),
        build_config.board.supported_kmi_versions.len()
    );

    let mut plan = BuildPlan::new(EligibilityFacts::from(build_config.board));
    plan.add_paths(paths)?;

    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(plan.graph())?,
        Format::Yaml => serde_yaml::to_string(plan.graph())?,
    };
    println!("{}", rendered);

    Ok(())
}
