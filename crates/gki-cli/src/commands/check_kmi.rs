//! Run one KMI version consistency check.

use anyhow::Result;
use colored::Colorize;
use gki_build::KmiCheck;
use gki_types::KmiVersion;
use std::path::{Path, PathBuf};

pub async fn execute(
    kmi_version: &str,
    release_file: &Path,
    marker: &Path,
    source: Option<&str>,
) -> Result<()> {
    let kmi = KmiVersion::parse(kmi_version)?;
    let source = source
        .map(str::to_string)
        .unwrap_or_else(|| release_file.display().to_string());
    let check = KmiCheck::new(kmi, source);

    let release: PathBuf = release_file.to_path_buf();
    check.run(&release, marker)?;

    println!(
        "{} KMI version {} verified in {}",
        "✓".green().bold(),
        check.kmi_version.to_string().cyan(),
        check.source
    );
    Ok(())
}
