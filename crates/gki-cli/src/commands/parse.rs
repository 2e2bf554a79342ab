//! Show the canonical forms of a KMI version.

use anyhow::Result;
use colored::Colorize;
use gki_types::KmiVersion;

pub async fn execute(kmi_version: &str) -> Result<()> {
    let kmi = KmiVersion::parse(kmi_version)?;

    println!("{} {}", "KMI version:   ".cyan().bold(), kmi);
    println!("{} {}", "Package suffix:".cyan().bold(), kmi.to_package_suffix());
    println!("{} {}", "Package name:  ".cyan().bold(), kmi.package_name());

    Ok(())
}
