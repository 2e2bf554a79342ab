//! Factory manifest display.

use anyhow::Result;
use gki_build::ApexManifest;
use gki_types::KmiVersion;

pub async fn execute(kmi_version: &str) -> Result<()> {
    let kmi = KmiVersion::parse(kmi_version)?;
    println!("{}", ApexManifest::factory(&kmi).to_json_pretty()?);
    Ok(())
}
