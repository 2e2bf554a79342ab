//! OTA payload generator flags.

use anyhow::Result;
use gki_build::{payload_args, ImageArg};

pub async fn execute(images: &[String], key: Option<&str>) -> Result<()> {
    let images = images
        .iter()
        .map(|pair| pair.parse::<ImageArg>())
        .collect::<gki_types::Result<Vec<_>>>()?;

    for arg in payload_args(&images, key) {
        println!("{}", arg);
    }
    Ok(())
}
