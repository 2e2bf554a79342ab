//! CLI structure and command definitions.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use gki_types::LogLevel;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gki")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generic Kernel Image package build graph generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format for the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a KMI version and show its canonical forms
    Parse {
        /// KMI version, e.g. 5.4-android12-0
        kmi_version: String,
    },

    /// Assemble the build graph for a set of declarations
    Plan {
        /// Board configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Declaration files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Check a kernel release file against a KMI version
    #[command(name = "check-kmi")]
    CheckKmi {
        /// Declared KMI version
        #[arg(long)]
        kmi_version: String,

        /// File holding the kernel release
        #[arg(long)]
        release_file: PathBuf,

        /// Marker file written when the check passes
        #[arg(long)]
        marker: PathBuf,

        /// Description of the checked artifact (defaults to the release file)
        #[arg(long)]
        source: Option<String>,
    },

    /// Check whether a kernel update is allowed
    #[command(name = "check-update")]
    CheckUpdate {
        /// Running kernel release
        #[arg(long)]
        from: String,

        /// Incoming kernel release; empty for a non-GKI build
        #[arg(long, default_value = "")]
        to: String,
    },

    /// Print the flags passed to the OTA payload generator
    #[command(name = "payload-args")]
    PayloadArgs {
        /// Partition image as NAME:IMAGE
        #[arg(long = "image", required = true)]
        images: Vec<String>,

        /// Certificate used to sign the payload
        #[arg(long)]
        key: Option<String>,
    },

    /// Print the factory package manifest for a KMI version
    Manifest {
        /// Declared KMI version
        #[arg(long)]
        kmi_version: String,
    },
}

impl Cli {
    /// Level requested by the global flags, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        if self.verbose {
            Some(LogLevel::Debug)
        } else if self.quiet {
            Some(LogLevel::Error)
        } else {
            None
        }
    }

    pub async fn execute(&self) -> Result<()> {
        use crate::commands::*;

        let level = self.log_level();

        // Plan installs logging itself once the board config (and its log
        // settings) are loaded.
        if !matches!(self.command, Commands::Plan { .. }) {
            gki_core::log::init_from_config(&[], level)?;
        }

        match &self.command {
            Commands::Parse { kmi_version } => {
                parse::execute(kmi_version).await
            }
            Commands::Plan { config, format, paths } => {
                plan::execute(config, *format, paths, level).await
            }
            Commands::CheckKmi { kmi_version, release_file, marker, source } => {
                check_kmi::execute(kmi_version, release_file, marker, source.as_deref()).await
            }
            Commands::CheckUpdate { from, to } => {
                check_update::execute(from, to).await
            }
            Commands::PayloadArgs { images, key } => {
                payload_args::execute(images, key.as_deref()).await
            }
            Commands::Manifest { kmi_version } => {
                manifest::execute(kmi_version).await
            }
        }
    }
}
