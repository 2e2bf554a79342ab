//! # GKI Build
//!
//! Build graph generation for GKI packages:
//! - Declaration validation
//! - Per-board eligibility
//! - Variant-selecting graph assembly (OTA and factory pipelines)
//! - KMI version consistency checks
//! - Package manifests and OTA payload arguments
//! - Kernel update policy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod declaration;
pub mod eligibility;
pub mod graph;
pub mod assembler;
pub mod check;
pub mod manifest;
pub mod ota;
pub mod update;
pub mod plan;

pub use declaration::{RawDeclaration, ValidatedDeclaration, Variant};
pub use eligibility::{is_eligible, Eligibility, EligibilityFacts};
pub use graph::{ArtifactNode, BuildGraph, InputRef, NodeId, NodeKind, Output, OutputTag, Tool};
pub use assembler::{assemble, assemble_with, PipelineOptions, PipelineVariant};
pub use check::KmiCheck;
pub use manifest::{ApexManifest, ManifestRequest};
pub use ota::{payload_args, ImageArg};
pub use update::{check_kernel_update, UpdateOutcome};
pub use plan::{plan_module, BuildPlan, PlannedModule};
