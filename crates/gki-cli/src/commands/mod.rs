//! CLI command implementations.

pub mod parse;
pub mod plan;
pub mod check_kmi;
pub mod check_update;
pub mod payload_args;
pub mod manifest;
