//! CLI command implementations.

pub mod designs;
pub mod plan;
