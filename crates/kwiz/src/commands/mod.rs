//! CLI command implementations

pub mod node;
pub mod pod;
