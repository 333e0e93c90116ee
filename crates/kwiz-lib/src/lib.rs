//! Resource accounting for Kubernetes clusters
//!
//! This crate provides the core functionality for:
//! - Parsing and formatting resource quantities
//! - Extracting node capacity and pod requests from raw API objects
//! - Aggregating pod requests into node and cluster totals
//! - Structured logging of accounting runs

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod models;
pub mod observability;
pub mod snapshot;
pub mod unit;

pub use error::{AccountingError, Result};
pub use models::*;
pub use observability::StructuredLogger;
pub use snapshot::{compute_snapshot, SnapshotInput};
