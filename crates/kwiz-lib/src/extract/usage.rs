//! Live node usage extraction from `metrics.k8s.io` NodeMetrics items

use super::{entity_name, nested_str};
use crate::error::{AccountingError, Result};
use crate::models::NodeUsage;
use crate::unit;
use serde_json::Value;

/// Decode a single NodeMetrics item
pub fn extract_node_usage(obj: &Value) -> Result<NodeUsage> {
    let name = entity_name(obj, "node metrics")?;
    let entity = format!("node metrics {}", name);

    let cpu = nested_str(obj, &["usage", "cpu"], "cpu")?
        .ok_or_else(|| AccountingError::missing(&entity, "usage.cpu"))?;
    let memory = nested_str(obj, &["usage", "memory"], "memory")?
        .ok_or_else(|| AccountingError::missing(&entity, "usage.memory"))?;

    Ok(NodeUsage {
        name,
        cpu_cores: unit::parse_cpu_usage(cpu)?,
        memory_bytes: unit::size_string_to_bytes(memory)?,
    })
}

/// Decode every NodeMetrics item in a list
pub fn extract_node_usages(items: &[Value]) -> Result<Vec<NodeUsage>> {
    items.iter().map(extract_node_usage).collect()
}
