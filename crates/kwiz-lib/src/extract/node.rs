//! Node capacity extraction

use super::{entity_name, nested_map, nested_str, parse_quantity};
use crate::error::{AccountingError, Result};
use crate::models::{Node, ResourceAmount, ResourceKind, ResourceSet};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Decode a single node list item
pub fn extract_node(obj: &Value, cluster: &str) -> Result<Node> {
    let name = entity_name(obj, "node")?;
    let entity = format!("node {}", name);

    let mut resources = ResourceSet::default();
    for kind in ResourceKind::ALL {
        let capacity = node_amount(obj, &entity, "capacity", kind)?;
        let allocatable = node_amount(obj, &entity, "allocatable", kind)?;
        *resources.get_mut(kind) = ResourceAmount::new(capacity, allocatable);
    }

    let labels = nested_map(obj, &["metadata", "labels"], "labels")?
        .map(|labels| {
            labels
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_else(BTreeMap::new);

    debug!(
        node = %name,
        cpu_allocatable = resources.cpu.allocatable,
        memory_allocatable = resources.memory.allocatable,
        pods_allocatable = resources.pods.allocatable,
        "Extracted node resources"
    );

    Ok(Node {
        cluster: cluster.to_string(),
        name,
        labels,
        resources,
        numa_cells: Vec::new(),
    })
}

/// Decode every node in a list, stopping at the first failure
pub fn extract_nodes(items: &[Value], cluster: &str) -> Result<Vec<Node>> {
    items.iter().map(|obj| extract_node(obj, cluster)).collect()
}

/// Read `status.<category>.<kind>` and parse it with the grammar for `kind`
fn node_amount(obj: &Value, entity: &str, category: &str, kind: ResourceKind) -> Result<f64> {
    let raw = nested_str(obj, &["status", category, kind.as_str()], kind.as_str())?
        .ok_or_else(|| {
            AccountingError::missing(entity, format!("status.{}.{}", category, kind.as_str()))
        })?;
    parse_quantity(kind, raw)
}
