//! Pod request and limit extraction

use super::{entity_name, nested_slice, nested_str, parse_quantity};
use crate::error::{AccountingError, Result};
use crate::models::{Ceiling, Pod, ResourceKind, ResourceRequest, ResourceRequests};
use serde_json::Value;
use tracing::debug;

const DEFAULT_NAMESPACE: &str = "default";

/// Decode a single pod list item
pub fn extract_pod(obj: &Value, cluster: &str) -> Result<Pod> {
    let name = entity_name(obj, "pod")?;
    let namespace = nested_str(obj, &["metadata", "namespace"], "namespace")?
        .unwrap_or(DEFAULT_NAMESPACE)
        .to_string();
    let node = nested_str(obj, &["spec", "nodeName"], "nodeName")?
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let phase = nested_str(obj, &["status", "phase"], "phase")?.map(str::to_string);

    let resource_requests = ResourceRequests {
        cpu: floor_and_ceiling(obj, ResourceKind::Cpu)?,
        memory: floor_and_ceiling(obj, ResourceKind::Memory)?,
    };

    debug!(
        pod = %name,
        namespace = %namespace,
        node = ?node,
        cpu_floor = resource_requests.cpu.floor,
        memory_floor = resource_requests.memory.floor,
        "Extracted pod requests"
    );

    Ok(Pod {
        cluster: cluster.to_string(),
        name,
        namespace,
        node,
        phase,
        resource_requests,
    })
}

/// Decode every pod in a list, stopping at the first failure
pub fn extract_pods(items: &[Value], cluster: &str) -> Result<Vec<Pod>> {
    items.iter().map(|obj| extract_pod(obj, cluster)).collect()
}

/// Sum the requests (floor) and limits (ceiling) of all containers in a pod
/// for one resource kind.
///
/// A container without a limit makes the ceiling unbounded. A pod without
/// containers requests nothing and has a zero ceiling. Pod-slots are not
/// declared per container and are rejected with `UnknownResourceKind`.
pub fn floor_and_ceiling(obj: &Value, kind: ResourceKind) -> Result<ResourceRequest> {
    if kind == ResourceKind::Pods {
        return Err(AccountingError::UnknownResourceKind(kind.as_str().to_string()));
    }
    let key = kind.as_str();
    let mut floor = 0.0;
    let mut ceiling = Ceiling::ZERO;

    for container in nested_slice(obj, &["spec", "containers"], "containers")? {
        if let Some(raw) = nested_str(container, &["resources", "requests", key], key)? {
            floor += parse_quantity(kind, raw)?;
        }
        match nested_str(container, &["resources", "limits", key], key)? {
            Some(raw) => ceiling = ceiling + Ceiling::Bounded(parse_quantity(kind, raw)?),
            None => ceiling = Ceiling::Unbounded,
        }
    }

    Ok(ResourceRequest { floor, ceiling })
}
