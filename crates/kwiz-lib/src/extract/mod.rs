//! Decoding of Kubernetes list items into typed accounting records
//!
//! This module is the only place that walks untyped attribute trees
//! (`serde_json::Value`). Everything downstream works on the types in
//! [`crate::models`]:
//! - nodes: capacity and allocatable per resource kind
//! - pods: request floor and limit ceiling per resource kind
//! - node metrics: live CPU and memory usage

mod node;
mod pod;
mod usage;


pub use node::{extract_node, extract_nodes};
pub use pod::{extract_pod, extract_pods, floor_and_ceiling};
pub use usage::{extract_node_usage, extract_node_usages};

use crate::error::{AccountingError, Result};
use crate::models::ResourceKind;
use crate::unit;
use serde_json::{Map, Value};

/// Parse a raw quantity with the grammar for `kind`
pub(crate) fn parse_quantity(kind: ResourceKind, raw: &str) -> Result<f64> {
    match kind {
        ResourceKind::Cpu => unit::parse_cpu(raw),
        ResourceKind::Memory => unit::size_string_to_bytes(raw),
        ResourceKind::Pods => unit::parse_count(raw),
    }
}

/// Follow `path` through nested maps.
///
/// A missing or null step makes the value absent (`Ok(None)`). Stepping
/// through anything other than a map is an error.
pub(crate) fn nested<'a>(
    obj: &'a Value,
    path: &[&str],
    kind: &'static str,
) -> Result<Option<&'a Value>> {
    let mut current = obj;
    for key in path {
        let map = match current {
            Value::Null => return Ok(None),
            Value::Object(map) => map,
            other => {
                return Err(AccountingError::malformed(
                    kind,
                    other.to_string(),
                    format!("expected a map while reading {}", path.join(".")),
                ))
            }
        };
        match map.get(*key) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current).filter(|v| !v.is_null()))
}

/// Read a string at `path`; `Ok(None)` when absent, an error when present but
/// not a string.
pub(crate) fn nested_str<'a>(
    obj: &'a Value,
    path: &[&str],
    kind: &'static str,
) -> Result<Option<&'a str>> {
    match nested(obj, path, kind)? {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(AccountingError::malformed(
            kind,
            other.to_string(),
            format!("expected a string at {}", path.join(".")),
        )),
    }
}

/// Read a map at `path`; `Ok(None)` when absent, an error when present but
/// not a map.
pub(crate) fn nested_map<'a>(
    obj: &'a Value,
    path: &[&str],
    kind: &'static str,
) -> Result<Option<&'a Map<String, Value>>> {
    match nested(obj, path, kind)? {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(AccountingError::malformed(
            kind,
            other.to_string(),
            format!("expected a map at {}", path.join(".")),
        )),
    }
}

/// Read a list at `path`; absent lists are empty, anything else that is not a
/// list is an error.
pub(crate) fn nested_slice<'a>(
    obj: &'a Value,
    path: &[&str],
    kind: &'static str,
) -> Result<&'a [Value]> {
    match nested(obj, path, kind)? {
        None => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(AccountingError::malformed(
            kind,
            other.to_string(),
            format!("expected a list at {}", path.join(".")),
        )),
    }
}

/// `metadata.name`, required on every entity
pub(crate) fn entity_name(obj: &Value, entity: &str) -> Result<String> {
    nested_str(obj, &["metadata", "name"], "name")?
        .map(str::to_string)
        .ok_or_else(|| AccountingError::missing(entity, "metadata.name"))
}
