//! One-shot accounting snapshot
//!
//! Ties extraction and aggregation together: raw list items in, a
//! [`Snapshot`] of per-node and cluster-wide amounts out.

use crate::aggregate::aggregate;
use crate::error::Result;
use crate::extract::{extract_node_usages, extract_nodes, extract_pods};
use crate::models::Snapshot;
use crate::observability::StructuredLogger;
use chrono::Utc;
use serde_json::Value;

/// Raw entity lists to account for
#[derive(Debug, Clone, Copy)]
pub struct SnapshotInput<'a> {
    /// Cluster name stamped on every record
    pub cluster: &'a str,
    /// Node list items
    pub nodes: &'a [Value],
    /// Pod list items
    pub pods: &'a [Value],
    /// NodeMetrics list items, when live usage was fetched
    pub node_metrics: Option<&'a [Value]>,
}

impl<'a> SnapshotInput<'a> {
    pub fn new(cluster: &'a str, nodes: &'a [Value], pods: &'a [Value]) -> Self {
        Self {
            cluster,
            nodes,
            pods,
            node_metrics: None,
        }
    }

    pub fn with_node_metrics(mut self, node_metrics: &'a [Value]) -> Self {
        self.node_metrics = Some(node_metrics);
        self
    }
}

/// Compute a snapshot. Any extraction error aborts the whole computation.
pub fn compute_snapshot(input: SnapshotInput<'_>) -> Result<Snapshot> {
    let logger = StructuredLogger::new(input.cluster);

    let result = build(input);
    match &result {
        Ok(snapshot) => {
            logger.log_snapshot(snapshot.nodes.len(), snapshot.pods.len(), &snapshot.totals)
        }
        Err(e) => logger.log_snapshot_failed(&e.to_string()),
    }
    result
}

fn build(input: SnapshotInput<'_>) -> Result<Snapshot> {
    let nodes = extract_nodes(input.nodes, input.cluster)?;
    let pods = extract_pods(input.pods, input.cluster)?;
    let usage = input.node_metrics.map(extract_node_usages).transpose()?;

    let (nodes, totals) = aggregate(&nodes, &pods, usage.as_deref());

    Ok(Snapshot {
        cluster: input.cluster.to_string(),
        generated_at: Utc::now(),
        nodes,
        pods,
        totals,
    })
}
