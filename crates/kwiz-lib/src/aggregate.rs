//! Aggregation of pod requests into node and cluster totals
//!
//! Runs as two independent stages:
//! 1. index pods by the node hosting them ([`group_pods_by_node`])
//! 2. fold each node's pods into a new node record
//!    ([`fold_pods_into_node`]), then fold all nodes into cluster totals
//!    ([`fold_nodes_into_cluster`])
//!
//! Ceilings are summed with [`Ceiling`] addition, so a single unbounded term
//! makes the aggregate unbounded while empty collections sum to zero.

use crate::models::{Ceiling, Node, NodeUsage, Pod, ResourceAmount, ResourceKind, ResourceSet};
use std::collections::HashMap;
use tracing::debug;

/// Pods grouped by the name of their hosting node
#[derive(Debug, Default)]
pub struct PodIndex<'a> {
    by_node: HashMap<&'a str, Vec<&'a Pod>>,
}

impl<'a> PodIndex<'a> {
    /// Pods hosted on `node`; empty when the node runs nothing
    pub fn pods_on(&self, node: &str) -> &[&'a Pod] {
        self.by_node.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of all nodes hosting at least one pod
    pub fn node_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.by_node.keys().copied()
    }

    /// Number of indexed pods
    pub fn len(&self) -> usize {
        self.by_node.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}

/// Index pods by hosting node.
///
/// Unscheduled pods and pods in a terminal phase hold no resources on any
/// node and are left out.
pub fn group_pods_by_node(pods: &[Pod]) -> PodIndex<'_> {
    let mut by_node: HashMap<&str, Vec<&Pod>> = HashMap::new();
    for pod in pods.iter().filter(|p| p.is_active()) {
        if let Some(node) = pod.node.as_deref() {
            by_node.entry(node).or_default().push(pod);
        }
    }
    PodIndex { by_node }
}

/// Return a copy of `node` with requests and usage folded in from the pods
/// it hosts.
pub fn fold_pods_into_node(node: &Node, pods: &[&Pod], usage: Option<&NodeUsage>) -> Node {
    let mut folded = node.clone();

    for kind in ResourceKind::REQUESTABLE {
        let amount = folded.resources.get_mut(kind);
        let requests = pods.iter().filter_map(|p| p.resource_requests.get(kind).ok());
        let (floor, ceiling) = requests.fold((0.0, Ceiling::ZERO), |(floor, ceiling), r| {
            (floor + r.floor, ceiling + r.ceiling)
        });
        amount.requested_floor = floor;
        amount.requested_ceiling = ceiling;
    }

    // Every pod occupies exactly one slot, so the slot ceiling is always finite
    let slots = pods.len() as f64;
    folded.resources.pods.requested_floor = slots;
    folded.resources.pods.requested_ceiling = Ceiling::Bounded(slots);

    if let Some(usage) = usage {
        folded.resources.cpu.used = usage.cpu_cores;
        folded.resources.memory.used = usage.memory_bytes;
        folded.resources.pods.used = slots;
    }

    debug!(
        node = %folded.name,
        pods = pods.len(),
        cpu_floor = folded.resources.cpu.requested_floor,
        cpu_ceiling_unbounded = folded.resources.cpu.requested_ceiling.is_unbounded(),
        memory_floor = folded.resources.memory.requested_floor,
        memory_ceiling_unbounded = folded.resources.memory.requested_ceiling.is_unbounded(),
        "Folded pod requests into node"
    );

    folded
}

/// Sum node resources into cluster-wide totals
pub fn fold_nodes_into_cluster(nodes: &[Node]) -> ResourceSet {
    let mut totals = ResourceSet::default();
    for kind in ResourceKind::ALL {
        *totals.get_mut(kind) = sum_amounts(nodes.iter().map(|n| n.resources.get(kind)));
    }
    totals
}

fn sum_amounts<'a>(amounts: impl Iterator<Item = &'a ResourceAmount>) -> ResourceAmount {
    amounts.fold(ResourceAmount::default(), |acc, a| ResourceAmount {
        capacity: acc.capacity + a.capacity,
        allocatable: acc.allocatable + a.allocatable,
        reserved: acc.reserved + a.reserved,
        requested_floor: acc.requested_floor + a.requested_floor,
        requested_ceiling: acc.requested_ceiling + a.requested_ceiling,
        used: acc.used + a.used,
    })
}

/// Run the full pipeline: group pods, fold them into their nodes, then fold
/// the nodes into cluster totals.
///
/// Pods referencing a node absent from `nodes` are ignored.
pub fn aggregate(
    nodes: &[Node],
    pods: &[Pod],
    usage: Option<&[NodeUsage]>,
) -> (Vec<Node>, ResourceSet) {
    let index = group_pods_by_node(pods);
    let usage_by_node: Option<HashMap<&str, &NodeUsage>> =
        usage.map(|u| u.iter().map(|entry| (entry.name.as_str(), entry)).collect());

    let folded: Vec<Node> = nodes
        .iter()
        .map(|node| {
            let node_usage = usage_by_node
                .as_ref()
                .and_then(|by_node| by_node.get(node.name.as_str()).copied());
            fold_pods_into_node(node, index.pods_on(&node.name), node_usage)
        })
        .collect();

    let orphaned = index
        .node_names()
        .filter(|name| !nodes.iter().any(|n| n.name == *name))
        .count();
    if orphaned > 0 {
        debug!(orphaned_nodes = orphaned, "Pods reference nodes outside the node list");
    }

    let totals = fold_nodes_into_cluster(&folded);
    (folded, totals)
}
