//! Node resource summary command

use anyhow::Result;
use colored::Colorize;
use kwiz_lib::{compute_snapshot, Node, ResourceKind, ResourceSet, Snapshot, SnapshotInput};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::client::ClusterClient;
use crate::output::{
    format_amount, print_info, print_json, print_warning, print_yaml, utilization_cells,
    OutputFormat, Thresholds,
};

/// Options for the node summary
#[derive(Debug, Clone, Default)]
pub struct NodeOptions {
    /// Fetch live usage from the metrics API
    pub show_actual: bool,
    /// Label selector applied to the node list
    pub selector: Option<String>,
    /// Resource kinds to show (all when empty)
    pub resources: Vec<ResourceKind>,
}

impl NodeOptions {
    fn kinds(&self) -> Vec<ResourceKind> {
        if self.resources.is_empty() {
            ResourceKind::ALL.to_vec()
        } else {
            ResourceKind::ALL
                .into_iter()
                .filter(|k| self.resources.contains(k))
                .collect()
        }
    }
}

/// Show per-node capacity, reservation and requests plus cluster totals
pub async fn show_node_summary(
    client: &ClusterClient,
    cluster: &str,
    options: &NodeOptions,
    thresholds: &Thresholds,
    format: OutputFormat,
) -> Result<()> {
    let (nodes, pods) = tokio::try_join!(
        client.list_nodes(options.selector.as_deref()),
        client.list_pods(None)
    )?;

    let metrics = if options.show_actual {
        match client.list_node_metrics().await {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                client.logger().log_usage_unavailable(&format!("{:#}", e));
                print_warning(&format!("Could not retrieve node usage: {:#}", e));
                print_info("Is metrics-server installed? Reporting zero usage.");
                None
            }
        }
    } else {
        None
    };

    let mut input = SnapshotInput::new(cluster, &nodes, &pods);
    if let Some(metrics) = metrics.as_deref() {
        input = input.with_node_metrics(metrics);
    }
    let snapshot = compute_snapshot(input)?;

    match format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Yaml => print_yaml(&snapshot)?,
        OutputFormat::Table => {
            if snapshot.nodes.is_empty() {
                println!("{}", "No nodes found".yellow());
                return Ok(());
            }
            println!("{}", render_nodes(&snapshot, options, thresholds));
            println!("{}", render_totals(&snapshot, options, thresholds));
        }
    }

    Ok(())
}

fn headers(first: &str, show_actual: bool) -> Vec<String> {
    let mut headers = vec![
        first,
        "RESOURCE",
        "CAPACITY",
        "ALLOCATABLE",
        "RESERVED",
        "REQUEST FLOOR",
        "REQUEST CEIL",
    ];
    if show_actual {
        headers.push("ACTUAL");
    }
    headers.into_iter().map(str::to_string).collect()
}

fn rows_for(
    label: &str,
    resources: &ResourceSet,
    options: &NodeOptions,
    thresholds: &Thresholds,
) -> Vec<Vec<String>> {
    options
        .kinds()
        .into_iter()
        .map(|kind| {
            let amount = resources.get(kind);
            let [floor, ceiling, used] = utilization_cells(kind, amount, thresholds);
            let mut row = vec![
                label.to_string(),
                kind.display_name().to_string(),
                format_amount(kind, amount.capacity),
                format_amount(kind, amount.allocatable),
                format_amount(kind, amount.reserved),
                floor,
                ceiling,
            ];
            if options.show_actual {
                row.push(used);
            }
            row
        })
        .collect()
}

fn render_nodes(snapshot: &Snapshot, options: &NodeOptions, thresholds: &Thresholds) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers("NODE", options.show_actual));
    for node in &snapshot.nodes {
        for row in node_rows(node, options, thresholds) {
            builder.push_record(row);
        }
    }
    builder.build().with(Style::rounded()).to_string()
}

fn node_rows(node: &Node, options: &NodeOptions, thresholds: &Thresholds) -> Vec<Vec<String>> {
    rows_for(&node.name, &node.resources, options, thresholds)
}

fn render_totals(snapshot: &Snapshot, options: &NodeOptions, thresholds: &Thresholds) -> String {
    let mut builder = Builder::default();
    builder.push_record(headers("", options.show_actual));
    let label = format!("Totals ({} nodes)", snapshot.nodes.len());
    for row in rows_for(&label, &snapshot.totals, options, thresholds) {
        builder.push_record(row);
    }
    builder.build().with(Style::rounded()).to_string()
}
