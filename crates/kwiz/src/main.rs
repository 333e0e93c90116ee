//! kwiz: Kubernetes capacity reporting CLI
//!
//! Summarizes node capacity, system reservations and the floor and ceiling
//! of resources requested by pods, per node and across the cluster.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use kwiz_lib::{ResourceKind, StructuredLogger};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::client::{ClusterClient, ConnectOptions};
use crate::commands::{node, pod};
use crate::config::{CliConfig, LogFormat};
use crate::output::{OutputFormat, Thresholds};

/// Kubernetes capacity reporting CLI
#[derive(Parser)]
#[command(name = "kwiz")]
#[command(
    author,
    version,
    about = "Kubernetes resource capacity and request summaries",
    long_about = None
)]
pub struct Cli {
    /// Path to kubeconfig file (inferred if not specified)
    #[arg(long, env = "KUBECONFIG", global = true)]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    pub context: Option<String>,

    /// Path to a kwiz configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json or yaml)
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize capacity and requests per node (default)
    #[command(visible_alias = "nodes")]
    Node(NodeArgs),

    /// List resource requests and limits per pod
    #[command(visible_alias = "pods")]
    Pod {
        /// Only list pods in this namespace
        #[arg(long, short)]
        namespace: Option<String>,
    },
}

#[derive(Args, Default)]
pub struct NodeArgs {
    /// Include actual usage reported by metrics-server
    #[arg(long, short = 'a')]
    pub show_actual: bool,

    /// Label selector to filter nodes
    #[arg(long, short = 'l')]
    pub selector: Option<String>,

    /// Resources to show (cpu, memory, pods)
    #[arg(long, short, value_delimiter = ',', value_parser = parse_resource_kind)]
    pub resource: Vec<ResourceKind>,
}

fn parse_resource_kind(s: &str) -> Result<ResourceKind, String> {
    s.parse::<ResourceKind>().map_err(|e| e.to_string())
}

fn init_tracing(debug: bool, format: LogFormat) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(cli.debug, config.log_format);

    let format = cli.format.or(config.default_format).unwrap_or_default();
    let thresholds = Thresholds {
        warn_pct: config.warn_threshold_pct,
        critical_pct: config.critical_threshold_pct,
    };

    let connect = ConnectOptions {
        kubeconfig: cli.kubeconfig.or(config.kubeconfig),
        context: cli.context.or(config.context),
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    };
    let logger = StructuredLogger::new(config.cluster_name.clone());
    let client = ClusterClient::connect(&connect, logger).await?;

    match cli.command.unwrap_or_else(|| Commands::Node(NodeArgs::default())) {
        Commands::Node(args) => {
            let options = node::NodeOptions {
                show_actual: args.show_actual,
                selector: args.selector,
                resources: args.resource,
            };
            node::show_node_summary(&client, &config.cluster_name, &options, &thresholds, format)
                .await?;
        }
        Commands::Pod { namespace } => {
            pod::show_pod_requests(&client, &config.cluster_name, namespace.as_deref(), format)
                .await?;
        }
    }

    Ok(())
}
