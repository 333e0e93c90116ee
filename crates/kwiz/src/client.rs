//! Kubernetes client used to fetch the entity lists fed to the accounting
//! engine

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::GroupVersionKind;
use kube::Client;
use kwiz_lib::StructuredLogger;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::time::{Duration, Instant};
use tracing::debug;

/// Connection settings resolved from flags and configuration
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub kubeconfig: Option<String>,
    pub context: Option<String>,
    pub request_timeout: Duration,
}

/// Client for listing cluster entities as raw attribute trees
pub struct ClusterClient {
    client: Client,
    request_timeout: Duration,
    logger: StructuredLogger,
}

impl ClusterClient {
    /// Connect using, in order of preference: an explicit kubeconfig path,
    /// the default kubeconfig with an explicit context, or the inferred
    /// configuration (`KUBECONFIG`, in-cluster, `~/.kube/config`)
    pub async fn connect(options: &ConnectOptions, logger: StructuredLogger) -> Result<Self> {
        let kube_options = KubeConfigOptions {
            context: options.context.clone(),
            ..Default::default()
        };

        let config = match (&options.kubeconfig, &options.context) {
            (Some(path), _) => {
                let kubeconfig = Kubeconfig::read_from(path)
                    .with_context(|| format!("Failed to read kubeconfig {}", path))?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &kube_options)
                    .await
                    .context("Failed to load kubeconfig")?
            }
            (None, Some(_)) => kube::Config::from_kubeconfig(&kube_options)
                .await
                .context("Failed to load kubeconfig context")?,
            (None, None) => kube::Config::infer()
                .await
                .context("Failed to infer Kubernetes configuration")?,
        };
        debug!(cluster_url = %config.cluster_url, "Resolved Kubernetes configuration");

        let client = Client::try_from(config).context("Failed to create Kubernetes client")?;

        Ok(Self {
            client,
            request_timeout: options.request_timeout,
            logger,
        })
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    /// List nodes, optionally filtered by a label selector
    pub async fn list_nodes(&self, selector: Option<&str>) -> Result<Vec<Value>> {
        let mut params = ListParams::default();
        if let Some(selector) = selector {
            params = params.labels(selector);
        }
        let api: Api<Node> = Api::all(self.client.clone());
        self.list(api, &params, "nodes").await
    }

    /// List pods in one namespace, or across all namespaces
    pub async fn list_pods(&self, namespace: Option<&str>) -> Result<Vec<Value>> {
        let api: Api<Pod> = match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        self.list(api, &ListParams::default(), "pods").await
    }

    /// List NodeMetrics from the `metrics.k8s.io` API
    pub async fn list_node_metrics(&self) -> Result<Vec<Value>> {
        let gvk = GroupVersionKind::gvk("metrics.k8s.io", "v1beta1", "NodeMetrics");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "nodes");
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        self.list(api, &ListParams::default(), "nodemetrics").await
    }

    async fn list<K>(&self, api: Api<K>, params: &ListParams, resource: &str) -> Result<Vec<Value>>
    where
        K: Clone + Debug + DeserializeOwned + Serialize,
    {
        let started = Instant::now();

        let list = tokio::time::timeout(self.request_timeout, api.list(params))
            .await
            .with_context(|| format!("Timed out listing {}", resource))?
            .with_context(|| format!("Failed to list {}", resource))?;

        let items = list
            .items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to encode {}", resource))?;

        self.logger
            .log_fetch(resource, items.len(), started.elapsed().as_secs_f64() * 1000.0);
        Ok(items)
    }
}
