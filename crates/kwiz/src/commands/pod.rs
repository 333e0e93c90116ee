//! Pod resource request listing

use anyhow::Result;
use kwiz_lib::extract::extract_pods;
use kwiz_lib::{Pod, ResourceKind};
use tabled::Tabled;

use crate::client::ClusterClient;
use crate::output::{
    format_amount, format_ceiling, print_info, print_json, print_yaml, OutputFormat,
};

/// Row for the pod requests table
#[derive(Tabled)]
struct PodRequestRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pod")]
    pod: String,
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Request")]
    request: String,
    #[tabled(rename = "Limit")]
    limit: String,
}

/// List the floor and ceiling each pod requests
pub async fn show_pod_requests(
    client: &ClusterClient,
    cluster: &str,
    namespace: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let items = client.list_pods(namespace).await?;
    let pods = extract_pods(&items, cluster)?;

    match format {
        OutputFormat::Json => print_json(&pods)?,
        OutputFormat::Yaml => print_yaml(&pods)?,
        OutputFormat::Table => {
            if pods.is_empty() {
                match namespace {
                    Some(ns) => print_info(&format!("No pods found in namespace {}", ns)),
                    None => print_info("No pods found"),
                }
                return Ok(());
            }

            let table = tabled::Table::new(pod_rows(&pods))
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}

fn pod_rows(pods: &[Pod]) -> Vec<PodRequestRow> {
    pods.iter()
        .flat_map(|pod| {
            [
                (ResourceKind::Cpu, &pod.resource_requests.cpu),
                (ResourceKind::Memory, &pod.resource_requests.memory),
            ]
            .into_iter()
            .map(move |(kind, request)| PodRequestRow {
                namespace: pod.namespace.clone(),
                pod: pod.name.clone(),
                node: pod.node.clone().unwrap_or_else(|| "<none>".to_string()),
                resource: kind.display_name().to_string(),
                request: format_amount(kind, request.floor),
                limit: format_ceiling(kind, request.ceiling),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pod_rows() {
        let items = vec![
            json!({
                "metadata": {"name": "web", "namespace": "shop"},
                "spec": {
                    "nodeName": "worker-1",
                    "containers": [{
                        "name": "app",
                        "resources": {
                            "requests": {"cpu": "250m", "memory": "64Mi"},
                            "limits": {"cpu": "500m"}
                        }
                    }]
                }
            }),
            json!({
                "metadata": {"name": "pending"},
                "spec": {"containers": [{"name": "app"}]}
            }),
        ];
        let pods = extract_pods(&items, "default").unwrap();

        let rows = pod_rows(&pods);
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].namespace, "shop");
        assert_eq!(rows[0].resource, "CPU");
        assert_eq!(rows[0].request, "0.25");
        assert_eq!(rows[0].limit, "0.50");

        assert_eq!(rows[1].resource, "Memory");
        assert_eq!(rows[1].request, "64.0Mi");
        assert_eq!(rows[1].limit, "-");

        assert_eq!(rows[2].namespace, "default");
        assert_eq!(rows[2].node, "<none>");
    }
}
