//! Core data models for resource accounting

use crate::error::{AccountingError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Resource kinds tracked by the accounting engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Cpu,
    Memory,
    Pods,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] =
        [ResourceKind::Cpu, ResourceKind::Memory, ResourceKind::Pods];

    /// Kinds a pod declares requests and limits for
    pub const REQUESTABLE: [ResourceKind; 2] = [ResourceKind::Cpu, ResourceKind::Memory];

    /// Attribute key used for this kind on Kubernetes objects
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "cpu",
            ResourceKind::Memory => "memory",
            ResourceKind::Pods => "pods",
        }
    }

    /// Human-readable label
    pub fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::Cpu => "CPU",
            ResourceKind::Memory => "Memory",
            ResourceKind::Pods => "Pods",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = AccountingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cpu" => Ok(ResourceKind::Cpu),
            "memory" => Ok(ResourceKind::Memory),
            "pods" => Ok(ResourceKind::Pods),
            other => Err(AccountingError::UnknownResourceKind(other.to_string())),
        }
    }
}

/// Upper bound on the amount of a resource consumers may use.
///
/// `Unbounded` means at least one consumer declared no limit and can
/// therefore take everything the provider has.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ceiling {
    Bounded(f64),
    Unbounded,
}

impl Ceiling {
    pub const ZERO: Ceiling = Ceiling::Bounded(0.0);

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Ceiling::Unbounded)
    }

    /// The finite value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            Ceiling::Bounded(v) => Some(*v),
            Ceiling::Unbounded => None,
        }
    }

    /// Amount to display against a provider: an unbounded ceiling can consume
    /// the whole allocatable amount.
    pub fn effective(&self, allocatable: f64) -> f64 {
        self.value().unwrap_or(allocatable)
    }
}

impl Default for Ceiling {
    fn default() -> Self {
        Ceiling::ZERO
    }
}

impl Add for Ceiling {
    type Output = Ceiling;

    fn add(self, rhs: Ceiling) -> Ceiling {
        match (self, rhs) {
            (Ceiling::Bounded(a), Ceiling::Bounded(b)) => Ceiling::Bounded(a + b),
            _ => Ceiling::Unbounded,
        }
    }
}

impl Sum for Ceiling {
    fn sum<I: Iterator<Item = Ceiling>>(iter: I) -> Ceiling {
        iter.fold(Ceiling::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Ceiling> for Ceiling {
    fn sum<I: Iterator<Item = &'a Ceiling>>(iter: I) -> Ceiling {
        iter.copied().sum()
    }
}

/// Amounts of a single resource on a provider (node, NUMA cell or cluster)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmount {
    /// Total amount of this resource
    pub capacity: f64,
    /// Amount that may be allocated to consumers
    pub allocatable: f64,
    /// Amount withheld for the system (capacity - allocatable)
    pub reserved: f64,
    /// Sum of consumer requests
    pub requested_floor: f64,
    /// Sum of consumer limits
    pub requested_ceiling: Ceiling,
    /// Reported live consumption, zero when no telemetry was supplied
    pub used: f64,
}

impl ResourceAmount {
    /// Build an amount from capacity and allocatable, deriving `reserved`
    pub fn new(capacity: f64, allocatable: f64) -> Self {
        Self {
            capacity,
            allocatable,
            reserved: capacity - allocatable,
            ..Default::default()
        }
    }

    /// Requested floor as a percentage of allocatable
    pub fn floor_percent(&self) -> Result<f64> {
        percent_of(self.requested_floor, self.allocatable)
    }

    /// Effective ceiling as a percentage of allocatable
    pub fn ceiling_percent(&self) -> Result<f64> {
        percent_of(
            self.requested_ceiling.effective(self.allocatable),
            self.allocatable,
        )
    }

    /// Live usage as a percentage of allocatable
    pub fn used_percent(&self) -> Result<f64> {
        percent_of(self.used, self.allocatable)
    }
}

/// Capacity, reservation and consumption for every resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub cpu: ResourceAmount,
    pub memory: ResourceAmount,
    pub pods: ResourceAmount,
}

impl ResourceSet {
    pub fn get(&self, kind: ResourceKind) -> &ResourceAmount {
        match kind {
            ResourceKind::Cpu => &self.cpu,
            ResourceKind::Memory => &self.memory,
            ResourceKind::Pods => &self.pods,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut ResourceAmount {
        match kind {
            ResourceKind::Cpu => &mut self.cpu,
            ResourceKind::Memory => &mut self.memory,
            ResourceKind::Pods => &mut self.pods,
        }
    }
}

/// Floor and ceiling a single consumer requests for one resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub floor: f64,
    pub ceiling: Ceiling,
}

/// Requests of a single pod across all of its containers
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequests {
    pub cpu: ResourceRequest,
    pub memory: ResourceRequest,
}

impl ResourceRequests {
    /// Request for a kind; pods never request pod-slots explicitly
    pub fn get(&self, kind: ResourceKind) -> Result<&ResourceRequest> {
        match kind {
            ResourceKind::Cpu => Ok(&self.cpu),
            ResourceKind::Memory => Ok(&self.memory),
            ResourceKind::Pods => Err(AccountingError::UnknownResourceKind(
                kind.as_str().to_string(),
            )),
        }
    }
}

/// A NUMA cell within a host machine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumaCell {
    pub resources: ResourceSet,
}

/// A Kubernetes node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub cluster: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Resources across the whole node, regardless of NUMA cell
    pub resources: ResourceSet,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numa_cells: Vec<NumaCell>,
}

/// A Kubernetes pod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pod {
    pub cluster: String,
    pub name: String,
    pub namespace: String,
    /// Name of the hosting node, `None` until scheduled
    pub node: Option<String>,
    pub phase: Option<String>,
    pub resource_requests: ResourceRequests,
}

impl Pod {
    /// Whether the pod still holds its requested resources on its node
    pub fn is_active(&self) -> bool {
        !matches!(self.phase.as_deref(), Some("Succeeded") | Some("Failed"))
    }
}

/// Live usage of a node as reported by a metrics pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUsage {
    pub name: String,
    pub cpu_cores: f64,
    pub memory_bytes: f64,
}

/// Point-in-time accounting for a cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cluster: String,
    pub generated_at: DateTime<Utc>,
    pub nodes: Vec<Node>,
    pub pods: Vec<Pod>,
    pub totals: ResourceSet,
}

/// `amount` as a percentage of `allocatable`
pub fn percent_of(amount: f64, allocatable: f64) -> Result<f64> {
    if allocatable == 0.0 {
        return Err(AccountingError::DivisionByZero {
            what: format!("{}", amount),
        });
    }
    Ok(amount / allocatable * 100.0)
}

/// Utilization band used to highlight constrained resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilizationLevel {
    Normal,
    Warning,
    Critical,
}

impl UtilizationLevel {
    pub const DEFAULT_WARN_PCT: f64 = 75.0;
    pub const DEFAULT_CRITICAL_PCT: f64 = 85.0;

    pub fn from_percent(pct: f64, warn_pct: f64, critical_pct: f64) -> Self {
        if pct > critical_pct {
            UtilizationLevel::Critical
        } else if pct > warn_pct {
            UtilizationLevel::Warning
        } else {
            UtilizationLevel::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceiling_addition() {
        assert_eq!(Ceiling::Bounded(3.0) + Ceiling::Bounded(5.0), Ceiling::Bounded(8.0));
        assert_eq!(Ceiling::Bounded(3.0) + Ceiling::Unbounded, Ceiling::Unbounded);
        assert_eq!(Ceiling::Unbounded + Ceiling::Bounded(0.0), Ceiling::Unbounded);
        assert_eq!(Ceiling::Unbounded + Ceiling::Unbounded, Ceiling::Unbounded);
    }

    #[test]
    fn test_ceiling_empty_sum_is_zero() {
        let empty: Vec<Ceiling> = Vec::new();
        assert_eq!(empty.iter().sum::<Ceiling>(), Ceiling::ZERO);
    }

    #[test]
    fn test_ceiling_sum_short_circuits_on_unbounded() {
        let ceilings = [Ceiling::Bounded(1.0), Ceiling::Unbounded, Ceiling::Bounded(2.0)];
        assert_eq!(ceilings.iter().sum::<Ceiling>(), Ceiling::Unbounded);
    }

    #[test]
    fn test_zero_ceiling_is_not_unbounded() {
        assert!(!Ceiling::ZERO.is_unbounded());
        assert_eq!(Ceiling::ZERO.value(), Some(0.0));
        assert_eq!(Ceiling::Unbounded.value(), None);
    }

    #[test]
    fn test_ceiling_effective() {
        assert_eq!(Ceiling::Unbounded.effective(16.0), 16.0);
        assert_eq!(Ceiling::Bounded(4.0).effective(16.0), 4.0);
    }

    #[test]
    fn test_resource_amount_reserved() {
        let amount = ResourceAmount::new(8.0, 7.5);
        assert_eq!(amount.reserved, 0.5);
        assert_eq!(amount.requested_ceiling, Ceiling::ZERO);
        assert_eq!(amount.used, 0.0);
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(2.0, 8.0).unwrap(), 25.0);
        assert!(matches!(
            percent_of(1.0, 0.0),
            Err(AccountingError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_ceiling_percent_unbounded_is_full() {
        let mut amount = ResourceAmount::new(4.0, 4.0);
        amount.requested_ceiling = Ceiling::Unbounded;
        assert_eq!(amount.ceiling_percent().unwrap(), 100.0);
    }

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!("cpu".parse::<ResourceKind>().unwrap(), ResourceKind::Cpu);
        assert_eq!("pods".parse::<ResourceKind>().unwrap(), ResourceKind::Pods);
        assert_eq!(
            "gpu".parse::<ResourceKind>(),
            Err(AccountingError::UnknownResourceKind("gpu".to_string()))
        );
    }

    #[test]
    fn test_resource_requests_reject_pod_slots() {
        let requests = ResourceRequests::default();
        assert!(requests.get(ResourceKind::Cpu).is_ok());
        assert!(requests.get(ResourceKind::Pods).is_err());
    }

    #[test]
    fn test_utilization_level() {
        assert_eq!(UtilizationLevel::from_percent(50.0, 75.0, 85.0), UtilizationLevel::Normal);
        assert_eq!(UtilizationLevel::from_percent(75.0, 75.0, 85.0), UtilizationLevel::Normal);
        assert_eq!(UtilizationLevel::from_percent(80.0, 75.0, 85.0), UtilizationLevel::Warning);
        assert_eq!(UtilizationLevel::from_percent(90.0, 75.0, 85.0), UtilizationLevel::Critical);
    }

    #[test]
    fn test_pod_activity() {
        let mut pod = Pod {
            cluster: "default".to_string(),
            name: "web".to_string(),
            namespace: "default".to_string(),
            node: Some("worker-1".to_string()),
            phase: Some("Running".to_string()),
            resource_requests: ResourceRequests::default(),
        };
        assert!(pod.is_active());
        pod.phase = Some("Succeeded".to_string());
        assert!(!pod.is_active());
        pod.phase = None;
        assert!(pod.is_active());
    }

    #[test]
    fn test_ceiling_serialization() {
        assert_eq!(serde_json::to_string(&Ceiling::Unbounded).unwrap(), "\"unbounded\"");
        assert_eq!(
            serde_json::to_string(&Ceiling::Bounded(2.5)).unwrap(),
            "{\"bounded\":2.5}"
        );
    }
}
