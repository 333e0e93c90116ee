//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use kwiz_lib::unit::bytes_to_size_string;
use kwiz_lib::{Ceiling, ResourceAmount, ResourceKind, UtilizationLevel};
use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Thresholds used to colour utilization cells
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub warn_pct: f64,
    pub critical_pct: f64,
}

impl Thresholds {
    pub fn level(&self, pct: f64) -> UtilizationLevel {
        UtilizationLevel::from_percent(pct, self.warn_pct, self.critical_pct)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn_pct: UtilizationLevel::DEFAULT_WARN_PCT,
            critical_pct: UtilizationLevel::DEFAULT_CRITICAL_PCT,
        }
    }
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a value as YAML
pub fn print_yaml<T: Serialize>(value: &T) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(value)?);
    Ok(())
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format CPU cores for display
pub fn format_cpu(cores: f64) -> String {
    format!("{:.2}", cores)
}

/// Format an amount of `kind` in its display unit
pub fn format_amount(kind: ResourceKind, amount: f64) -> String {
    match kind {
        ResourceKind::Cpu => format_cpu(amount),
        ResourceKind::Memory => bytes_to_size_string(amount),
        ResourceKind::Pods => format!("{:.0}", amount),
    }
}

/// Format a pod's ceiling; unbounded ceilings render as "-"
pub fn format_ceiling(kind: ResourceKind, ceiling: Ceiling) -> String {
    match ceiling {
        Ceiling::Bounded(value) => format_amount(kind, value),
        Ceiling::Unbounded => "-".to_string(),
    }
}

/// Format an amount with its share of allocatable, coloured by utilization.
///
/// A zero allocatable amount has no meaningful share and renders as "n/a".
pub fn format_utilization(
    kind: ResourceKind,
    amount: f64,
    allocatable: f64,
    thresholds: &Thresholds,
) -> String {
    let value = format_amount(kind, amount);
    match kwiz_lib::percent_of(amount, allocatable) {
        Ok(pct) => color_by_level(
            &format!("{} ({:.2}%)", value, pct),
            thresholds.level(pct),
        ),
        Err(_) => format!("{} (n/a)", value).dimmed().to_string(),
    }
}

/// Cells for floor, ceiling and used of a provider's amount
pub fn utilization_cells(
    kind: ResourceKind,
    amount: &ResourceAmount,
    thresholds: &Thresholds,
) -> [String; 3] {
    let ceiling = amount.requested_ceiling.effective(amount.allocatable);
    [
        format_utilization(kind, amount.requested_floor, amount.allocatable, thresholds),
        format_utilization(kind, ceiling, amount.allocatable, thresholds),
        format_utilization(kind, amount.used, amount.allocatable, thresholds),
    ]
}

/// Color a cell based on utilization level
pub fn color_by_level(text: &str, level: UtilizationLevel) -> String {
    match level {
        UtilizationLevel::Normal => text.green().to_string(),
        UtilizationLevel::Warning => text.yellow().to_string(),
        UtilizationLevel::Critical => text.red().to_string(),
    }
}
