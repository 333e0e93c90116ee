//! Configuration management for the CLI
//!
//! Settings are layered, later sources winning:
//! 1. built-in defaults
//! 2. `~/.config/kwiz/config.{toml,json,yaml}` (or the file given with `--config`)
//! 3. `KWIZ_*` environment variables
//! 4. command-line flags (applied by the caller)

use anyhow::{Context, Result};
use kwiz_lib::UtilizationLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

const ENV_PREFIX: &str = "KWIZ";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Path to kubeconfig file (inferred when unset)
    #[serde(default)]
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use
    #[serde(default)]
    pub context: Option<String>,

    /// Cluster name stamped on reported records
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// Timeout for each list call against the API server
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Utilization percentage above which values are highlighted as a warning
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold_pct: f64,

    /// Utilization percentage above which values are highlighted as critical
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold_pct: f64,

    /// Default output format
    #[serde(default)]
    pub default_format: Option<OutputFormat>,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_cluster_name() -> String {
    "default".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_warn_threshold() -> f64 {
    UtilizationLevel::DEFAULT_WARN_PCT
}

fn default_critical_threshold() -> f64 {
    UtilizationLevel::DEFAULT_CRITICAL_PCT
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            cluster_name: default_cluster_name(),
            request_timeout_secs: default_request_timeout(),
            warn_threshold_pct: default_warn_threshold(),
            critical_threshold_pct: default_critical_threshold(),
            default_format: None,
            log_format: LogFormat::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from an explicit file, or the default location,
    /// and the environment
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        Self::load_from(explicit_path, config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(explicit_path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = match explicit_path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => match Self::config_path() {
                Some(path) => builder.add_source(
                    config::File::with_name(&path.to_string_lossy()).required(false),
                ),
                None => builder,
            },
        };

        let config = builder
            .add_source(environment)
            .build()
            .context("Failed to read configuration")?;

        let config: CliConfig = config
            .try_deserialize()
            .context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if self.warn_threshold_pct > self.critical_threshold_pct {
            anyhow::bail!(
                "warn_threshold_pct ({}) must not exceed critical_threshold_pct ({})",
                self.warn_threshold_pct,
                self.critical_threshold_pct
            );
        }
        Ok(())
    }

    /// Base path of the configuration file, without extension
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| home.join(".config").join("kwiz").join("config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Environment source that reads from `vars` instead of the process
    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    fn write_config(extension: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.cluster_name, "default");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.warn_threshold_pct, 75.0);
        assert_eq!(config.critical_threshold_pct, 85.0);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let file = write_config(
            ".toml",
            r#"
cluster_name = "prod-east"
context = "admin@prod-east"
request_timeout_secs = 30
warn_threshold_pct = 60.0
default_format = "json"
log_format = "json"
"#,
        );

        let config = CliConfig::load_from(Some(file.path()), environment(&[])).unwrap();
        assert_eq!(config.cluster_name, "prod-east");
        assert_eq!(config.context.as_deref(), Some("admin@prod-east"));
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.warn_threshold_pct, 60.0);
        assert_eq!(config.critical_threshold_pct, 85.0);
        assert!(matches!(config.default_format, Some(OutputFormat::Json)));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config(".json", r#"{"cluster_name": "from-file", "context": "dev"}"#);
        let env = environment(&[("KWIZ_CLUSTER_NAME", "from-env")]);

        let config = CliConfig::load_from(Some(file.path()), env).unwrap();
        assert_eq!(config.cluster_name, "from-env");
        assert_eq!(config.context.as_deref(), Some("dev"));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let file = write_config(
            ".toml",
            "warn_threshold_pct = 90.0\ncritical_threshold_pct = 80.0\n",
        );

        let err = CliConfig::load_from(Some(file.path()), environment(&[])).unwrap_err();
        assert!(err.to_string().contains("warn_threshold_pct"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = Path::new("/nonexistent/kwiz/config.toml");
        assert!(CliConfig::load_from(Some(path), environment(&[])).is_err());
    }
}
