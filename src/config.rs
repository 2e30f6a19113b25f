use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::order::OrderPolicy;

// ============================================================================
// Service Configuration
// ============================================================================
//
// TOML file named by DELIVERY_CONFIG. Every section is optional; an unset
// variable or a missing file yields the defaults (serialized admission, reject terminal cancels,
// in-memory store, metrics on :9090). Values may reference environment
// variables as ${VAR} or ${VAR:-default}.
//
// ============================================================================

pub const CONFIG_ENV_VAR: &str = "DELIVERY_CONFIG";
pub const DEFAULT_LOG_FILTER: &str = "info,delivery_orders=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Fallback tracing filter when RUST_LOG is unset.
    pub log_filter: Option<String>,
    pub orders: OrderPolicy,
    pub store: StoreConfig,
    pub metrics: MetricsConfig,
}

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
        .map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

    let mut missing = None;
    let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
        let name = &caps[1];
        match (std::env::var(name), caps.get(2)) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.as_str().to_string(),
            (Err(_), None) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(ConfigError::Validation(format!(
            "Environment variable '{}' not found",
            name
        ))),
        None => Ok(resolved.into_owned()),
    }
}

impl ServiceConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        contents.parse()
    }

    /// Load from the file named by DELIVERY_CONFIG. Runs before logging is
    /// set up, so it logs nothing itself.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::var(CONFIG_ENV_VAR).ok().as_deref())
    }

    /// Defaults when no path is given or the file does not exist. A file
    /// that exists but cannot be read or parsed is still an error.
    pub fn load_from(path: Option<&str>) -> Result<Self, ConfigError> {
        match path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) if Path::new(path).exists() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres
            && self.store.url.as_deref().map_or(true, |url| url.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "store.url is required for the postgres backend".to_string(),
            ));
        }
        if self.metrics.enabled && self.metrics.port == 0 {
            return Err(ConfigError::Validation(
                "metrics.port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

impl FromStr for ServiceConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let resolved = resolve_env_vars(s)?;
        let config: ServiceConfig = toml::from_str(&resolved)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{AdmissionMode, TerminalCancelPolicy};

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: ServiceConfig = "".parse().unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.orders.admission_mode, AdmissionMode::Serialized);
        assert_eq!(config.orders.terminal_cancel, TerminalCancelPolicy::Reject);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.metrics.port, 9090);
        assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_full_config() {
        let input = r#"
            log_filter = "warn"

            [orders]
            admission_mode = "unguarded"
            terminal_cancel = "overwrite"

            [store]
            backend = "postgres"
            url = "postgres://localhost/delivery"

            [metrics]
            enabled = false
            port = 0
        "#;
        let config: ServiceConfig = input.parse().unwrap();
        assert_eq!(config.orders.admission_mode, AdmissionMode::Unguarded);
        assert_eq!(config.orders.terminal_cancel, TerminalCancelPolicy::Overwrite);
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert!(!config.metrics.enabled);
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_postgres_requires_url() {
        let result: Result<ServiceConfig, _> = "[store]\nbackend = \"postgres\"".parse();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_metrics_port_rejected() {
        let result: Result<ServiceConfig, _> = "[metrics]\nport = 0".parse();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let result: Result<ServiceConfig, _> = "[orders]\nadmission_mode = \"optimistic\"".parse();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_var_with_default() {
        let input = "url = \"${DELIVERY_TEST_MISSING_URL:-postgres://fallback}\"";
        let result = resolve_env_vars(input).unwrap();
        assert_eq!(result, "url = \"postgres://fallback\"");
    }

    #[test]
    fn test_env_var_resolution() {
        std::env::set_var("DELIVERY_TEST_DB_HOST", "db.internal");
        let result = resolve_env_vars("url = \"postgres://${DELIVERY_TEST_DB_HOST}/orders\"").unwrap();
        assert_eq!(result, "url = \"postgres://db.internal/orders\"");
        std::env::remove_var("DELIVERY_TEST_DB_HOST");
    }

    #[test]
    fn test_missing_env_var_error() {
        let result = resolve_env_vars("url = \"${DELIVERY_TEST_NEVER_SET}\"");
        assert!(matches!(result, Err(ConfigError::Validation(ref msg)) if msg.contains("DELIVERY_TEST_NEVER_SET")));
    }

    #[test]
    fn test_load_without_file_gives_defaults() {
        assert_eq!(ServiceConfig::load_from(None).unwrap(), ServiceConfig::default());
        assert_eq!(ServiceConfig::load_from(Some("  ")).unwrap(), ServiceConfig::default());
        assert_eq!(
            ServiceConfig::load_from(Some("/nonexistent/delivery.toml")).unwrap(),
            ServiceConfig::default()
        );
    }

    #[test]
    fn test_load_existing_file() {
        let path = std::env::temp_dir().join(format!("delivery-config-{}.toml", std::process::id()));
        std::fs::write(&path, "[orders]\nterminal_cancel = \"overwrite\"\n").unwrap();

        let config = ServiceConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.orders.terminal_cancel, TerminalCancelPolicy::Overwrite);

        std::fs::write(&path, "[orders]\nterminal_cancel = \"sometimes\"\n").unwrap();
        assert!(matches!(
            ServiceConfig::load_from(path.to_str()),
            Err(ConfigError::Parse(_))
        ));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ServiceConfig::from_file("/nonexistent/delivery.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
