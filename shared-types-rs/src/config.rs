// shared-types-rs/src/config.rs
// Centralized configuration loader for the RCA desk services

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

static RCA_DESK_CONFIG: OnceCell<Arc<RcaDeskConfig>> = OnceCell::new();

pub const CONFIG_PATH_VAR: &str = "RCA_DESK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "./config/rca-desk.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration not initialized")]
    NotInitialized,

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RcaDeskConfig {
    pub system: SystemConfig,
    pub gateway: GatewayConfig,
    pub analysis: AnalysisConfig,
    pub cases: CasesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub environment: String,
    pub log_level: String,
    pub service_host: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            log_level: "info".to_string(),
            service_host: "localhost".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    /// Include internal error text in caller-visible error bodies.
    pub expose_error_details: bool,
    pub max_request_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            expose_error_details: false,
            max_request_body_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub base_url: String,
    pub refine_path: String,
    pub predict_path: String,
    pub similar_cases_path: String,
    pub request_timeout_secs: u64,
    /// Upper bound for raw upstream bodies echoed back to callers.
    pub max_diagnostic_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            refine_path: "/refine_rca".to_string(),
            predict_path: "/predict".to_string(),
            similar_cases_path: "/search_similar_cases".to_string(),
            request_timeout_secs: 300,
            max_diagnostic_bytes: 1024,
        }
    }
}

impl AnalysisConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CasesConfig {
    /// Number of historical cases bundled into prediction requests.
    pub history_limit: usize,
}

impl Default for CasesConfig {
    fn default() -> Self {
        Self { history_limit: 100 }
    }
}

impl RcaDeskConfig {
    /// Load configuration from file
    pub fn load() -> Result<Arc<RcaDeskConfig>, ConfigError> {
        if let Some(config) = RCA_DESK_CONFIG.get() {
            return Ok(Arc::clone(config));
        }

        let config_path =
            env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::load_from(PathBuf::from(&config_path))?;

        let config_arc = Arc::new(config);
        RCA_DESK_CONFIG
            .set(Arc::clone(&config_arc))
            .map_err(|_| ConfigError::InvalidValue("Config already initialized".to_string()))?;

        Ok(config_arc)
    }

    /// Parse a configuration file without touching the global instance.
    pub fn load_from(path: impl AsRef<Path>) -> Result<RcaDeskConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = fs::read_to_string(path)?;
        let mut config: RcaDeskConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.apply_env_overrides();
        config.validate()?;

        tracing::debug!(path = %path.display(), "loaded rca-desk configuration");
        Ok(config)
    }

    /// Get the global configuration instance
    pub fn get() -> Result<Arc<RcaDeskConfig>, ConfigError> {
        RCA_DESK_CONFIG
            .get()
            .map(Arc::clone)
            .ok_or(ConfigError::NotInitialized)
    }

    /// Apply `ANALYSIS_SERVICE_*` and `RCA_GATEWAY_SERVICE_PORT` overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(addr) = config_rs::client_address_override(config_rs::ANALYSIS_SERVICE) {
            self.analysis.base_url = addr;
        }
        self.gateway.port = config_rs::get_service_port(config_rs::GATEWAY_SERVICE, self.gateway.port);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue("analysis.base_url is empty".to_string()));
        }
        if self.analysis.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "analysis.request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.cases.history_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "cases.history_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.system.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            "[analysis]\nbase_url = \"http://10.0.0.5:8000/\"\nrequest_timeout_secs = 120\n"
        )
        .unwrap();

        let config = RcaDeskConfig::load_from(file.path()).expect("config should parse");
        assert_eq!(config.analysis.request_timeout_secs, 120);
        assert_eq!(config.analysis.refine_path, "/refine_rca");
        assert_eq!(config.cases.history_limit, 100);
        assert!(!config.gateway.expose_error_details);
    }

    #[test]
    fn test_missing_file() {
        let result = RcaDeskConfig::load_from("/definitely/not/here/rca-desk.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[analysis]\nrequest_timeout_secs = 0\n").unwrap();
        let result = RcaDeskConfig::load_from(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let analysis = AnalysisConfig {
            base_url: "http://backend:8000/".to_string(),
            ..AnalysisConfig::default()
        };
        assert_eq!(analysis.endpoint("/refine_rca"), "http://backend:8000/refine_rca");
        assert_eq!(analysis.endpoint("predict"), "http://backend:8000/predict");
    }
}
