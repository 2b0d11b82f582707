//! Service configuration
//!
//! Layered from an optional YAML file, then `SKILLSCOPE_*` environment
//! variables, then command-line overrides.

use anyhow::{Context, Result};
use config as cfg;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `SKILLSCOPE_PORT`
pub const ENV_PREFIX: &str = "SKILLSCOPE";

/// Analysis service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Trained model artifact; the rule-based classifier is used when absent
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expose Prometheus metrics at `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_model_path() -> PathBuf {
    PathBuf::from("./model.json")
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_path: default_model_path(),
            metrics_enabled: true,
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin request policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Accept requests from any origin
    #[serde(default = "default_true")]
    pub allow_any_origin: bool,

    /// Origins accepted when `allow_any_origin` is off
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_any_origin: true,
            allowed_origins: Vec::new(),
        }
    }
}

/// Values given on the command line; `None` leaves the layered value alone
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from file, environment and CLI overrides
    pub fn load(config_path: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::from_sources(config_path)?;
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Merge the YAML file (if present) with `SKILLSCOPE_*` variables
    pub fn from_sources(config_path: &Path) -> Result<Self> {
        let settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_path).required(false))
            .add_source(
                cfg::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| {
                format!("Failed to read configuration from {}", config_path.display())
            })?;

        settings
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(listen) = &overrides.listen {
            self.listen = listen.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(model_path) = &overrides.model_path {
            self.model_path = model_path.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if !self.cors.allow_any_origin && self.cors.allowed_origins.is_empty() {
            anyhow::bail!("cors.allowed_origins must be set when cors.allow_any_origin is false");
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.listen, self.port))
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.model_path, PathBuf::from("./model.json"));
        assert!(config.cors.allow_any_origin);
        assert_eq!(config.socket_addr().unwrap().port(), 5001);
    }

    #[test]
    fn test_yaml_file_and_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("skillscope.yaml");
        std::fs::write(
            &path,
            "port: 6000\nmodel_path: /srv/models/model.json\ncors:\n  allow_any_origin: false\n  allowed_origins:\n    - http://localhost:5173\n",
        )
        .unwrap();

        let from_file = ServiceConfig::from_sources(&path).unwrap();
        assert_eq!(from_file.port, 6000);
        assert_eq!(from_file.listen, "0.0.0.0");
        assert_eq!(from_file.model_path, PathBuf::from("/srv/models/model.json"));
        assert_eq!(from_file.cors.allowed_origins, ["http://localhost:5173"]);

        let overrides = ConfigOverrides {
            port: Some(7000),
            ..ConfigOverrides::default()
        };
        let config = ServiceConfig::load(&path, &overrides).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.model_path, PathBuf::from("/srv/models/model.json"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ServiceConfig::from_sources(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.listen, ServiceConfig::default().listen);
        assert_eq!(config.cors, CorsConfig::default());
    }

    #[test]
    fn test_invalid_listen_address_rejected() {
        let mut config = ServiceConfig::default();
        config.apply(&ConfigOverrides {
            listen: Some("not an address".to_string()),
            ..ConfigOverrides::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_closed_cors_requires_origins() {
        let mut config = ServiceConfig::default();
        config.cors.allow_any_origin = false;
        assert!(config.validate().is_err());

        config.cors.allowed_origins.push("http://localhost:3000".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_rendering_round_trips() {
        let config = ServiceConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed: ServiceConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
