use crate::error::ExporterError;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub sonnenbatterie: SonnenConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SonnenConfig {
    /// Base URL of the battery, e.g. `http://192.168.1.50`
    #[serde(default)]
    pub url: String,
    /// API token, required for power meter and latest data
    #[serde(default)]
    pub token: Option<SecretString>,
    /// Upper bound for each individual device request
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub metrics_path: String,
}

fn default_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9110
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

impl Default for SonnenConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            metrics_path: default_metrics_path(),
        }
    }
}

impl SonnenConfig {
    /// Returns the token only if it is set and not blank
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|t| t.expose_secret().trim())
            .filter(|t| !t.is_empty())
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        // Load environment variables from .env if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SONNENBATTERIE_EXPORTER").separator("__"),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Checks the settings the exporter cannot start without
    pub fn validate(&self) -> std::result::Result<(), ExporterError> {
        let url = self.sonnenbatterie.url.trim();
        if url.is_empty() {
            return Err(ExporterError::Config(
                "no sonnenbatterie url set".to_string(),
            ));
        }
        reqwest::Url::parse(url).map_err(|e| {
            ExporterError::Config(format!("invalid sonnenbatterie url '{}': {}", url, e))
        })?;

        if self.sonnenbatterie.timeout_seconds == 0 {
            return Err(ExporterError::Config(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }

        if !self.server.metrics_path.starts_with('/') {
            return Err(ExporterError::Config(format!(
                "metrics path must start with '/': {}",
                self.server.metrics_path
            )));
        }

        if matches!(self.server.metrics_path.as_str(), "/" | "/health") {
            return Err(ExporterError::Config(format!(
                "metrics path collides with a built-in route: {}",
                self.server.metrics_path
            )));
        }

        Ok(())
    }
}
