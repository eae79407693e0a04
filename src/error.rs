use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sonnenBatterie API error: {endpoint} returned HTTP {status}")]
    Api { endpoint: String, status: u16 },

    #[error("Invalid payload from {endpoint}: {reason}")]
    InvalidPayload { endpoint: String, reason: String },

    #[error("No API token configured, cannot query {0}")]
    MissingToken(String),

    #[error("Timed out after {after:?} waiting for {endpoint}")]
    Timeout { endpoint: String, after: Duration },

    #[error("Metric {metric} expects {expected} label values, got {got}")]
    LabelArity {
        metric: String,
        expected: usize,
        got: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
