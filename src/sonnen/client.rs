//! sonnenBatterie HTTP API Client
//!
//! Talks to the JSON API v2 exposed by the battery on the local network.
//!
//! # Authentication
//!
//! `status` is open. `powermeter` and `latestdata` need the API token that can
//! be generated in the battery's web UI; it is sent in the `Auth-Token` header.
//!
//! # Example
//!
//! ```no_run
//! use sonnenbatterie_exporter::config::SonnenConfig;
//! use sonnenbatterie_exporter::sonnen::{DeviceApi, SonnenClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SonnenConfig {
//!     url: "http://192.168.1.50".to_string(),
//!     token: None,
//!     timeout_seconds: 15,
//! };
//!
//! let client = SonnenClient::new(&config)?;
//! let status = client.get_status().await?;
//! println!("state of charge: {}%", status.usoc);
//! # Ok(())
//! # }
//! ```

use crate::config::SonnenConfig;
use crate::error::{ExporterError, Result};
use crate::sonnen::types::{LatestData, PowerMeterPayload, PowerMeterRecord, Status};
use crate::sonnen::DeviceApi;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const AUTH_HEADER: &str = "Auth-Token";

/// Client for the sonnenBatterie JSON API v2
///
/// Cheap to share: the inner `reqwest::Client` pools connections and is
/// `Send + Sync`.
pub struct SonnenClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SonnenClient {
    pub fn new(config: &SonnenConfig) -> Result<Self> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| {
            ExporterError::Config(format!("invalid sonnenbatterie url '{}': {}", base_url, e))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: config.token().map(str::to_string),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/api/v2/{}", self.base_url, endpoint)
    }

    /// GET an endpoint and deserialize the JSON body
    async fn get_json<T>(&self, endpoint: &str, authenticated: bool) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.http.get(self.endpoint_url(endpoint));
        if authenticated {
            let token = self
                .token
                .as_deref()
                .ok_or_else(|| ExporterError::MissingToken(endpoint.to_string()))?;
            request = request.header(AUTH_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExporterError::Api {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        debug!(endpoint, bytes = body.len(), "Received response");
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl DeviceApi for SonnenClient {
    async fn get_status(&self) -> Result<Status> {
        self.get_json("status", false).await
    }

    async fn get_power_meter(&self) -> Result<(PowerMeterRecord, PowerMeterRecord)> {
        let payload: PowerMeterPayload = self.get_json("powermeter", true).await?;
        payload.split()
    }

    async fn get_latest_data(&self) -> Result<LatestData> {
        self.get_json("latestdata", true).await
    }

    fn has_token(&self) -> bool {
        self.token.is_some()
    }
}
