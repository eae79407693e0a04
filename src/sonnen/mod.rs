//! sonnenBatterie device access
//!
//! [`DeviceApi`] is the seam between the collector and the battery. The
//! production implementation is [`SonnenClient`]; tests substitute their own.

pub mod client;
pub mod types;

pub use client::SonnenClient;

use crate::error::Result;
use async_trait::async_trait;
use types::{LatestData, PowerMeterRecord, Status};

/// Typed fetch operations against the three battery endpoints
///
/// Futures returned by these methods may be dropped at any point; dropping
/// them cancels the underlying request.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// Fetch `/api/v2/status`. Works without a token.
    async fn get_status(&self) -> Result<Status>;

    /// Fetch `/api/v2/powermeter`, split into `(production, consumption)`.
    async fn get_power_meter(&self) -> Result<(PowerMeterRecord, PowerMeterRecord)>;

    /// Fetch `/api/v2/latestdata`.
    async fn get_latest_data(&self) -> Result<LatestData>;

    /// Whether an API token is configured
    fn has_token(&self) -> bool;
}
