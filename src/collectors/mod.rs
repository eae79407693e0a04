//! Scrape Collector
//!
//! Turns one scrape request into a set of [`Sample`]s by querying the battery.
//!
//! # Architecture
//!
//! A scrape runs three steps in order:
//! 1. **status** - always
//! 2. **power meter** - only when an API token is configured
//! 3. **latest data** - only when an API token is configured
//!
//! Every step goes through [`collect_step`], which bounds the device request
//! with its own timeout and either maps the response into samples or logs the
//! failure.
//!
//! # Error Handling
//!
//! A failed or timed out step contributes no samples. The other steps still
//! run and the scrape as a whole still succeeds. There are no retries, the
//! next scrape is the retry.

pub mod clock;
pub mod latest_data;
pub mod power_meter;
pub mod status;

pub use clock::{Clock, SystemClock};

use crate::error::ExporterError;
use crate::metrics::{MetricDescriptor, MetricDescriptors, Sample, Samples};
use crate::sonnen::DeviceApi;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Bound for each individual device request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Status of a single collection step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Data was fetched and mapped into samples
    Success,
    /// Fetch failed or timed out (already logged)
    Failed,
}

/// Fetch, map and emit, or log and skip
///
/// Runs `fetch` with `timeout`. On success `process` maps the data into
/// `samples`; on error or timeout the failure is logged and nothing is
/// emitted.
///
/// # Examples
///
/// ```no_run
/// # use sonnenbatterie_exporter::collectors::*;
/// # use sonnenbatterie_exporter::metrics::{MetricDescriptors, Samples};
/// # use sonnenbatterie_exporter::sonnen::DeviceApi;
/// async fn example(client: &impl DeviceApi, d: &MetricDescriptors) {
///     let mut samples = Samples::new();
///     collect_step(
///         "status",
///         DEFAULT_TIMEOUT,
///         client.get_status(),
///         &mut samples,
///         |status, out| out.emit(&d.grid_frequency, status.fac, &[]),
///     )
///     .await;
/// }
/// ```
pub async fn collect_step<'a, T, E, F, P>(
    name: &str,
    timeout: Duration,
    fetch: F,
    samples: &mut Samples<'a>,
    process: P,
) -> CollectionStatus
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnOnce(T, &mut Samples<'a>),
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(data)) => {
            let before = samples.len();
            process(data, samples);
            debug!(
                step = name,
                samples = samples.len() - before,
                "Collected {}",
                name
            );
            CollectionStatus::Success
        }
        Ok(Err(e)) => {
            error!(step = name, error = %e, "Failed to get {}", name);
            CollectionStatus::Failed
        }
        Err(_) => {
            let e = ExporterError::Timeout {
                endpoint: name.to_string(),
                after: timeout,
            };
            error!(step = name, error = %e, "Failed to get {}", name);
            CollectionStatus::Failed
        }
    }
}

/// Collects battery metrics on demand
///
/// Holds no mutable state, so one instance can serve any number of
/// concurrent scrapes.
pub struct Collector<C, K = SystemClock> {
    client: C,
    descriptors: Arc<MetricDescriptors>,
    clock: K,
    timeout: Duration,
}

impl<C: DeviceApi> Collector<C, SystemClock> {
    pub fn new(client: C, descriptors: Arc<MetricDescriptors>) -> Self {
        Self {
            client,
            descriptors,
            clock: SystemClock,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl<C: DeviceApi, K: Clock> Collector<C, K> {
    /// Replace the wall clock used for derived timestamps
    pub fn with_clock<K2: Clock>(self, clock: K2) -> Collector<C, K2> {
        Collector {
            client: self.client,
            descriptors: self.descriptors,
            clock,
            timeout: self.timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn descriptors(&self) -> &MetricDescriptors {
        &self.descriptors
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Descriptors that are exported regardless of the API token
    pub fn describe(&self) -> Vec<&MetricDescriptor> {
        let d = &*self.descriptors;
        vec![
            &d.grid_voltage,
            &d.grid_frequency,
            &d.charge_percent,
            &d.usable_charge_percent,
            &d.consumption_power,
            &d.production_power,
            &d.remaining_charge_capacity,
        ]
    }

    /// Run one scrape
    pub async fn collect(&self) -> Vec<Sample<'_>> {
        let d = &*self.descriptors;
        let mut samples = Samples::new();

        collect_step(
            "status",
            self.timeout,
            self.client.get_status(),
            &mut samples,
            |reading, out| status::map_status(&reading, d, out),
        )
        .await;

        if self.client.has_token() {
            collect_step(
                "power meter",
                self.timeout,
                self.client.get_power_meter(),
                &mut samples,
                |(production, consumption), out| {
                    power_meter::map_power_meter(&production, &consumption, d, out)
                },
            )
            .await;

            collect_step(
                "latest data",
                self.timeout,
                self.client.get_latest_data(),
                &mut samples,
                |latest, out| {
                    latest_data::map_latest_data(&latest, self.clock.now_unix_seconds(), d, out)
                },
            )
            .await;
        } else {
            debug!("No API token configured, skipping power meter and latest data");
        }

        samples.into_vec()
    }
}
