//! Shared fixtures and a configurable in-memory battery

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use sonnenbatterie_exporter::error::{ExporterError, Result};
use sonnenbatterie_exporter::sonnen::types::{LatestData, PowerMeterRecord, Status};
use sonnenbatterie_exporter::sonnen::DeviceApi;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Log lines written while a [`capture_logs`] guard is alive
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Route this thread's tracing output through `filter` into a buffer
pub fn capture_logs(filter: &str) -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::registry().with(EnvFilter::new(filter)).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(move || writer.clone()),
    );
    (logs, tracing::subscriber::set_default(subscriber))
}

pub fn status_fixture() -> Status {
    serde_json::from_value(json!({
        "Uac": 230.0,
        "Fac": 50.0,
        "RSOC": 80,
        "USOC": 75,
        "Consumption_W": 500,
        "Production_W": 1200,
        "RemainingCapacity_Wh": 4000
    }))
    .expect("valid status fixture")
}

pub fn power_meter_record(direction: &str, base: f64) -> PowerMeterRecord {
    serde_json::from_value(json!({
        "direction": direction,
        "v_l1_n": 231.0,
        "v_l2_n": 232.0,
        "v_l3_n": 233.0,
        "v_l1_l2": 400.0,
        "v_l2_l3": 401.0,
        "v_l3_l1": 402.0,
        "w_l1": base + 1.0,
        "w_l2": base + 2.0,
        "w_l3": base + 3.0,
        "kwh_imported": base * 100.0
    }))
    .expect("valid power meter fixture")
}

pub fn latest_data_fixture(seconds_since_full_charge: i64) -> LatestData {
    serde_json::from_value(json!({
        "FullChargeCapacity": 10000,
        "ic_status": {
            "secondssincefullcharge": seconds_since_full_charge
        }
    }))
    .expect("valid latest data fixture")
}

pub fn api_error(endpoint: &str) -> ExporterError {
    ExporterError::Api {
        endpoint: endpoint.to_string(),
        status: 500,
    }
}

/// Battery double with canned responses and call counters
pub struct MockDevice {
    pub token: bool,
    pub status_ok: bool,
    pub power_meter_ok: bool,
    pub latest_data_ok: bool,
    /// Delay applied to the power meter request only
    pub power_meter_delay: Option<Duration>,
    pub seconds_since_full_charge: i64,
    pub status_calls: AtomicUsize,
    pub power_meter_calls: AtomicUsize,
    pub latest_data_calls: AtomicUsize,
    /// Power meter requests dropped before they completed
    pub abandoned_fetches: AtomicUsize,
}

struct InFlight<'a> {
    abandoned: &'a AtomicUsize,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.abandoned.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl MockDevice {
    pub fn healthy(token: bool) -> Self {
        Self {
            token,
            status_ok: true,
            power_meter_ok: true,
            latest_data_ok: true,
            power_meter_delay: None,
            seconds_since_full_charge: 3600,
            status_calls: AtomicUsize::new(0),
            power_meter_calls: AtomicUsize::new(0),
            latest_data_calls: AtomicUsize::new(0),
            abandoned_fetches: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.status_calls.load(Ordering::SeqCst),
            self.power_meter_calls.load(Ordering::SeqCst),
            self.latest_data_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl DeviceApi for MockDevice {
    async fn get_status(&self) -> Result<Status> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.status_ok {
            Ok(status_fixture())
        } else {
            Err(api_error("status"))
        }
    }

    async fn get_power_meter(&self) -> Result<(PowerMeterRecord, PowerMeterRecord)> {
        self.power_meter_calls.fetch_add(1, Ordering::SeqCst);
        let mut in_flight = InFlight {
            abandoned: &self.abandoned_fetches,
            finished: false,
        };
        if let Some(delay) = self.power_meter_delay {
            tokio::time::sleep(delay).await;
        }
        in_flight.finished = true;
        if self.power_meter_ok {
            Ok((
                power_meter_record("production", 1000.0),
                power_meter_record("consumption", 500.0),
            ))
        } else {
            Err(api_error("powermeter"))
        }
    }

    async fn get_latest_data(&self) -> Result<LatestData> {
        self.latest_data_calls.fetch_add(1, Ordering::SeqCst);
        if self.latest_data_ok {
            Ok(latest_data_fixture(self.seconds_since_full_charge))
        } else {
            Err(api_error("latestdata"))
        }
    }

    fn has_token(&self) -> bool {
        self.token
    }
}
