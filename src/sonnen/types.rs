//! sonnenBatterie API Type Definitions
//!
//! Response bodies of the JSON API v2 as served by the battery on the local
//! network.
//!
//! # API Endpoints Covered
//!
//! - `GET /api/v2/status` → [`Status`]
//! - `GET /api/v2/powermeter` → [`PowerMeterPayload`] of [`PowerMeterRecord`]
//! - `GET /api/v2/latestdata` → [`LatestData`], [`IcStatus`]
//!
//! Only the fields the exporter reads are mandatory. Everything else is
//! optional so firmware updates that drop a field do not break a scrape.

#![allow(dead_code)] // Allow unused fields in API structs for completeness
use crate::error::{ExporterError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;

/// `/api/v2/status`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Status {
    /// Grid voltage (AC)
    #[serde(rename = "Uac")]
    pub uac: f64,
    /// Grid frequency in Hz
    #[serde(rename = "Fac")]
    pub fac: f64,
    /// Relative state of charge in percent
    #[serde(rename = "RSOC")]
    pub rsoc: f64,
    /// Usable state of charge in percent
    #[serde(rename = "USOC")]
    pub usoc: f64,
    #[serde(rename = "Consumption_W")]
    pub consumption_w: f64,
    #[serde(rename = "Production_W")]
    pub production_w: f64,
    #[serde(rename = "RemainingCapacity_Wh")]
    pub remaining_capacity_wh: f64,

    #[serde(rename = "Pac_total_W", default)]
    pub pac_total_w: Option<f64>,
    #[serde(rename = "GridFeedIn_W", default)]
    pub grid_feed_in_w: Option<f64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "BatteryCharging", default)]
    pub battery_charging: Option<bool>,
    #[serde(rename = "BatteryDischarging", default)]
    pub battery_discharging: Option<bool>,
    #[serde(rename = "SystemStatus", default)]
    pub system_status: Option<String>,
}

/// One channel of `/api/v2/powermeter`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerMeterRecord {
    /// `production` or `consumption`
    pub direction: String,

    pub v_l1_n: f64,
    pub v_l2_n: f64,
    pub v_l3_n: f64,
    pub v_l1_l2: f64,
    pub v_l2_l3: f64,
    pub v_l3_l1: f64,

    pub w_l1: f64,
    pub w_l2: f64,
    pub w_l3: f64,

    pub kwh_imported: f64,

    #[serde(default)]
    pub kwh_exported: Option<f64>,
    #[serde(default)]
    pub a_l1: Option<f64>,
    #[serde(default)]
    pub a_l2: Option<f64>,
    #[serde(default)]
    pub a_l3: Option<f64>,
    #[serde(default)]
    pub w_total: Option<f64>,
    #[serde(default)]
    pub va_total: Option<f64>,
    #[serde(default)]
    pub var_total: Option<f64>,
    #[serde(default)]
    pub channel: Option<u32>,
    #[serde(default)]
    pub deviceid: Option<u32>,
    #[serde(default)]
    pub error: Option<i64>,
}

/// Body of `/api/v2/powermeter`
///
/// Older firmware returns an object keyed by channel number, newer firmware a
/// plain array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PowerMeterPayload {
    List(Vec<PowerMeterRecord>),
    Keyed(BTreeMap<String, PowerMeterRecord>),
}

impl PowerMeterPayload {
    pub fn into_records(self) -> Vec<PowerMeterRecord> {
        match self {
            PowerMeterPayload::List(records) => records,
            PowerMeterPayload::Keyed(records) => records.into_values().collect(),
        }
    }

    /// Split into `(production, consumption)`
    pub fn split(self) -> Result<(PowerMeterRecord, PowerMeterRecord)> {
        let mut production = None;
        let mut consumption = None;

        for record in self.into_records() {
            let slot = match record.direction.as_str() {
                "production" => &mut production,
                "consumption" => &mut consumption,
                _ => continue,
            };
            // First record of a direction wins
            if slot.is_none() {
                *slot = Some(record);
            }
        }

        match (production, consumption) {
            (Some(p), Some(c)) => Ok((p, c)),
            (None, _) => Err(missing_direction("production")),
            (_, None) => Err(missing_direction("consumption")),
        }
    }
}

fn missing_direction(direction: &str) -> ExporterError {
    ExporterError::InvalidPayload {
        endpoint: "powermeter".to_string(),
        reason: format!("no {} record", direction),
    }
}

/// `/api/v2/latestdata`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatestData {
    /// Full charge capacity in watt hours
    #[serde(rename = "FullChargeCapacity")]
    pub full_charge_capacity: f64,
    pub ic_status: IcStatus,

    #[serde(rename = "Consumption_W", default)]
    pub consumption_w: Option<f64>,
    #[serde(rename = "Production_W", default)]
    pub production_w: Option<f64>,
    #[serde(rename = "USOC", default)]
    pub usoc: Option<f64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: Option<String>,
}

/// Battery charge controller state
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IcStatus {
    pub secondssincefullcharge: i64,

    #[serde(rename = "nrbatterymodules", default)]
    pub nr_battery_modules: Option<u32>,
    #[serde(rename = "statebms", default)]
    pub state_bms: Option<String>,
    #[serde(rename = "statecorecontrolmodule", default)]
    pub state_core_control_module: Option<String>,
    #[serde(rename = "stateinverter", default)]
    pub state_inverter: Option<String>,
}
