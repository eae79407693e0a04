//! Status Metrics
//!
//! Maps `/api/v2/status`, the only endpoint that works without a token.
//!
//! # Metrics Produced
//! - `solar_battery_grid_voltage{phase=""}`
//! - `solar_battery_grid_frequency`
//! - `solar_battery_charge_percent`
//! - `solar_battery_usable_charge_percent`
//! - `solar_battery_consumption_power{phase=""}`
//! - `solar_battery_production_power{phase=""}`
//! - `solar_battery_remaining_charge_capacity`
//!
//! Status reports aggregate figures, so the phase label is empty to keep them
//! apart from the per-phase power meter readings.

use crate::metrics::{MetricDescriptors, Samples};
use crate::sonnen::types::Status;

const AGGREGATE: &str = "";

pub fn map_status<'a>(status: &Status, d: &'a MetricDescriptors, out: &mut Samples<'a>) {
    out.emit(&d.grid_voltage, status.uac, &[AGGREGATE]);
    out.emit(&d.grid_frequency, status.fac, &[]);
    out.emit(&d.charge_percent, status.rsoc, &[]);
    out.emit(&d.usable_charge_percent, status.usoc, &[]);
    out.emit(&d.consumption_power, status.consumption_w, &[AGGREGATE]);
    out.emit(&d.production_power, status.production_w, &[AGGREGATE]);
    out.emit(&d.remaining_charge_capacity, status.remaining_capacity_wh, &[]);
}
