//! Power Meter Metrics
//!
//! Maps the production and consumption channels of `/api/v2/powermeter`.
//!
//! # Metrics Produced
//! - `solar_battery_grid_voltage` - consumption channel
//!   - Labels: phase (L1, L2, L3, L1-L2, L2-L3, L3-L1)
//! - `solar_battery_consumption_power` - Labels: phase (L1, L2, L3)
//! - `solar_battery_consumption_energy_total`
//! - `solar_battery_production_power` - Labels: phase (L1, L2, L3)
//! - `solar_battery_production_energy_total`

use crate::metrics::{MetricDescriptors, Samples};
use crate::sonnen::types::PowerMeterRecord;

pub fn map_power_meter<'a>(
    production: &PowerMeterRecord,
    consumption: &PowerMeterRecord,
    d: &'a MetricDescriptors,
    out: &mut Samples<'a>,
) {
    // Grid voltage is measured on the consumption channel
    out.emit(&d.grid_voltage, consumption.v_l1_n, &["L1"]);
    out.emit(&d.grid_voltage, consumption.v_l2_n, &["L2"]);
    out.emit(&d.grid_voltage, consumption.v_l3_n, &["L3"]);
    out.emit(&d.grid_voltage, consumption.v_l1_l2, &["L1-L2"]);
    out.emit(&d.grid_voltage, consumption.v_l2_l3, &["L2-L3"]);
    out.emit(&d.grid_voltage, consumption.v_l3_l1, &["L3-L1"]);

    out.emit(&d.consumption_power, consumption.w_l1, &["L1"]);
    out.emit(&d.consumption_power, consumption.w_l2, &["L2"]);
    out.emit(&d.consumption_power, consumption.w_l3, &["L3"]);
    out.emit(&d.consumption_energy, consumption.kwh_imported, &[]);

    out.emit(&d.production_power, production.w_l1, &["L1"]);
    out.emit(&d.production_power, production.w_l2, &["L2"]);
    out.emit(&d.production_power, production.w_l3, &["L3"]);
    out.emit(&d.production_energy, production.kwh_imported, &[]);
}
