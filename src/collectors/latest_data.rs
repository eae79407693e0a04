//! Latest Data Metrics
//!
//! # Metrics Produced
//! - `solar_battery_last_fully_charged_unix_timestamp`
//! - `solar_battery_full_charge_capacity`

use crate::metrics::{MetricDescriptors, Samples};
use crate::sonnen::types::LatestData;

/// `now` is the scrape's wall clock in epoch seconds. The device only reports
/// how long ago the last full charge was, so the timestamp is derived from
/// the time of the fetch, not the time the device took its sample.
pub fn map_latest_data<'a>(
    latest: &LatestData,
    now: f64,
    d: &'a MetricDescriptors,
    out: &mut Samples<'a>,
) {
    let last_fully_charged = now - latest.ic_status.secondssincefullcharge as f64;

    out.emit(&d.last_fully_charged, last_fully_charged, &[]);
    out.emit(&d.full_charge_capacity, latest.full_charge_capacity, &[]);
}
