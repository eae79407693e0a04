//! Prometheus Metrics Definitions
//!
//! This module defines every metric exposed by the sonnenBatterie exporter and
//! turns the samples of one scrape into the Prometheus text format.
//!
//! # Metric Catalog
//!
//! | Name | Type | Labels |
//! |------|------|--------|
//! | `solar_battery_grid_voltage` | gauge | phase |
//! | `solar_battery_grid_frequency` | gauge | |
//! | `solar_battery_charge_percent` | gauge | |
//! | `solar_battery_usable_charge_percent` | gauge | |
//! | `solar_battery_consumption_power` | gauge | phase |
//! | `solar_battery_consumption_energy_total` | counter | |
//! | `solar_battery_production_power` | gauge | phase |
//! | `solar_battery_production_energy_total` | counter | |
//! | `solar_battery_last_fully_charged_unix_timestamp` | gauge | |
//! | `solar_battery_full_charge_capacity` | gauge | |
//! | `solar_battery_remaining_charge_capacity` | gauge | |
//!
//! The `phase` label is empty for the aggregate figures reported by the status
//! endpoint and `L1`, `L2`, `L3`, `L1-L2`, `L2-L3`, `L3-L1` for power meter
//! readings.
//!
//! # Exposition
//!
//! Samples are values of a single scrape, not long-lived gauges. [`Exposition`]
//! builds a fresh [`Registry`] for every render so concurrent scrapes never
//! observe each other's values. The exporter's own metrics (build info and, on
//! Linux, `process_*`) live in a registry that is created once.

use crate::error::{ExporterError, Result};
use prometheus::{CounterVec, Encoder, GaugeVec, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::{error, warn};

const PHASE: &[&str] = &["phase"];
const NO_LABELS: &[&str] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Name, help text and label schema of one exported metric
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
    pub kind: MetricKind,
}

impl MetricDescriptor {
    const fn gauge(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            labels,
            kind: MetricKind::Gauge,
        }
    }

    const fn counter(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            labels: NO_LABELS,
            kind: MetricKind::Counter,
        }
    }
}

/// The fixed catalog of metrics, built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct MetricDescriptors {
    pub grid_voltage: MetricDescriptor,
    pub grid_frequency: MetricDescriptor,
    pub charge_percent: MetricDescriptor,
    pub usable_charge_percent: MetricDescriptor,
    pub consumption_power: MetricDescriptor,
    pub consumption_energy: MetricDescriptor,
    pub production_power: MetricDescriptor,
    pub production_energy: MetricDescriptor,
    pub last_fully_charged: MetricDescriptor,
    pub full_charge_capacity: MetricDescriptor,
    pub remaining_charge_capacity: MetricDescriptor,
}

impl MetricDescriptors {
    pub fn new() -> Self {
        Self {
            grid_voltage: MetricDescriptor::gauge(
                "solar_battery_grid_voltage",
                "Solar battery Grid (AC) voltage",
                PHASE,
            ),
            grid_frequency: MetricDescriptor::gauge(
                "solar_battery_grid_frequency",
                "Solar battery Grid (AC) frequency in Hz",
                NO_LABELS,
            ),
            charge_percent: MetricDescriptor::gauge(
                "solar_battery_charge_percent",
                "Solar battery charge in percent",
                NO_LABELS,
            ),
            usable_charge_percent: MetricDescriptor::gauge(
                "solar_battery_usable_charge_percent",
                "Solar battery usable charge in percent",
                NO_LABELS,
            ),
            consumption_power: MetricDescriptor::gauge(
                "solar_battery_consumption_power",
                "Solar battery consumption power in watts",
                PHASE,
            ),
            consumption_energy: MetricDescriptor::counter(
                "solar_battery_consumption_energy_total",
                "Total consumption measured in kWh",
            ),
            production_power: MetricDescriptor::gauge(
                "solar_battery_production_power",
                "Solar battery production power in watts",
                PHASE,
            ),
            production_energy: MetricDescriptor::counter(
                "solar_battery_production_energy_total",
                "Total production measured in kWh",
            ),
            last_fully_charged: MetricDescriptor::gauge(
                "solar_battery_last_fully_charged_unix_timestamp",
                "Timestamp of last full charge",
                NO_LABELS,
            ),
            full_charge_capacity: MetricDescriptor::gauge(
                "solar_battery_full_charge_capacity",
                "Full charge capacity in watt hours",
                NO_LABELS,
            ),
            remaining_charge_capacity: MetricDescriptor::gauge(
                "solar_battery_remaining_charge_capacity",
                "Remaining charge capacity in watt hours",
                NO_LABELS,
            ),
        }
    }

    /// All eleven descriptors, in catalog order
    pub fn all(&self) -> Vec<&MetricDescriptor> {
        vec![
            &self.grid_voltage,
            &self.grid_frequency,
            &self.charge_percent,
            &self.usable_charge_percent,
            &self.consumption_power,
            &self.consumption_energy,
            &self.production_power,
            &self.production_energy,
            &self.last_fully_charged,
            &self.full_charge_capacity,
            &self.remaining_charge_capacity,
        ]
    }
}

impl Default for MetricDescriptors {
    fn default() -> Self {
        Self::new()
    }
}

/// One value of one metric, produced by a single scrape
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<'a> {
    descriptor: &'a MetricDescriptor,
    value: f64,
    label_values: Vec<String>,
}

impl<'a> Sample<'a> {
    /// Fails if the number of label values differs from the descriptor's labels
    pub fn new(
        descriptor: &'a MetricDescriptor,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self> {
        if label_values.len() != descriptor.labels.len() {
            return Err(ExporterError::LabelArity {
                metric: descriptor.name.to_string(),
                expected: descriptor.labels.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            descriptor,
            value,
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn descriptor(&self) -> &'a MetricDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Value of the named label, if the descriptor declares it
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .labels
            .iter()
            .position(|l| *l == name)
            .map(|i| self.label_values[i].as_str())
    }
}

/// Sample buffer for one scrape
#[derive(Debug, Default)]
pub struct Samples<'a> {
    samples: Vec<Sample<'a>>,
}

impl<'a> Samples<'a> {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Record a sample; one with the wrong label count is logged and dropped
    pub fn emit(
        &mut self,
        descriptor: &'a MetricDescriptor,
        value: f64,
        label_values: &[&str],
    ) {
        match Sample::new(descriptor, value, label_values) {
            Ok(sample) => self.samples.push(sample),
            Err(e) => error!("Dropping sample: {}", e),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_vec(self) -> Vec<Sample<'a>> {
        self.samples
    }
}

/// Renders scrape samples in the Prometheus text format
pub struct Exposition {
    static_registry: Registry,
}

impl Exposition {
    pub fn new() -> anyhow::Result<Self> {
        let static_registry = Registry::new();

        let build_info = IntGaugeVec::new(
            Opts::new("build_info", "Build information of the sonnenBatterie exporter")
                .namespace("solar_battery_exporter"),
            &["version"],
        )?;
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION")])
            .set(1);
        static_registry.register(Box::new(build_info))?;

        #[cfg(target_os = "linux")]
        static_registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self { static_registry })
    }

    /// Render the given samples together with the exporter's own metrics
    pub fn render(&self, samples: &[Sample<'_>]) -> Result<String> {
        let registry = Registry::new();

        for (descriptor, family) in group_by_descriptor(samples) {
            match descriptor.kind {
                MetricKind::Gauge => {
                    let vec = GaugeVec::new(
                        Opts::new(descriptor.name, descriptor.help),
                        descriptor.labels,
                    )?;
                    for sample in family {
                        let values = label_refs(sample);
                        vec.get_metric_with_label_values(values.as_slice())?
                            .set(sample.value);
                    }
                    registry.register(Box::new(vec))?;
                }
                MetricKind::Counter => {
                    let vec = CounterVec::new(
                        Opts::new(descriptor.name, descriptor.help),
                        descriptor.labels,
                    )?;
                    for sample in family {
                        if sample.value.is_nan() || sample.value < 0.0 {
                            warn!(
                                "Skipping counter {} with invalid value {}",
                                descriptor.name, sample.value
                            );
                            continue;
                        }
                        let values = label_refs(sample);
                        vec.get_metric_with_label_values(values.as_slice())?
                            .inc_by(sample.value);
                    }
                    registry.register(Box::new(vec))?;
                }
            }
        }

        let mut metric_families = registry.gather();
        metric_families.extend(self.static_registry.gather());

        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| {
            ExporterError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }
}

/// Groups samples by metric name, keeping first-seen order
fn group_by_descriptor<'s, 'a>(
    samples: &'s [Sample<'a>],
) -> Vec<(&'a MetricDescriptor, Vec<&'s Sample<'a>>)> {
    let mut groups: Vec<(&'a MetricDescriptor, Vec<&'s Sample<'a>>)> = Vec::new();
    for sample in samples {
        match groups
            .iter_mut()
            .find(|(d, _)| d.name == sample.descriptor.name)
        {
            Some((_, family)) => family.push(sample),
            None => groups.push((sample.descriptor, vec![sample])),
        }
    }
    groups
}

fn label_refs<'s>(sample: &'s Sample<'_>) -> Vec<&'s str> {
    sample.label_values.iter().map(String::as_str).collect()
}
