//! sonnenBatterie Prometheus Exporter
//!
//! A Prometheus metrics exporter for sonnenBatterie home energy storage systems.
//!
//! # Overview
//!
//! On every scrape the exporter queries the battery's local JSON API and turns
//! grid, charge, power meter and capacity readings into Prometheus metrics.
//! Nothing is cached between scrapes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     HTTP/JSON       ┌──────────────┐
//! │ sonnenBatt.  │ ◄─────────────────► │   Exporter   │
//! │  API v2      │   status,           │              │
//! └──────────────┘   powermeter,       │  ┌────────┐  │      HTTP      ┌────────────┐
//!                    latestdata        │  │Collect.│  │ ◄────────────► │ Prometheus │
//!                                      │  └────────┘  │   /metrics     └────────────┘
//!                                      │  ┌────────┐  │
//!                                      │  │Metrics │  │
//!                                      │  └────────┘  │
//!                                      └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`sonnen`] - HTTP client and API type definitions
//! - [`metrics`] - Metric catalog and Prometheus text rendering
//! - [`collectors`] - Per-scrape collection with per-endpoint failure isolation
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use sonnenbatterie_exporter::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     config.validate()?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! Without an API token only the status endpoint is queried. With a token the
//! per-phase power meter readings and the latest data (last full charge, full
//! charge capacity) are exported as well.

pub mod collectors;
pub mod config;
pub mod error;
pub mod metrics;
pub mod server;
pub mod sonnen;
