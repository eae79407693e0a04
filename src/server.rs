//! HTTP Server
//!
//! Exposes the collector over HTTP for Prometheus to scrape.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with a link to the metrics
//! - `GET {metrics_path}` - Prometheus metrics in text format (default `/metrics`)
//! - `GET /health` - Liveness check, always 200 while the process serves HTTP
//!
//! # Metrics Collection
//!
//! There is no background loop: every request to the metrics path runs one
//! scrape against the battery and renders exactly what that scrape produced.
//! Overlapping requests run independent scrapes.

use crate::collectors::Collector;
use crate::config::Config;
use crate::metrics::{Exposition, MetricDescriptors};
use crate::sonnen::{DeviceApi, SonnenClient};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, Level};

const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub struct AppState<C> {
    pub collector: Arc<Collector<C>>,
    pub exposition: Arc<Exposition>,
    pub metrics_path: Arc<str>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            collector: self.collector.clone(),
            exposition: self.exposition.clone(),
            metrics_path: self.metrics_path.clone(),
        }
    }
}

/// Wire the battery client, collector and exposition for `config`
pub fn build_state(config: &Config) -> anyhow::Result<AppState<SonnenClient>> {
    let client = SonnenClient::new(&config.sonnenbatterie)?;
    if !client.has_token() {
        info!("No API token configured, only status metrics will be exported");
    }

    let descriptors = Arc::new(MetricDescriptors::new());
    let collector = Collector::new(client, descriptors)
        .with_timeout(Duration::from_secs(config.sonnenbatterie.timeout_seconds));

    let described = collector.describe();
    info!("Registered {} always exported metric families", described.len());
    for descriptor in described {
        debug!("Describing {} ({:?})", descriptor.name, descriptor.kind);
    }

    Ok(AppState {
        collector: Arc::new(collector),
        exposition: Arc::new(Exposition::new()?),
        metrics_path: Arc::from(config.server.metrics_path.as_str()),
    })
}

pub async fn start(config: Config) -> anyhow::Result<()> {
    let app = router(build_state(&config)?);

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!(
        "Metrics available at http://{}{}",
        addr, config.server.metrics_path
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for the given state
pub fn router<C>(state: AppState<C>) -> Router
where
    C: DeviceApi + 'static,
{
    let metrics_path = state.metrics_path.to_string();

    Router::new()
        .route("/", get(root_handler::<C>))
        .route(&metrics_path, get(metrics_handler::<C>))
        .route("/health", get(health_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn root_handler<C>(State(state): State<AppState<C>>) -> Html<String>
where
    C: DeviceApi + 'static,
{
    Html(format!(
        r#"<html>
<head><title>Sonnenbatterie Exporter</title></head>
<body>
<h1>Sonnenbatterie Exporter</h1>
<p><a href="{path}">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
        path = state.metrics_path
    ))
}

async fn metrics_handler<C>(State(state): State<AppState<C>>) -> Response
where
    C: DeviceApi + 'static,
{
    let samples = state.collector.collect().await;
    debug!("Scrape produced {} samples", samples.len());

    match state.exposition.render(&samples) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE_TEXT)], body).into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
