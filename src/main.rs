use anyhow::Result;
use clap::Parser;
use sonnenbatterie_exporter::{config::Config, server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    /// URL of the sonnenBatterie (overrides config)
    #[arg(long, env = "SONNENBATTERIE_URL")]
    sonnenbatterie_url: Option<String>,

    /// API token of the sonnenBatterie (overrides config)
    #[arg(long, env = "SONNENBATTERIE_TOKEN", hide_env_values = true)]
    sonnenbatterie_token: Option<String>,

    /// Port to listen on for metrics
    #[arg(short, long, env = "EXPORTER_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "EXPORTER_ADDR")]
    addr: Option<String>,

    /// Path to mount the metrics endpoint on
    #[arg(long, env = "EXPORTER_METRICS_PATH")]
    metrics_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting sonnenBatterie Prometheus Exporter v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let mut config = Config::load(&args.config)?;

    // Override with CLI arguments if provided
    if let Some(url) = args.sonnenbatterie_url {
        config.sonnenbatterie.url = url;
    }
    if let Some(token) = args.sonnenbatterie_token {
        config.sonnenbatterie.token = Some(secrecy::SecretString::new(token.into()));
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if let Some(metrics_path) = args.metrics_path {
        config.server.metrics_path = metrics_path;
    }

    if let Err(e) = config.validate() {
        error!("{}", e);
        std::process::exit(1);
    }

    info!("Configuration loaded successfully");
    info!("sonnenBatterie url: {}", config.sonnenbatterie.url);
    info!(
        "API token configured: {}",
        config.sonnenbatterie.token().is_some()
    );

    // Start the metrics server
    if let Err(e) = server::start(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
