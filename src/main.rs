//! Augury server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use augury::{create_router, ApiState, Config};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Augury: NL-to-SQL translation and forecasting server.
#[derive(Parser, Debug)]
#[command(name = "augury")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// HTTP port. If not specified, uses the config file value.
    #[arg(short, long)]
    port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Augury v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    if let Some(port) = args.port {
        config.server.http_port = port;
    }

    tracing::info!(
        database = %config.database_path().display(),
        llm_configured = config.llm.api_key.is_some(),
        forecast_api_configured = config.forecast.api_key.is_some(),
        "Configuration loaded"
    );

    let port = config.server.http_port;
    let state = Arc::new(ApiState::new(config)?);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Augury listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
