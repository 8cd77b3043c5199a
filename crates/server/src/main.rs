//! Hoist server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use hoist_core::config::AppConfig;
use hoist_server::{AppState, SitePages, create_router};
use std::net::SocketAddr;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Hoist - publish static sites and serve them from per-deployment subdomains
#[derive(Parser, Debug)]
#[command(name = "hoistd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "HOIST_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Hoist v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args.config)?;
    tracing::info!(origin = %config.server.origin_host(), "Configuration loaded");

    hoist_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    let storage = hoist_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    storage
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!(backend = storage.backend_name(), "Storage backend ready");

    let counters = hoist_counters::from_config(&config.counters)
        .await
        .context("failed to initialize counters store")?;
    counters
        .health_check()
        .await
        .context("counters health check failed")?;
    tracing::info!(backend = counters.backend_name(), "Counters store ready");

    let pages = SitePages::load(&config.site)
        .await
        .context("failed to load site pages")?;

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    let state = AppState::new(config, storage, counters, pages);
    let app = create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Merge the optional config file with `HOIST_` environment variables.
fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    let has_config_file = Path::new(path).exists();

    if has_config_file {
        tracing::info!(config_path = %path, "Loading configuration from file");
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!("No config file found at {}", path);
    }

    // HOIST_CONFIG is only the file path.
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("HOIST_") && key != "HOIST_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: hoistd --config /path/to/config.toml\n  \
             2. Environment variables: HOIST_SERVER__ORIGIN=hoist.example \
             HOIST_STORAGE__TYPE=filesystem HOIST_STORAGE__PATH=/var/lib/hoist \
             HOIST_COUNTERS__TYPE=sqlite HOIST_COUNTERS__PATH=/var/lib/hoist/counters.db hoistd\n\n\
             See config/server.example.toml for example configuration.\n\
             Set HOIST_CONFIG env var to specify a default config file path."
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("HOIST_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    Ok(config)
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, draining connections");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, draining connections");
        }
    }
}
