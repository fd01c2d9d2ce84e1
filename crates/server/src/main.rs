//! Backroom server binary.

use anyhow::{Context, Result};
use backroom_core::config::AppConfig;
use backroom_metadata::MetadataStore;
use backroom_server::bootstrap::ensure_admin_account;
use backroom_storage::AssetStore;
use backroom_server::mailer::TracingMailer;
use backroom_server::{AppState, create_router};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Backroom - admin-panel backend for an e-commerce platform
#[derive(Parser, Debug)]
#[command(name = "backroomd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "BACKROOM_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "backroomd=info,backroom_server=info,backroom_storage=info,\
             backroom_metadata=info,tower_http=info"
                .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config: AppConfig = Figment::new()
        .merge(Toml::file(&args.config))
        .merge(Env::prefixed("BACKROOM_").split("__"))
        .extract()
        .with_context(|| format!("failed to load configuration from {}", args.config))?;

    backroom_server::metrics::register_metrics();

    let storage = backroom_storage::from_config(&config.storage)
        .await
        .context("failed to initialize asset storage")?;
    tracing::info!(backend = storage.backend_name(), "asset storage initialized");

    let metadata = backroom_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata store health check failed")?;

    ensure_admin_account(metadata.as_ref(), config.bootstrap_admin.as_ref()).await?;

    let bind = config.server.bind.clone();
    let state = AppState::new(config, storage, metadata, Arc::new(TracingMailer));

    // Background sweep for the duplicate-upload cache; held for the life
    // of the process.
    let _sweeper = state.spawn_cache_sweeper();

    let router = create_router(state);

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {bind}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "backroom API listening");

    axum::serve(listener, router)
        .await
        .context("server error")?;

    Ok(())
}
