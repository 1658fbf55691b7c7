//! # Propex Gateway
//!
//! Single edge process in front of the service mesh. Verifies bearer
//! credentials, injects the trusted identity headers, and forwards each
//! request to the backend resolved by path prefix.

use std::net::SocketAddr;

use anyhow::Context;
use axum::{Router, middleware};
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propex_config::{ConfigLoad, ConfigLoader};
use propex_gateway::{GatewayState, auth, proxy};

#[derive(Parser, Debug)]
#[command(name = "propex-gateway")]
#[command(about = "Propex edge gateway")]
struct Cli {
    /// Override the configured listen port
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let ConfigLoad {
        mut config,
        warnings,
    } = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => warn!(message = %warning.message, hint = %hint, "configuration warning"),
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }
    if config.auth.is_default_secret() {
        warn!("running with the built-in development JWT secret");
    }

    if let Some(port) = cli.port {
        config.gateway.port = port;
    }
    if let Some(host) = cli.host {
        config.gateway.host = host;
    }

    for route in &config.gateway.routes {
        info!(prefix = %route.prefix, backend = %route.backend, "route registered");
    }

    let state = GatewayState::new(&config.gateway, config.auth.jwt_secret.clone());
    let app = Router::new()
        .fallback(proxy::forward)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.gateway.host, config.gateway.port)
        .parse()
        .context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "gateway listening");

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
