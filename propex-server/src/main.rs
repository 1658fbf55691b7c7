//! # Propex Server
//!
//! The listing service: criteria search with property composition,
//! location search over a bounding box, soft-delete mutations that emit
//! domain events, and the auth endpoints the gateway's public prefixes
//! point at.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propex_config::{ConfigLoad, ConfigLoader};
use propex_core::EventDispatcher;
use propex_core::auth::ResetTokenStore;
use propex_server::{routes, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "propex-server")]
#[command(about = "Propex listing service")]
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

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("database ready");

    let reset_tokens = ResetTokenStore::connect(
        &config.redis.url,
        config.auth.reset_token_ttl_secs,
    )
    .await
    .context("failed to connect to redis")?;

    let dispatcher = EventDispatcher::connect(&config.amqp)
        .await
        .context("failed to connect to the message broker")?;

    let state = AppState::new(pool, dispatcher, reset_tokens, config.auth.clone());
    let app = routes::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listing service listening");

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
