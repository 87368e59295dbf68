//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are
//! `ledger::LedgerError`.

use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use ledger::domain::repository::KeyValueStore;
use ledger::{
    BootstrapOutcome, CertificateLedger, Difficulty, InMemoryKvStore, KvChainStore, LedgerConfig,
    PgKvStore, ledger_router,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,ledger=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    tracing::info!(
        difficulty = config.difficulty.zeros(),
        max_mining_attempts = config.max_mining_attempts,
        mining_timeout_ms = config.mining_timeout_ms(),
        max_commit_retries = config.max_commit_retries,
        chain_key = %config.chain_key,
        "Ledger configuration loaded"
    );

    let ledger_routes = match env::var("LEDGER_STORE").as_deref() {
        Ok("memory") => {
            tracing::warn!("Using in-memory ledger store; certificates will not survive a restart");
            build_ledger_router(InMemoryKvStore::new(), config).await?
        }
        _ => {
            let database_url =
                env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            build_ledger_router(PgKvStore::new(pool), config).await?
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/ledger", ledger_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31114));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Bootstrap the chain behind `kv` and build its routes
async fn build_ledger_router<K>(kv: K, config: LedgerConfig) -> anyhow::Result<Router>
where
    K: KeyValueStore + Send + Sync + 'static,
{
    let store = Arc::new(KvChainStore::new(kv, config.chain_key.clone()));
    let ledger = Arc::new(CertificateLedger::new(store, Arc::new(config)));

    // Unlike a read error, an empty store is an expected first-run state
    match ledger.bootstrap().await? {
        BootstrapOutcome::Created(genesis) => {
            tracing::info!(hash = %genesis.hash, "Ledger bootstrapped");
        }
        BootstrapOutcome::AlreadyInitialized { length } => {
            tracing::info!(blocks = length, "Ledger loaded");
        }
    }

    Ok(ledger_router(ledger))
}

fn load_config() -> anyhow::Result<LedgerConfig> {
    let defaults = LedgerConfig::default();

    let difficulty = match env_parse::<u8>("LEDGER_DIFFICULTY")? {
        Some(zeros) => Difficulty::new(zeros).with_context(|| {
            format!(
                "LEDGER_DIFFICULTY must be between {} and {}",
                Difficulty::MIN,
                Difficulty::MAX
            )
        })?,
        None => defaults.difficulty,
    };

    Ok(LedgerConfig {
        difficulty,
        max_mining_attempts: env_parse("LEDGER_MAX_MINING_ATTEMPTS")?
            .unwrap_or(defaults.max_mining_attempts),
        mining_timeout: env_parse("LEDGER_MINING_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.mining_timeout),
        max_commit_retries: env_parse("LEDGER_MAX_COMMIT_RETRIES")?
            .unwrap_or(defaults.max_commit_retries),
        chain_key: env::var("LEDGER_CHAIN_KEY").unwrap_or(defaults.chain_key),
    })
}

fn env_parse<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is not a valid value: {raw}")),
        Err(_) => Ok(None),
    }
}
