mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod profile;
mod rate_limit;
mod registry;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::scorer::LlmMatchScorer;
use crate::rate_limit::RateLimiter;
use crate::registry::snapshot::SnapshotStore;
use crate::registry::BizInfoClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing BIZINFO_API_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bizmatch API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client and the scorer on top of it
    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm.model(),
        config.llm_base_url
    );
    let scorer = Arc::new(LlmMatchScorer(llm));

    // Registry client and on-disk snapshot
    let registry = BizInfoClient::new(&config)?;
    let snapshots = SnapshotStore::load(&config.snapshot_path)?;

    // Session store (Redis, or in-memory when unavailable)
    let sessions = SessionStore::connect(config.redis_url.as_deref()).await;

    let rate_limiter = config.rate_limit_rps.and_then(RateLimiter::new);
    if let Some(rps) = config.rate_limit_rps {
        info!("Rate limiting /api at {rps} requests/s");
    }

    let state = AppState {
        config: config.clone(),
        scorer,
        registry,
        snapshots,
        sessions,
        rate_limiter,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
