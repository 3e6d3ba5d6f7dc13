use axum::http::HeaderValue;
use axum::{
    routing::{any, get},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use solana_sdk::signature::Signer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod crypto;
mod error;
mod locations;
mod models;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;
use locations::LocationRegistry;
use services::{
    checkin::CheckInService, ledger::SolanaLedger, program::ScavengerHuntProgram,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scavenger_hunt_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Scavenger Hunt Backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!("Solana RPC: {}", config.solana_rpc_url);

    // Organizer key is loaded once and shared read-only by every request
    let organizer = Arc::new(crypto::keypair::keypair_from_json(&config.event_organizer)?);
    let program = ScavengerHuntProgram::new(config.program_pubkey()?);
    let game_id = config.game_pubkey()?;

    tracing::info!("Program: {}", program.program_id());
    tracing::info!("Game: {}", game_id);
    tracing::info!("Event organizer: {}", organizer.pubkey());

    let ledger = Arc::new(SolanaLedger::from_config(&config)?);
    let registry = Arc::new(LocationRegistry::builtin());
    if registry.is_empty() {
        anyhow::bail!("No hunt locations registered");
    }
    tracing::info!("Loaded {} locations", registry.len());

    let checkin = CheckInService::new(ledger, organizer, registry, program, game_id);
    let app_state = api::AppState {
        config: config.clone(),
        checkin: Arc::new(checkin),
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Transaction request (GET metadata, POST transaction)
        .route("/api/checkin", any(api::checkin::handle_checkin))
        .route("/api/checkin/status", get(api::checkin::reference_status))
        // Locations
        .route("/api/locations", get(api::locations::list_locations))
        .route(
            "/api/locations/{id}/payment-request",
            get(api::locations::payment_request),
        )
        // Players
        .route(
            "/api/players/{account}/progress",
            get(api::players::get_progress),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
