//! Location agent HTTP Server
//!
//! Axum-based server exposing the location-aware agent over a REST chat
//! endpoint and a WebSocket streaming endpoint.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{Agent, InMemorySessionService, LlmProvider, Runner};
use agent_runtime::GeminiProvider;
use location_agent::root_agent;

use crate::handlers::{chat_handler, chat_stream_handler, health_check};
use crate::state::AppState;

const APP_NAME: &str = "location_aware_app";

fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Configuration errors stop the server before it binds
    let config = root_agent()?;
    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::from_env()?);
    let info = provider.info();

    if provider.health_check(&config.model).await.unwrap_or(false) {
        tracing::info!("✓ Connected to {} ({})", info.name, config.model);
    } else {
        tracing::warn!("⚠ {} not reachable at {} - chat requests will fail", info.name, info.endpoint);
        tracing::warn!("  Check GOOGLE_API_KEY or the Vertex AI settings in .env");
    }

    tracing::info!(
        "Agent '{}' with tools: {}",
        config.name,
        config.tools.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );

    let agent = Arc::new(Agent::new(provider, config)?);
    let runner = Runner::new(APP_NAME, agent, Arc::new(InMemorySessionService::new()));
    let app = router(AppState::new(runner));

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 location agent server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /api/chat        - Ask a location question");
    tracing::info!("  GET  /api/chat/stream - WebSocket streaming");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
