use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use analysis_cache_cell::AnalysisCache;
use analysis_cell::api::ExtractionEngine;
use shared_config::AppConfig;
use shared_database::Directory;
use voicemail_cell::InboxSession;

use crate::router::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting voicemail triage API server");

    // Load configuration
    let config = AppConfig::from_env();
    if !config.is_ai_configured() {
        warn!("GEMINI_API_KEY is empty; every analysis will fail until it is set");
    }

    let directory = Arc::new(Directory::from_config(&config).context("failed to load clinic directory")?);
    info!(
        "Directory loaded: {} voicemails, {} patients, {} open slots",
        directory.voicemails().len(),
        directory.patients().len(),
        directory.available_slots().len()
    );

    // Create shared state
    let engine = Arc::new(ExtractionEngine::from_config(&config));
    let cache = AnalysisCache::new(
        Arc::clone(&engine),
        Arc::clone(&directory),
        config.max_concurrent_extractions,
    );
    let state = AppState {
        engine,
        cache,
        directory,
        session: Arc::new(InboxSession::new()),
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
