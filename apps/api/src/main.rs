mod config;
mod document;
mod errors;
mod flows;
mod llm_client;
mod routes;
mod schema;
mod state;
mod tools;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::flows::FlowExecutor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tools::linkedin_scraper::StubProfileScraper;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Creda API v{}", env!("CARGO_PKG_VERSION"));

    // A malformed schema is a build defect; refuse to serve with one.
    schema::registry::verify_all()?;
    info!("Schema registry verified ({} schemas)", schema::registry::ALL.len());

    // Initialize LLM client
    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (model: {}, timeout: {:?})",
        llm.model(),
        config.llm_timeout
    );

    // Scraper backend: stub until a real provider is wired in
    let scraper = Arc::new(StubProfileScraper);

    let flows = FlowExecutor::new(
        Arc::new(llm),
        scraper,
        config.min_job_description_chars,
    );

    let state = AppState {
        flows: Arc::new(flows),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
