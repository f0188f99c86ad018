mod cases;
mod config;
mod db;
mod errors;
mod grading;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cases::seed::seed_from_file;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::grading::pipeline::Grader;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting handoff grading API v{}", env!("CARGO_PKG_VERSION"));

    // Select the grading backend before touching anything else, so a bad
    // LLM_BACKEND fails startup instead of every request
    let grader = Grader::from_config(&config.llm).context("Invalid LLM configuration")?;
    info!(
        "Grader initialized (backend: {}, model: {}, timeout: {}s)",
        grader.backend(),
        grader.model(),
        config.llm.timeout.as_secs()
    );

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    if let Some(path) = &config.seed_cases_path {
        seed_from_file(&db, path).await?;
    }

    let state = AppState {
        db,
        grader,
        llm: Arc::new(config.llm.clone()),
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
