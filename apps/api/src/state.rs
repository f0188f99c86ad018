use std::sync::Arc;

use sqlx::PgPool;

use crate::config::LlmConfig;
use crate::grading::pipeline::Grader;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Grader bound to the backend selected by `LLM_BACKEND`.
    pub grader: Grader,
    /// Backend settings for per-request selector overrides.
    pub llm: Arc<LlmConfig>,
}
