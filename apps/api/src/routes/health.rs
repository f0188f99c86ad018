use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version and the grading backend selected at startup.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "handoff-api",
        "grader": {
            "backend": state.grader.backend().as_str(),
            "model": state.grader.model(),
            "available": state.grader.backend().is_implemented(),
        }
    }))
}
