pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::cases::handlers as cases;
use crate::grading::handlers as grading;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/cases", get(cases::handle_list_cases))
        .route("/api/v1/cases/:id", get(cases::handle_get_case))
        .route(
            "/api/v1/cases/:id/submissions",
            post(grading::handle_submit),
        )
        .route(
            "/api/v1/submissions/:id/review",
            get(grading::handle_get_review),
        )
        .route(
            "/api/v1/submissions/:id/regrade",
            post(grading::handle_regrade),
        )
        .with_state(state)
}
