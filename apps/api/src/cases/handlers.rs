use axum::{
    extract::{Path, State},
    Json,
};

use crate::cases::store::{get_case, list_cases};
use crate::errors::AppError;
use crate::models::case::{CaseRow, CaseSummaryRow};
use crate::state::AppState;

/// GET /api/v1/cases
pub async fn handle_list_cases(
    State(state): State<AppState>,
) -> Result<Json<Vec<CaseSummaryRow>>, AppError> {
    Ok(Json(list_cases(&state.db).await?))
}

/// GET /api/v1/cases/:id
pub async fn handle_get_case(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseRow>, AppError> {
    let case = get_case(&state.db, &case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Case {case_id} not found")))?;
    Ok(Json(case))
}
