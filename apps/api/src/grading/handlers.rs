//! Axum route handlers for submissions and reviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cases::store::get_case;
use crate::errors::AppError;
use crate::grading::pipeline::{grade_submission, Review};
use crate::grading::store::{get_submission, insert_review, insert_submission, latest_review};
use crate::llm_client::BackendKind;
use crate::models::case::CaseRow;
use crate::models::submission::SubmissionRow;
use crate::state::AppState;

/// Shortest summary worth grading, in characters after trimming.
pub const MIN_SUBMISSION_CHARS: usize = 60;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RegradeParams {
    /// Grade with this backend instead of the one configured at startup.
    pub backend: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GradedSubmissionResponse {
    pub submission: SubmissionRow,
    pub review_id: Uuid,
    pub review: Review,
}

#[derive(Debug, Serialize)]
pub struct ReviewDetailResponse {
    pub case: CaseRow,
    pub submission: SubmissionRow,
    pub review_id: Uuid,
    pub review: Review,
}

/// POST /api/v1/cases/:id/submissions
///
/// Stores the submission, grades it, stores the review. The submission is kept
/// even when grading fails, so it can be regraded later.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<GradedSubmissionResponse>), AppError> {
    let text = validate_submission_text(&request.text)?;
    let author = request
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());

    let case = get_case(&state.db, &case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Case {case_id} not found")))?;

    let submission = insert_submission(&state.db, &case.id, author, text).await?;
    info!("Stored submission {} for case {}", submission.id, case.id);

    let review = state.grader.grade(&case.context(), &submission.text).await?;
    let review_id = insert_review(&state.db, submission.id, &review).await?;

    Ok((
        StatusCode::CREATED,
        Json(GradedSubmissionResponse {
            submission,
            review_id,
            review,
        }),
    ))
}

/// POST /api/v1/submissions/:id/regrade
///
/// Grades a stored submission again and appends a new review.
/// `?backend=<selector>` overrides the startup backend for this one grading.
pub async fn handle_regrade(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
    Query(params): Query<RegradeParams>,
) -> Result<(StatusCode, Json<GradedSubmissionResponse>), AppError> {
    let selector = validate_selector(params.backend.as_deref())?;

    let submission = get_submission(&state.db, submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {submission_id} not found")))?;
    let case = get_case(&state.db, &submission.case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Case {} not found", submission.case_id)))?;

    let review = match selector {
        Some(selector) => {
            grade_submission(&state.llm, &case.context(), &submission.text, selector).await?
        }
        None => state.grader.grade(&case.context(), &submission.text).await?,
    };
    let review_id = insert_review(&state.db, submission.id, &review).await?;
    info!("Regraded submission {} (review {})", submission.id, review_id);

    Ok((
        StatusCode::CREATED,
        Json(GradedSubmissionResponse {
            submission,
            review_id,
            review,
        }),
    ))
}

/// GET /api/v1/submissions/:id/review
///
/// Returns the case, the submission and its most recent review.
pub async fn handle_get_review(
    State(state): State<AppState>,
    Path(submission_id): Path<Uuid>,
) -> Result<Json<ReviewDetailResponse>, AppError> {
    let submission = get_submission(&state.db, submission_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Submission {submission_id} not found")))?;
    let row = latest_review(&state.db, submission.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No review for submission {submission_id}")))?;
    let case = get_case(&state.db, &submission.case_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Case {} not found", submission.case_id)))?;

    Ok(Json(ReviewDetailResponse {
        case,
        submission,
        review_id: row.id,
        review: Review::from(row),
    }))
}

fn validate_submission_text(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.chars().count() < MIN_SUBMISSION_CHARS {
        return Err(AppError::Validation(
            "Please write at least ~120 words for a meaningful review.".to_string(),
        ));
    }
    Ok(text)
}

/// Rejects an unrecognized backend name as a client error. Blank means "use the default".
fn validate_selector(selector: Option<&str>) -> Result<Option<&str>, AppError> {
    match selector.map(str::trim).filter(|s| !s.is_empty()) {
        Some(selector) => {
            selector
                .parse::<BackendKind>()
                .map_err(|e| AppError::Validation(e.to_string()))?;
            Ok(Some(selector))
        }
        None => Ok(None),
    }
}
