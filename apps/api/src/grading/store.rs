//! Persistence for submissions and their reviews.
//!
//! Submissions are written once and never updated. Reviews are append-only;
//! the newest review for a submission is the current one.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::grading::pipeline::Review;
use crate::models::submission::{ReviewRow, SubmissionRow};

pub async fn insert_submission(
    pool: &PgPool,
    case_id: &str,
    author: Option<&str>,
    text: &str,
) -> Result<SubmissionRow, sqlx::Error> {
    sqlx::query_as::<_, SubmissionRow>(
        r#"
        INSERT INTO submissions (id, case_id, author, text)
        VALUES ($1, $2, $3, $4)
        RETURNING id, case_id, author, text, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(case_id)
    .bind(author)
    .bind(text)
    .fetch_one(pool)
    .await
}

pub async fn get_submission(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Option<SubmissionRow>, sqlx::Error> {
    sqlx::query_as::<_, SubmissionRow>(
        "SELECT id, case_id, author, text, created_at FROM submissions WHERE id = $1",
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_review(
    pool: &PgPool,
    submission_id: Uuid,
    review: &Review,
) -> Result<Uuid, sqlx::Error> {
    let review_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO reviews
            (id, submission_id, model, backend, scores, total, feedback, degraded, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(review_id)
    .bind(submission_id)
    .bind(&review.model)
    .bind(&review.backend)
    .bind(Json(&review.scores))
    .bind(review.total as i32)
    .bind(Json(&review.feedback))
    .bind(review.degraded)
    .bind(review.created_at)
    .execute(pool)
    .await?;
    Ok(review_id)
}

pub async fn latest_review(
    pool: &PgPool,
    submission_id: Uuid,
) -> Result<Option<ReviewRow>, sqlx::Error> {
    sqlx::query_as::<_, ReviewRow>(
        r#"
        SELECT id, model, backend, scores, total, feedback, degraded, created_at
        FROM reviews
        WHERE submission_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await
}
