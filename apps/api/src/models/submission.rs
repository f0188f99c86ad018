use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::grading::pipeline::Review;
use crate::grading::rubric::{FeedbackItem, RubricScores};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionRow {
    pub id: Uuid,
    pub case_id: String,
    pub author: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub model: String,
    pub backend: String,
    pub scores: Json<RubricScores>,
    pub total: i32,
    pub feedback: Json<Vec<FeedbackItem>>,
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    /// The total is recomputed from the stored scores rather than trusted from the row.
    fn from(row: ReviewRow) -> Self {
        let scores = row.scores.0;
        Review {
            total: scores.total(),
            scores,
            feedback: row.feedback.0,
            model: row.model,
            backend: row.backend,
            degraded: row.degraded,
            created_at: row.created_at,
        }
    }
}
