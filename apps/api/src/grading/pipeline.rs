//! Grading pipeline — the only entry point the web layer calls.
//!
//! Flow: build_grading_prompt → TextGenerator::generate → extract_structured →
//!       aggregate + read_feedback → Review.
//!
//! Backend failures propagate unchanged. A successful call whose text cannot be
//! read still produces a Review, zero-scored and marked `degraded`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::grading::parser::extract_structured;
use crate::grading::prompts::build_grading_prompt;
use crate::grading::rubric::{aggregate, read_feedback, FeedbackItem, RubricScores};
use crate::llm_client::{Backend, BackendKind, LlmError, TextGenerator};

/// The case material a submission is graded against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseContext {
    pub description: String,
    pub notes: Vec<String>,
}

/// Result of one grading pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub scores: RubricScores,
    /// Always `scores.total()`.
    pub total: u32,
    pub feedback: Vec<FeedbackItem>,
    pub model: String,
    pub backend: String,
    /// True when the model output could not be fully read and defaults were applied.
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

/// Grades submissions with one backend, chosen at construction.
#[derive(Clone)]
pub struct Grader {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl Grader {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Builds the configured backend. Fails with `LlmError::Configuration` before any I/O.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let backend = Backend::from_config(config)?;
        Ok(Self::new(Arc::new(backend), config.timeout))
    }

    pub fn backend(&self) -> BackendKind {
        self.generator.backend()
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    pub async fn grade(&self, case: &CaseContext, submission: &str) -> Result<Review, LlmError> {
        info!(
            "Grading submission with {} ({}): {} chars",
            self.backend(),
            self.model(),
            submission.chars().count()
        );
        let prompt = build_grading_prompt(&case.description, &case.notes, submission);
        debug!("Grading prompt built: {} bytes", prompt.len());

        let raw = self.generator.generate(&prompt, self.timeout).await?;
        debug!("Backend returned {} bytes", raw.len());

        let parsed = extract_structured(&raw);
        if parsed.is_empty() {
            warn!(
                "No structured object in {} output ({} bytes); scoring as zero",
                self.backend(),
                raw.len()
            );
        }

        let rubric = aggregate(parsed.get("scores").unwrap_or(&Value::Null));
        if rubric.used_defaults() {
            warn!(
                "Rubric defaults applied for fields: {}",
                rubric.defaulted.join(", ")
            );
        }
        let feedback = read_feedback(parsed.get("feedback"));

        let review = Review {
            scores: rubric.scores,
            total: rubric.total,
            feedback,
            model: self.model().to_string(),
            backend: self.backend().to_string(),
            degraded: parsed.is_empty() || rubric.used_defaults(),
            created_at: Utc::now(),
        };

        info!(
            "Graded submission with {} ({}): total={}/40, feedback_items={}, degraded={}",
            review.backend,
            review.model,
            review.total,
            review.feedback.len(),
            review.degraded
        );

        Ok(review)
    }
}

/// One-shot grading with an explicit backend selector. Used by regrade overrides.
///
/// An unrecognized selector fails with `LlmError::Configuration` before any
/// request is made.
pub async fn grade_submission(
    config: &LlmConfig,
    case: &CaseContext,
    submission: &str,
    selector: &str,
) -> Result<Review, LlmError> {
    let backend = Backend::for_selector(selector, config)?;
    Grader::new(Arc::new(backend), config.timeout)
        .grade(case, submission)
        .await
}
