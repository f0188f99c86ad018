use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::grading::pipeline::CaseContext;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaseRow {
    pub id: String,
    pub title: String,
    pub customer_desc: String,
    pub analysis_notes: Vec<String>,
}

impl CaseRow {
    /// The part of a case the grader sees.
    pub fn context(&self) -> CaseContext {
        CaseContext {
            description: self.customer_desc.clone(),
            notes: self.analysis_notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaseSummaryRow {
    pub id: String,
    pub title: String,
}
