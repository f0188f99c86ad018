use sqlx::PgPool;

use crate::models::case::{CaseRow, CaseSummaryRow};

pub async fn list_cases(pool: &PgPool) -> Result<Vec<CaseSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, CaseSummaryRow>("SELECT id, title FROM cases ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn get_case(pool: &PgPool, case_id: &str) -> Result<Option<CaseRow>, sqlx::Error> {
    sqlx::query_as::<_, CaseRow>(
        "SELECT id, title, customer_desc, analysis_notes FROM cases WHERE id = $1",
    )
    .bind(case_id)
    .fetch_optional(pool)
    .await
}
