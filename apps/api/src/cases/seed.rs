//! Loads reference cases from a JSON file and upserts them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

/// One case as it appears in the seed file. `_id` is accepted as an alias for `id`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCase {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub customer_desc: String,
    #[serde(default)]
    pub analysis_notes: Vec<String>,
}

pub fn load_cases(path: &Path) -> Result<Vec<SeedCase>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;
    let cases: Vec<SeedCase> = serde_json::from_str(&raw)
        .with_context(|| format!("Seed file '{}' is not a JSON array of cases", path.display()))?;

    if let Some(blank) = cases.iter().find(|c| c.id.trim().is_empty()) {
        anyhow::bail!("Seed case with title '{}' has an empty id", blank.title);
    }
    Ok(cases)
}

/// Inserts or replaces every case by id in a single transaction.
/// Returns the number of cases written.
pub async fn seed_cases(pool: &PgPool, cases: &[SeedCase]) -> Result<u64> {
    if cases.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut written = 0;
    for case in cases {
        let result = sqlx::query(
            r#"
            INSERT INTO cases (id, title, customer_desc, analysis_notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                customer_desc = EXCLUDED.customer_desc,
                analysis_notes = EXCLUDED.analysis_notes
            "#,
        )
        .bind(&case.id)
        .bind(&case.title)
        .bind(&case.customer_desc)
        .bind(&case.analysis_notes)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to upsert case '{}'", case.id))?;
        written += result.rows_affected();
    }
    tx.commit().await?;

    info!("Seeded {written} cases");
    Ok(written)
}

/// Loads `path` and seeds its cases.
pub async fn seed_from_file(pool: &PgPool, path: &Path) -> Result<u64> {
    let cases = load_cases(path)?;
    info!("Loaded {} cases from {}", cases.len(), path.display());
    seed_cases(pool, &cases).await
}
