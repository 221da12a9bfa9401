//! sync_runs / sync_run_items — persisted sweep observability

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Succeeded,
    Failed,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Succeeded => "succeeded",
            ItemStatus::Failed => "failed",
        }
    }
}

/// Open a new run row; counts are filled in by [`finish`].
pub async fn create(pool: &PgPool, started_at: i64) -> Result<i64, SyncError> {
    let (id,): (i64,) = sqlx::query_as("INSERT INTO sync_runs (started_at) VALUES ($1) RETURNING id")
        .bind(started_at)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

pub async fn finish(
    pool: &PgPool,
    run_id: i64,
    finished_at: i64,
    total_items: u32,
    succeeded_count: u32,
    failed_count: u32,
    skipped_count: u32,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        UPDATE sync_runs
        SET finished_at = $1, total_items = $2, succeeded_count = $3,
            failed_count = $4, skipped_count = $5
        WHERE id = $6
        "#,
    )
    .bind(finished_at)
    .bind(total_items as i32)
    .bind(succeeded_count as i32)
    .bind(failed_count as i32)
    .bind(skipped_count as i32)
    .bind(run_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Record one per-item outcome; failures carry the error text.
pub async fn record_item(
    pool: &PgPool,
    run_id: i64,
    external_product_id: i64,
    status: ItemStatus,
    error: Option<&str>,
    resolved_cost: Option<Decimal>,
) -> Result<(), SyncError> {
    sqlx::query(
        r#"
        INSERT INTO sync_run_items (run_id, external_product_id, status, error, resolved_cost)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(run_id)
    .bind(external_product_id)
    .bind(status.as_str())
    .bind(error)
    .bind(resolved_cost)
    .execute(pool)
    .await?;
    Ok(())
}
