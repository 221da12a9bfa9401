//! Full cost re-sync across every mapped product
//!
//! Sequential on purpose: the upstream API is rate limited and the client
//! makes no concurrency promises. A Postgres advisory lock held for the whole
//! run keeps two sweeps from overlapping, and a configured deadline bounds
//! total run time.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::Connection;

use crate::db::catalog;
use crate::db::mappings::{self, ProductMapping};
use crate::db::sync_runs::{self, ItemStatus};
use crate::error::SyncError;
use crate::shopify::types::Product;
use crate::state::AppState;
use crate::sync::cost;

/// Advisory lock key for the cost sweep; arbitrary but stable.
const COST_SYNC_LOCK_KEY: i64 = 811_420_223;

/// Per-run summary returned to the trigger caller.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunSummary {
    pub total_items: u32,
    pub succeeded_count: u32,
    pub failed_count: u32,
    pub skipped_count: u32,
}

/// Re-derive the cost price for every mapped product.
///
/// Per-item failures are logged, persisted as failed outcomes and never abort
/// the run. A second trigger while a run holds the lock gets
/// [`SyncError::SyncInProgress`].
pub async fn run_cost_sync(state: &AppState) -> Result<SyncRunSummary, SyncError> {
    // Advisory locks are session scoped. The connection is detached from the
    // pool: if this future is dropped mid-run the session closes and Postgres
    // releases the lock, instead of the pooled session keeping it held.
    let mut lock_conn = state.pool.acquire().await?.detach();
    let (locked,): (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
        .bind(COST_SYNC_LOCK_KEY)
        .fetch_one(&mut lock_conn)
        .await?;
    if !locked {
        let _ = lock_conn.close().await;
        return Err(SyncError::SyncInProgress);
    }

    let result = run_locked(state).await;

    if let Err(e) = sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(COST_SYNC_LOCK_KEY)
        .execute(&mut lock_conn)
        .await
    {
        tracing::warn!(error = %e, "Failed to release cost sync advisory lock");
    }
    let _ = lock_conn.close().await;

    result
}

async fn run_locked(state: &AppState) -> Result<SyncRunSummary, SyncError> {
    let started = Instant::now();
    let run_id = sync_runs::create(&state.pool, chrono::Utc::now().timestamp_millis()).await?;

    let all = mappings::list_all(&state.pool).await?;
    let mut summary = SyncRunSummary {
        total_items: u32::try_from(all.len()).unwrap_or(u32::MAX),
        ..Default::default()
    };

    tracing::info!(run_id, total = summary.total_items, "Starting full cost sync");

    for mapping in &all {
        if started.elapsed() >= state.sync_deadline {
            summary.skipped_count =
                summary.total_items - summary.succeeded_count - summary.failed_count;
            tracing::warn!(
                run_id,
                skipped = summary.skipped_count,
                "Cost sync deadline reached, abandoning remaining items"
            );
            break;
        }

        let (status, error, resolved_cost) = match sync_one(state, mapping).await {
            Ok(resolved) => {
                summary.succeeded_count += 1;
                (ItemStatus::Succeeded, None, Some(resolved))
            }
            Err(e) => {
                summary.failed_count += 1;
                tracing::warn!(
                    run_id,
                    external_product_id = mapping.external_product_id,
                    error = %e,
                    "Cost sync failed for product"
                );
                (ItemStatus::Failed, Some(e.to_string()), None)
            }
        };

        // Outcome rows are observability, not correctness; a write failure
        // must not abort the run either.
        if let Err(e) = sync_runs::record_item(
            &state.pool,
            run_id,
            mapping.external_product_id,
            status,
            error.as_deref(),
            resolved_cost,
        )
        .await
        {
            tracing::warn!(run_id, error = %e, "Failed to record sync outcome");
        }
    }

    // The run itself is done; finalizing the run row is observability and
    // must not turn a completed sweep into a caller-visible failure.
    if let Err(e) = sync_runs::finish(
        &state.pool,
        run_id,
        chrono::Utc::now().timestamp_millis(),
        summary.total_items,
        summary.succeeded_count,
        summary.failed_count,
        summary.skipped_count,
    )
    .await
    {
        tracing::warn!(run_id, error = %e, "Failed to finalize sync run row");
    }

    tracing::info!(
        run_id,
        succeeded = summary.succeeded_count,
        failed = summary.failed_count,
        skipped = summary.skipped_count,
        "Full cost sync finished"
    );

    Ok(summary)
}

/// Re-derive and write the cost for one mapped product. Cost-only by design;
/// the sweep never re-runs full reconciliation.
async fn sync_one(state: &AppState, mapping: &ProductMapping) -> Result<Decimal, SyncError> {
    let product: Product = state.shopify.get_product(mapping.external_product_id).await?;
    let variant = product.primary_variant().ok_or_else(|| {
        SyncError::InvalidPayload(format!("product {} has no variants", product.id))
    })?;

    // The mapping remembers the inventory item identity; fall back to the
    // freshly fetched variant for mappings created before it was recorded.
    let inventory_item_id = mapping
        .external_inventory_item_id
        .or(variant.inventory_item_id);
    let inventory = match inventory_item_id {
        Some(id) => Some(state.shopify.get_inventory_item(id).await?),
        None => None,
    };

    let (resolved, source) = cost::resolve_cost(variant, inventory.as_ref());
    tracing::debug!(
        external_product_id = mapping.external_product_id,
        cost = %resolved,
        cost_source = source.as_str(),
        "Resolved sweep cost"
    );

    catalog::update_cost(
        &state.pool,
        mapping.product_id,
        resolved,
        chrono::Utc::now().timestamp_millis(),
    )
    .await?;

    Ok(resolved)
}
