//! product_mappings — the binding between internal and upstream identities

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::SyncError;

/// One row per internal product; unique on the upstream product id.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(dead_code)]
pub struct ProductMapping {
    pub product_id: i64,
    pub external_product_id: i64,
    pub external_variant_id: Option<i64>,
    pub external_inventory_item_id: Option<i64>,
    pub last_synced_at: i64,
    pub last_synced_cost: Option<Decimal>,
}

/// Every known mapping, in stable order; the full sweep iterates this.
pub async fn list_all(pool: &PgPool) -> Result<Vec<ProductMapping>, SyncError> {
    Ok(sqlx::query_as(
        r#"
        SELECT product_id, external_product_id, external_variant_id,
               external_inventory_item_id, last_synced_at, last_synced_cost
        FROM product_mappings
        ORDER BY product_id
        "#,
    )
    .fetch_all(pool)
    .await?)
}
