//! Catalog reconciliation — products, images and mappings as one unit of work
//!
//! Field mapping follows full-overwrite semantics: an absent upstream field
//! clears the internal one. Images are replaced wholesale in upstream order,
//! so image row ids do not survive an update.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::SyncError;
use crate::shopify::types::{InventoryItem, Product};
use crate::sync::cost::{self, CostSource};

/// Advisory lock class for per-product reconciliation.
const RECONCILE_LOCK_CLASS: i32 = 7_341;

/// Serialize writers for one upstream product. Transaction scoped, released
/// at commit or rollback. Advisory keys are 32-bit here; truncating the id
/// can only widen the serialized set, never miss a conflict on the same id.
async fn lock_external_product(
    tx: &mut sqlx::PgTransaction<'_>,
    external_product_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(RECONCILE_LOCK_CLASS)
        .bind(external_product_id as i32)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Result of reconciling one upstream product.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileOutcome {
    pub product_id: i64,
    pub created: bool,
    pub cost: Decimal,
    pub cost_source: CostSource,
}

/// Outcome of a delete; absent mappings make the delete an idempotent no-op.
#[derive(Debug, Clone, Copy)]
pub enum DeleteOutcome {
    Deleted { product_id: i64 },
    NotFound,
}

/// Insert or fully overwrite the product for an upstream payload, replace its
/// image set, and upsert the identity mapping. Runs as a single transaction;
/// any failure rolls the whole reconciliation back.
pub async fn upsert_product(
    pool: &PgPool,
    product: &Product,
    inventory: Option<&InventoryItem>,
    now: i64,
) -> Result<ReconcileOutcome, SyncError> {
    let variant = product.primary_variant().ok_or_else(|| {
        SyncError::InvalidPayload(format!("product {} has no variants", product.id))
    })?;

    let (cost_price, cost_source) = cost::resolve_cost(variant, inventory);
    tracing::debug!(
        external_product_id = product.id,
        cost = %cost_price,
        cost_source = cost_source.as_str(),
        "Resolved product cost"
    );

    let mut tx = pool.begin().await?;

    // Concurrent deliveries for the same product (first delivery plus a
    // redelivery, say) would otherwise both miss the mapping lookup and each
    // insert a product row.
    lock_external_product(&mut tx, product.id).await?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT product_id FROM product_mappings WHERE external_product_id = $1")
            .bind(product.id)
            .fetch_optional(&mut *tx)
            .await?;

    let description = product.body_html.clone().unwrap_or_default();
    let category = product.product_type.clone().unwrap_or_default();

    let (product_id, created) = match existing {
        Some((id,)) => {
            sqlx::query(
                r#"
                UPDATE products
                SET name = $1, description = $2, category = $3, cost_price = $4,
                    list_price = $5, primary_image_url = $6, is_new = $7,
                    status = $8, updated_at = $9
                WHERE id = $10
                "#,
            )
            .bind(&product.title)
            .bind(&description)
            .bind(&category)
            .bind(cost_price)
            .bind(variant.list_price())
            .bind(product.primary_image_url())
            .bind(product.is_new())
            .bind(product.internal_status())
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            (id, false)
        }
        None => {
            let (id,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO products (
                    name, description, category, cost_price, list_price,
                    primary_image_url, is_new, status, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING id
                "#,
            )
            .bind(&product.title)
            .bind(&description)
            .bind(&category)
            .bind(cost_price)
            .bind(variant.list_price())
            .bind(product.primary_image_url())
            .bind(product.is_new())
            .bind(product.internal_status())
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            (id, true)
        }
    };

    // Replace the image set in upstream order: position is the array index,
    // position 0 is the primary image.
    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    for (position, image) in product.images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_images (product_id, url, position, is_primary) VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(&image.src)
        .bind(position as i32)
        .bind(position == 0)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO product_mappings (
            product_id, external_product_id, external_variant_id,
            external_inventory_item_id, last_synced_at, last_synced_cost
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (external_product_id)
        DO UPDATE SET
            external_variant_id = EXCLUDED.external_variant_id,
            external_inventory_item_id = EXCLUDED.external_inventory_item_id,
            last_synced_at = EXCLUDED.last_synced_at,
            last_synced_cost = EXCLUDED.last_synced_cost
        "#,
    )
    .bind(product_id)
    .bind(product.id)
    .bind(variant.id)
    .bind(variant.inventory_item_id)
    .bind(now)
    .bind(cost_price)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(ReconcileOutcome {
        product_id,
        created,
        cost: cost_price,
        cost_source,
    })
}

/// Delete a product by its upstream id: images, product, mapping, in that
/// order. Children first and the mapping last, so a crash mid-delete never
/// leaves a mapping pointing at a missing product.
pub async fn delete_product(
    pool: &PgPool,
    external_product_id: i64,
) -> Result<DeleteOutcome, SyncError> {
    let mut tx = pool.begin().await?;

    lock_external_product(&mut tx, external_product_id).await?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT product_id FROM product_mappings WHERE external_product_id = $1")
            .bind(external_product_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((product_id,)) = existing else {
        return Ok(DeleteOutcome::NotFound);
    };

    sqlx::query("DELETE FROM product_images WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM product_mappings WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(DeleteOutcome::Deleted { product_id })
}

/// Cost-only write used by the full sweep; leaves every other field alone.
pub async fn update_cost(
    pool: &PgPool,
    product_id: i64,
    cost: Decimal,
    now: i64,
) -> Result<(), SyncError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE products SET cost_price = $1, updated_at = $2 WHERE id = $3")
        .bind(cost)
        .bind(now)
        .bind(product_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(
        "UPDATE product_mappings SET last_synced_at = $1, last_synced_cost = $2 WHERE product_id = $3",
    )
    .bind(now)
    .bind(cost)
    .bind(product_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
