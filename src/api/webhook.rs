//! Product webhook endpoint
//!
//! POST /webhooks/products — must receive the raw body (not JSON) because the
//! signature covers the exact request bytes. Verification and header checks
//! run before any business logic; failures answer 400 so the platform's
//! redelivery policy retries them. Unrecognized topics are acknowledged with
//! 200 so they are never retried.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::db::catalog::{self, DeleteOutcome};
use crate::error::SyncError;
use crate::shopify::signature;
use crate::shopify::types::{DeletePayload, Product};
use crate::state::AppState;

const HMAC_HEADER: &str = "x-shopify-hmac-sha256";
const TOPIC_HEADER: &str = "x-shopify-topic";

/// Webhook topics this engine reacts to. Anything else is acknowledged, not
/// rejected; the platform sends topics we do not care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    ProductsCreate,
    ProductsUpdate,
    ProductsDelete,
    Other(String),
}

impl Topic {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "products/create" => Topic::ProductsCreate,
            "products/update" => Topic::ProductsUpdate,
            "products/delete" => Topic::ProductsDelete,
            other => Topic::Other(other.to_string()),
        }
    }
}

/// Success response for the webhook caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    pub result: serde_json::Value,
}

pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, SyncError> {
    let topic_raw = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(SyncError::MissingHeader(TOPIC_HEADER))?;
    let sig_header = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok());
    if sig_header.is_none() {
        return Err(SyncError::MissingHeader(HMAC_HEADER));
    }

    if !signature::verify(&body, sig_header, &state.webhook_secret) {
        tracing::warn!(
            topic = topic_raw,
            body_len = body.len(),
            body_sample = %body_sample(&body),
            "Webhook signature verification failed"
        );
        return Err(SyncError::InvalidSignature);
    }
    tracing::debug!(
        topic = topic_raw,
        body_len = body.len(),
        "Webhook signature verified"
    );

    match Topic::parse(topic_raw) {
        Topic::ProductsCreate | Topic::ProductsUpdate => {
            let product: Product = serde_json::from_slice(&body)
                .map_err(|e| SyncError::InvalidPayload(e.to_string()))?;
            handle_product_upsert(&state, topic_raw, product).await
        }
        Topic::ProductsDelete => {
            let payload: DeletePayload = serde_json::from_slice(&body)
                .map_err(|e| SyncError::InvalidPayload(e.to_string()))?;
            handle_product_delete(&state, topic_raw, payload.id).await
        }
        Topic::Other(other) => {
            tracing::info!(topic = %other, "Unhandled webhook topic, acknowledging");
            Ok(Json(WebhookResponse {
                success: true,
                topic: other,
                product_id: None,
                result: serde_json::json!({ "status": "ignored" }),
            }))
        }
    }
}

/// products/create and products/update share the upsert path.
async fn handle_product_upsert(
    state: &AppState,
    topic: &str,
    product: Product,
) -> Result<Json<WebhookResponse>, SyncError> {
    // Webhook payloads carry prices but not cost; cost lives on the variant's
    // inventory item, which has to be fetched separately.
    let inventory = match product.primary_variant().and_then(|v| v.inventory_item_id) {
        Some(id) => Some(state.shopify.get_inventory_item(id).await?),
        None => None,
    };

    let now = chrono::Utc::now().timestamp_millis();
    let outcome = catalog::upsert_product(&state.pool, &product, inventory.as_ref(), now).await?;

    tracing::info!(
        topic,
        external_product_id = product.id,
        product_id = outcome.product_id,
        created = outcome.created,
        cost = %outcome.cost,
        cost_source = outcome.cost_source.as_str(),
        "Product reconciled"
    );

    Ok(Json(WebhookResponse {
        success: true,
        topic: topic.to_string(),
        product_id: Some(outcome.product_id),
        result: serde_json::json!({
            "status": if outcome.created { "created" } else { "updated" }
        }),
    }))
}

async fn handle_product_delete(
    state: &AppState,
    topic: &str,
    external_product_id: i64,
) -> Result<Json<WebhookResponse>, SyncError> {
    match catalog::delete_product(&state.pool, external_product_id).await? {
        DeleteOutcome::Deleted { product_id } => {
            tracing::info!(topic, external_product_id, product_id, "Product deleted");
            Ok(Json(WebhookResponse {
                success: true,
                topic: topic.to_string(),
                product_id: Some(product_id),
                result: serde_json::json!({ "status": "deleted" }),
            }))
        }
        DeleteOutcome::NotFound => {
            tracing::info!(
                topic,
                external_product_id,
                "Delete for unmapped product, nothing to do"
            );
            Ok(Json(WebhookResponse {
                success: true,
                topic: topic.to_string(),
                product_id: None,
                result: serde_json::json!({ "status": "not_found" }),
            }))
        }
    }
}

/// First bytes of the body for diagnosing secret misconfiguration; the secret
/// itself never appears in a request body.
fn body_sample(body: &[u8]) -> String {
    const MAX: usize = 120;
    String::from_utf8_lossy(&body[..body.len().min(MAX)]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_routing() {
        assert_eq!(Topic::parse("products/create"), Topic::ProductsCreate);
        assert_eq!(Topic::parse("products/update"), Topic::ProductsUpdate);
        assert_eq!(Topic::parse("products/delete"), Topic::ProductsDelete);
        assert_eq!(
            Topic::parse("orders/create"),
            Topic::Other("orders/create".to_string())
        );
    }

    #[test]
    fn response_uses_camel_case_product_id() {
        let response = WebhookResponse {
            success: true,
            topic: "products/update".into(),
            product_id: Some(42),
            result: serde_json::json!({ "status": "updated" }),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["productId"], 42);
        assert_eq!(json["result"]["status"], "updated");
    }

    #[test]
    fn response_omits_product_id_when_absent() {
        let response = WebhookResponse {
            success: true,
            topic: "orders/create".into(),
            product_id: None,
            result: serde_json::json!({ "status": "ignored" }),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("productId").is_none());
    }

    #[test]
    fn body_sample_truncates_and_survives_non_utf8() {
        let long = vec![b'a'; 500];
        assert_eq!(body_sample(&long).len(), 120);
        assert_eq!(body_sample(&[0xff, 0xfe, b'x']), "\u{fffd}\u{fffd}x");
    }
}
