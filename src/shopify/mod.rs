//! Upstream commerce platform integration (Admin REST API, no SDK)

pub mod signature;
pub mod types;

use crate::error::SyncError;
use types::{InventoryItem, Product};

const API_VERSION: &str = "2024-07";

/// Thin typed client over the Admin REST API.
///
/// Only the two reads the sync engine needs: product by id and inventory item
/// by id. Callers run sequentially; the client makes no concurrency promises.
#[derive(Clone)]
pub struct ShopifyClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

#[derive(serde::Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(serde::Deserialize)]
struct InventoryItemEnvelope {
    inventory_item: InventoryItem,
}

impl ShopifyClient {
    pub fn new(shop_domain: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("https://{shop_domain}/admin/api/{API_VERSION}"),
            access_token: access_token.to_string(),
        }
    }

    /// Point the client at an arbitrary base URL (mock servers in tests).
    #[cfg(test)]
    pub fn with_base_url(base_url: &str, access_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    pub async fn get_product(&self, external_product_id: i64) -> Result<Product, SyncError> {
        let envelope: ProductEnvelope = self
            .get_json(&format!("products/{external_product_id}.json"))
            .await?;
        Ok(envelope.product)
    }

    pub async fn get_inventory_item(
        &self,
        inventory_item_id: i64,
    ) -> Result<InventoryItem, SyncError> {
        let envelope: InventoryItemEnvelope = self
            .get_json(&format!("inventory_items/{inventory_item_id}.json"))
            .await?;
        Ok(envelope.inventory_item)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = format!("{}/{path}", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(SyncError::Upstream(format!(
                "GET {path} returned {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }
}
