//! Wire types for the upstream Admin API and its product webhooks

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Product payload: the body of `products/create` / `products/update` webhooks
/// and of `GET /products/{id}.json` (unwrapped from its envelope).
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    /// Comma-separated tag list
    #[serde(default)]
    pub tags: Option<String>,
    /// "active" | "draft" | "archived"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// First variant; it carries the pricing identity used for sync.
    pub fn primary_variant(&self) -> Option<&Variant> {
        self.variants.first()
    }

    /// New-arrival flag, driven by a `new` tag upstream.
    pub fn is_new(&self) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.split(',').any(|t| t.trim().eq_ignore_ascii_case("new")))
    }

    /// Internal status: anything other than an active product is inactive.
    pub fn internal_status(&self) -> &'static str {
        if self.status.as_deref() == Some("active") {
            "active"
        } else {
            "inactive"
        }
    }

    pub fn primary_image_url(&self) -> &str {
        self.images.first().map(|i| i.src.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub id: i64,
    /// Sale price, sent as a decimal string.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub price: Option<Decimal>,
    /// Original price when the variant is on sale.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub compare_at_price: Option<Decimal>,
    #[serde(default)]
    pub inventory_item_id: Option<i64>,
}

impl Variant {
    /// List price shown downstream: compare-at price when set, else price.
    pub fn list_price(&self) -> Decimal {
        self.compare_at_price.or(self.price).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub src: String,
}

/// Inventory item fetched per variant; carries the upstream cost data.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItem {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unit_cost: Option<Decimal>,
}

/// `products/delete` webhooks carry only the external product id.
#[derive(Debug, Clone, Deserialize)]
pub struct DeletePayload {
    pub id: i64,
}

/// The platform sends decimals as strings, occasionally as numbers, and cost
/// fields are sometimes junk ("NaN", ""). Anything unparseable is treated as
/// absent instead of failing the whole payload.
fn lenient_decimal<'de, D>(de: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => s.trim().parse().ok(),
        serde_json::Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 632910392,
            "title": "IPod Nano - 8GB",
            "body_html": "<p>It's the small iPod with a big idea.</p>",
            "product_type": "Cult Products",
            "tags": "Emotive, Flash Memory, New, MP3",
            "status": "active",
            "variants": [
                {
                    "id": 808950810,
                    "price": "199.00",
                    "compare_at_price": "249.00",
                    "inventory_item_id": 457924702
                },
                { "id": 808950811, "price": "209.00" }
            ],
            "images": [
                { "src": "https://cdn.example.com/ipod-nano.png" },
                { "src": "https://cdn.example.com/ipod-nano-back.png" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn parses_webhook_payload() {
        let product = sample_product();
        assert_eq!(product.id, 632910392);
        let variant = product.primary_variant().unwrap();
        assert_eq!(variant.price, Some("199.00".parse().unwrap()));
        assert_eq!(variant.inventory_item_id, Some(457924702));
        assert_eq!(
            product.primary_image_url(),
            "https://cdn.example.com/ipod-nano.png"
        );
    }

    #[test]
    fn tag_match_is_trimmed_and_case_insensitive() {
        let product = sample_product();
        assert!(product.is_new());

        let mut product = sample_product();
        product.tags = Some("newish, vintage".into());
        assert!(!product.is_new());
        product.tags = None;
        assert!(!product.is_new());
    }

    #[test]
    fn non_active_statuses_map_to_inactive() {
        let mut product = sample_product();
        assert_eq!(product.internal_status(), "active");
        product.status = Some("draft".into());
        assert_eq!(product.internal_status(), "inactive");
        product.status = Some("archived".into());
        assert_eq!(product.internal_status(), "inactive");
        product.status = None;
        assert_eq!(product.internal_status(), "inactive");
    }

    #[test]
    fn list_price_prefers_compare_at() {
        let product = sample_product();
        let variant = product.primary_variant().unwrap();
        assert_eq!(variant.list_price(), "249.00".parse().unwrap());
        assert_eq!(product.variants[1].list_price(), "209.00".parse().unwrap());
    }

    #[test]
    fn lenient_decimal_tolerates_junk() {
        let item: InventoryItem = serde_json::from_value(serde_json::json!({
            "id": 457924702,
            "cost": "NaN",
            "unit_cost": 12.5
        }))
        .unwrap();
        assert_eq!(item.cost, None);
        assert_eq!(item.unit_cost, Some("12.5".parse().unwrap()));

        let item: InventoryItem =
            serde_json::from_value(serde_json::json!({ "id": 1, "cost": null })).unwrap();
        assert_eq!(item.cost, None);
        assert_eq!(item.unit_cost, None);
    }
}
