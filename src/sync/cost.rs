//! Cost resolution for synced products
//!
//! Upstream cost data is frequently incomplete; the resolver trades cost
//! accuracy for availability so a synced product never ends up without a
//! positive cost price.

use rust_decimal::Decimal;

use crate::shopify::types::{InventoryItem, Variant};

/// Which step of the fallback chain produced the resolved cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostSource {
    InventoryCost,
    InventoryUnitCost,
    VariantPrice,
}

impl CostSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CostSource::InventoryCost => "inventory_cost",
            CostSource::InventoryUnitCost => "inventory_unit_cost",
            CostSource::VariantPrice => "variant_price",
        }
    }
}

/// Resolve the authoritative unit cost for a variant.
///
/// Priority: inventory item cost, then inventory item unit cost, then the
/// variant's sale price. If the chosen value is not positive, the variant
/// price is applied unconditionally. A `VariantPrice` result is an
/// availability fallback, not a true cost; callers log the source.
pub fn resolve_cost(variant: &Variant, inventory: Option<&InventoryItem>) -> (Decimal, CostSource) {
    let price = variant.price.unwrap_or_default();

    let (value, source) = match inventory {
        Some(item) => {
            if let Some(cost) = item.cost {
                (cost, CostSource::InventoryCost)
            } else if let Some(unit_cost) = item.unit_cost {
                (unit_cost, CostSource::InventoryUnitCost)
            } else {
                (price, CostSource::VariantPrice)
            }
        }
        None => (price, CostSource::VariantPrice),
    };

    if value > Decimal::ZERO {
        (value, source)
    } else {
        (price, CostSource::VariantPrice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(price: &str) -> Variant {
        Variant {
            id: 1,
            price: Some(price.parse().unwrap()),
            compare_at_price: None,
            inventory_item_id: Some(10),
        }
    }

    fn item(cost: Option<&str>, unit_cost: Option<&str>) -> InventoryItem {
        InventoryItem {
            id: 10,
            cost: cost.map(|c| c.parse().unwrap()),
            unit_cost: unit_cost.map(|c| c.parse().unwrap()),
        }
    }

    #[test]
    fn inventory_cost_wins() {
        let (cost, source) = resolve_cost(
            &variant("9.99"),
            Some(&item(Some("4.00"), Some("5.00"))),
        );
        assert_eq!(cost, "4.00".parse().unwrap());
        assert_eq!(source, CostSource::InventoryCost);
    }

    #[test]
    fn unit_cost_when_cost_absent() {
        let (cost, source) = resolve_cost(&variant("9.99"), Some(&item(None, Some("5.00"))));
        assert_eq!(cost, "5.00".parse().unwrap());
        assert_eq!(source, CostSource::InventoryUnitCost);
    }

    #[test]
    fn price_when_both_absent() {
        let (cost, source) = resolve_cost(&variant("9.99"), Some(&item(None, None)));
        assert_eq!(cost, "9.99".parse().unwrap());
        assert_eq!(source, CostSource::VariantPrice);
    }

    #[test]
    fn price_when_no_inventory_item() {
        let (cost, source) = resolve_cost(&variant("9.99"), None);
        assert_eq!(cost, "9.99".parse().unwrap());
        assert_eq!(source, CostSource::VariantPrice);
    }

    #[test]
    fn zero_cost_falls_through_to_price() {
        // A zero cost is chosen by step one, then rejected by the positivity
        // check; the fallback skips the unit cost on purpose.
        let (cost, source) = resolve_cost(
            &variant("9.99"),
            Some(&item(Some("0.00"), Some("5.00"))),
        );
        assert_eq!(cost, "9.99".parse().unwrap());
        assert_eq!(source, CostSource::VariantPrice);
    }

    #[test]
    fn nan_cost_parses_as_absent_and_falls_through() {
        let item: InventoryItem =
            serde_json::from_value(serde_json::json!({ "id": 10, "cost": "NaN" })).unwrap();
        let (cost, source) = resolve_cost(&variant("9.99"), Some(&item));
        assert_eq!(cost, "9.99".parse().unwrap());
        assert_eq!(source, CostSource::VariantPrice);
    }

    #[test]
    fn negative_cost_falls_through_to_price() {
        let (cost, source) = resolve_cost(&variant("9.99"), Some(&item(Some("-1.00"), None)));
        assert_eq!(cost, "9.99".parse().unwrap());
        assert_eq!(source, CostSource::VariantPrice);
    }
}
