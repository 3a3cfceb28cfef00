//! Catalog product and variant models
//!
//! Product and variant rows are created and edited by the catalog screens;
//! every quantity change goes through the stock movement entry point.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub price: Decimal,
    /// Purchase cost; valuation falls back to `price` when absent
    pub cost: Option<Decimal>,
    /// Directly tracked quantity, authoritative only when the product has no variants
    pub manual_stock: i32,
    pub low_stock_threshold: i32,
    /// When false the product is excluded from stock alerting
    pub track_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A distinct sellable configuration of a product (e.g., size/color)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub sku: String,
    /// Price override; the product price applies when absent
    pub price: Option<Decimal>,
    pub stock: i32,
    pub options: VariantOptions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Typed attribute mapping for a variant (e.g., {"size": "M", "color": "navy"})
///
/// Validated at the write boundary, see [`crate::validation::validate_variant_options`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantOptions(pub BTreeMap<String, String>);

impl VariantOptions {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for VariantOptions {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}
