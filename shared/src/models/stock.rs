//! Canonical stock aggregation
//!
//! Total stock, stock value, and status classification are always recomputed
//! from product and variant state, never cached into their own columns.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stock status classification for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "In Stock"),
            StockStatus::LowStock => write!(f, "Low Stock"),
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
        }
    }
}

/// Derived stock figures for a single product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockSummary {
    pub total_stock: i64,
    pub stock_value: Decimal,
    pub status: StockStatus,
    pub has_variants: bool,
}

/// Canonical total stock: the variant sum when variants exist, otherwise the
/// manually tracked quantity.
pub fn total_stock(manual_stock: i32, variant_stocks: &[i32]) -> i64 {
    canonical_total(
        manual_stock,
        variant_stocks.len() as i64,
        variant_stocks.iter().map(|&s| s as i64).sum(),
    )
}

/// Same rule applied to pre-aggregated figures (as returned by a grouped
/// catalog query)
pub fn canonical_total(manual_stock: i32, variant_count: i64, variant_stock_sum: i64) -> i64 {
    if variant_count > 0 {
        variant_stock_sum
    } else {
        manual_stock as i64
    }
}

/// Unit value used for stock valuation; cost when known, list price otherwise
pub fn unit_valuation(price: Decimal, cost: Option<Decimal>) -> Decimal {
    cost.unwrap_or(price)
}

/// Classify stock status. The threshold comparison is inclusive at the low
/// end and exclusive of zero.
pub fn classify_stock_status(total_stock: i64, low_stock_threshold: i32) -> StockStatus {
    if total_stock <= 0 {
        StockStatus::OutOfStock
    } else if total_stock <= low_stock_threshold as i64 {
        StockStatus::LowStock
    } else {
        StockStatus::InStock
    }
}

/// Compute the full derived stock summary for a product
pub fn summarize_stock(
    manual_stock: i32,
    variant_stocks: &[i32],
    price: Decimal,
    cost: Option<Decimal>,
    low_stock_threshold: i32,
) -> StockSummary {
    summarize_from_sums(
        manual_stock,
        variant_stocks.len() as i64,
        variant_stocks.iter().map(|&s| s as i64).sum(),
        price,
        cost,
        low_stock_threshold,
    )
}

/// [`summarize_stock`] over pre-aggregated variant figures
pub fn summarize_from_sums(
    manual_stock: i32,
    variant_count: i64,
    variant_stock_sum: i64,
    price: Decimal,
    cost: Option<Decimal>,
    low_stock_threshold: i32,
) -> StockSummary {
    let total = canonical_total(manual_stock, variant_count, variant_stock_sum);
    StockSummary {
        total_stock: total,
        stock_value: Decimal::from(total) * unit_valuation(price, cost),
        status: classify_stock_status(total, low_stock_threshold),
        has_variants: variant_count > 0,
    }
}

/// The consistency invariant: a variant-bearing product must keep its manual
/// stock at zero, the variants are the sole source of quantity.
pub fn manual_stock_violation(manual_stock: i32, variant_count: i64) -> bool {
    variant_count > 0 && manual_stock != 0
}
