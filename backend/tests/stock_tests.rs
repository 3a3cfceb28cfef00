//! Stock aggregation tests
//!
//! Tests for the canonical stock figures:
//! - Total stock derivation (manual vs. variant sum)
//! - Stock valuation with cost fallback
//! - Status classification boundaries

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{
    classify_stock_status, summarize_stock, total_stock, unit_valuation, StockStatus,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Manual stock is authoritative when there are no variants
    #[test]
    fn test_total_stock_without_variants() {
        assert_eq!(total_stock(10, &[]), 10);
        assert_eq!(total_stock(0, &[]), 0);
    }

    /// Variant sum is authoritative when variants exist
    #[test]
    fn test_total_stock_with_variants() {
        // stored manual stock is ignored entirely
        assert_eq!(total_stock(10, &[3, 7]), 10);
        assert_eq!(total_stock(500, &[1, 2, 3]), 6);
        assert_eq!(total_stock(500, &[0, 0]), 0);
    }

    /// Valuation uses cost when present, price otherwise
    #[test]
    fn test_valuation_basis() {
        assert_eq!(unit_valuation(dec("250.00"), Some(dec("180.00"))), dec("180.00"));
        assert_eq!(unit_valuation(dec("250.00"), None), dec("250.00"));
    }

    /// Status boundaries: zero is out of stock, threshold is inclusive
    #[test]
    fn test_status_classification() {
        assert_eq!(classify_stock_status(0, 5), StockStatus::OutOfStock);
        assert_eq!(classify_stock_status(1, 5), StockStatus::LowStock);
        assert_eq!(classify_stock_status(5, 5), StockStatus::LowStock);
        assert_eq!(classify_stock_status(6, 5), StockStatus::InStock);
    }

    /// A zero threshold never reports low stock
    #[test]
    fn test_zero_threshold() {
        assert_eq!(classify_stock_status(0, 0), StockStatus::OutOfStock);
        assert_eq!(classify_stock_status(1, 0), StockStatus::InStock);
    }

    /// Full summary for a variant-bearing product
    #[test]
    fn test_summary_with_variants() {
        let summary = summarize_stock(10, &[3, 7], dec("250.00"), Some(dec("100.00")), 5);

        assert_eq!(summary.total_stock, 10);
        assert_eq!(summary.stock_value, dec("1000.00"));
        assert_eq!(summary.status, StockStatus::InStock);
        assert!(summary.has_variants);
    }

    /// Full summary for a simple product, valued at price
    #[test]
    fn test_summary_without_cost() {
        let summary = summarize_stock(15, &[], dec("100.00"), None, 5);

        assert_eq!(summary.total_stock, 15);
        assert_eq!(summary.stock_value, dec("1500.00"));
        assert_eq!(summary.status, StockStatus::InStock);
        assert!(!summary.has_variants);
    }

    /// Catalog totals for the dashboard: two products valued at 100 each
    #[test]
    fn test_catalog_totals() {
        let p1 = summarize_stock(15, &[], dec("100.00"), None, 5);
        let p2 = summarize_stock(0, &[4, 6], dec("100.00"), None, 5);

        let total: i64 = p1.total_stock + p2.total_stock;
        let value = p1.stock_value + p2.stock_value;

        assert_eq!(total, 25);
        assert_eq!(value, dec("2500.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn stock_strategy() -> impl Strategy<Value = i32> {
        0i32..=10_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Total equals manual stock for every zero-variant product
        #[test]
        fn prop_manual_stock_authoritative(manual in stock_strategy()) {
            prop_assert_eq!(total_stock(manual, &[]), manual as i64);
        }

        /// Total equals the variant sum whenever variants exist
        #[test]
        fn prop_variant_sum_authoritative(
            manual in stock_strategy(),
            variants in prop::collection::vec(stock_strategy(), 1..10)
        ) {
            let expected: i64 = variants.iter().map(|&s| s as i64).sum();
            prop_assert_eq!(total_stock(manual, &variants), expected);
        }

        /// Exactly one status applies to every total/threshold pair
        #[test]
        fn prop_status_partition(total in 0i64..100_000, threshold in 0i32..1_000) {
            let status = classify_stock_status(total, threshold);
            if total == 0 {
                prop_assert_eq!(status, StockStatus::OutOfStock);
            } else if total <= threshold as i64 {
                prop_assert_eq!(status, StockStatus::LowStock);
            } else {
                prop_assert_eq!(status, StockStatus::InStock);
            }
        }

        /// Stock value is total times the valuation basis
        #[test]
        fn prop_stock_value(
            manual in stock_strategy(),
            unit in 1i64..1_000_000,
        ) {
            let basis = Decimal::new(unit, 2);
            let summary = summarize_stock(manual, &[], basis, None, 10);
            prop_assert_eq!(summary.stock_value, Decimal::from(manual) * basis);
        }

        /// Cost always wins over price when both are present
        #[test]
        fn prop_cost_preferred(
            price in 1i64..1_000_000,
            cost in 1i64..1_000_000,
        ) {
            let price = Decimal::new(price, 2);
            let cost = Decimal::new(cost, 2);
            prop_assert_eq!(unit_valuation(price, Some(cost)), cost);
        }
    }
}
