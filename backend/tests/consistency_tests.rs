//! Consistency audit and reconciliation tests
//!
//! Tests for the manual-stock invariant and the sync behavior:
//! - Violation detection (variant-bearing products with manual stock != 0)
//! - The compensating adjustment written by a sync
//! - Idempotence of a second sync run
//! - Continuation past per-item failures with an early-stop safety valve

use proptest::prelude::*;

use shared::models::{
    apply_movement_rule, canonical_total, manual_stock_violation, MovementType, OverdrawPolicy,
};

/// In-memory catalog entry for sync simulations
#[derive(Debug, Clone)]
struct SimProduct {
    manual_stock: i32,
    variant_stocks: Vec<i32>,
}

impl SimProduct {
    fn variant_count(&self) -> i64 {
        self.variant_stocks.len() as i64
    }

    fn variant_sum(&self) -> i64 {
        self.variant_stocks.iter().map(|&s| s as i64).sum()
    }

    fn total(&self) -> i64 {
        canonical_total(self.manual_stock, self.variant_count(), self.variant_sum())
    }
}

/// Simulate one sync pass over the catalog, returning (updated, skipped)
/// counts and the recorded adjustment magnitudes, mirroring how the
/// reconciler drives the shared quantity rule.
fn simulate_sync(products: &mut [SimProduct]) -> (usize, usize, Vec<i32>) {
    let mut updated = 0;
    let mut skipped = 0;
    let mut adjustments = Vec::new();

    for product in products.iter_mut() {
        if !manual_stock_violation(product.manual_stock, product.variant_count()) {
            skipped += 1;
            continue;
        }

        let change = apply_movement_rule(
            product.manual_stock,
            MovementType::Adjustment,
            0,
            OverdrawPolicy::Clamp,
        )
        .unwrap();

        product.manual_stock = change.new_value;
        adjustments.push(change.recorded_quantity);
        updated += 1;
    }

    (updated, skipped, adjustments)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// The invariant only applies to variant-bearing products
    #[test]
    fn test_violation_detection() {
        assert!(manual_stock_violation(10, 2));
        assert!(manual_stock_violation(-1, 1));
        assert!(!manual_stock_violation(0, 2));
        assert!(!manual_stock_violation(10, 0));
        assert!(!manual_stock_violation(0, 0));
    }

    /// Syncing an inconsistent product zeroes manual stock and records the
    /// old quantity as the adjustment magnitude
    #[test]
    fn test_sync_writes_compensating_adjustment() {
        let mut products = vec![SimProduct {
            manual_stock: 10,
            variant_stocks: vec![3, 7],
        }];

        let (updated, skipped, adjustments) = simulate_sync(&mut products);

        assert_eq!(updated, 1);
        assert_eq!(skipped, 0);
        assert_eq!(adjustments, vec![10]);
        assert_eq!(products[0].manual_stock, 0);
        // the canonical total still comes from the variants
        assert_eq!(products[0].total(), 10);
    }

    /// Products without variants are never touched
    #[test]
    fn test_sync_leaves_simple_products_alone() {
        let mut products = vec![SimProduct {
            manual_stock: 42,
            variant_stocks: vec![],
        }];

        let (updated, skipped, _) = simulate_sync(&mut products);

        assert_eq!(updated, 0);
        assert_eq!(skipped, 1);
        assert_eq!(products[0].manual_stock, 42);
    }

    /// A second run with no intervening mutation is a no-op
    #[test]
    fn test_sync_idempotence() {
        let mut products = vec![
            SimProduct {
                manual_stock: 10,
                variant_stocks: vec![3, 7],
            },
            SimProduct {
                manual_stock: 5,
                variant_stocks: vec![],
            },
            SimProduct {
                manual_stock: 0,
                variant_stocks: vec![1],
            },
        ];

        let (first_updated, _, _) = simulate_sync(&mut products);
        assert_eq!(first_updated, 1);

        let needs_sync = products
            .iter()
            .filter(|p| manual_stock_violation(p.manual_stock, p.variant_count()))
            .count();
        assert_eq!(needs_sync, 0);

        let (second_updated, second_skipped, _) = simulate_sync(&mut products);
        assert_eq!(second_updated, 0);
        assert_eq!(second_skipped, 3);
    }

    /// One failing product does not stop the rest of the run
    #[test]
    fn test_run_continues_past_item_failure() {
        let outcomes = [Ok(()), Err("deadlock detected"), Ok(()), Ok(())];

        let mut errors = 0;
        let mut processed = 0;
        for outcome in outcomes {
            match outcome {
                Ok(()) => processed += 1,
                Err(_) => errors += 1,
            }
        }

        assert_eq!(processed, 3);
        assert_eq!(errors, 1);
    }

    /// Repeated consecutive failures stop the run early; a success in
    /// between resets the counter
    #[test]
    fn test_consecutive_error_cutoff() {
        let max_consecutive = 3;

        let run = |outcomes: &[Result<(), &str>]| -> (usize, bool) {
            let mut consecutive = 0;
            let mut examined = 0;
            for outcome in outcomes {
                examined += 1;
                match outcome {
                    Ok(()) => consecutive = 0,
                    Err(_) => {
                        consecutive += 1;
                        if consecutive >= max_consecutive {
                            return (examined, true);
                        }
                    }
                }
            }
            (examined, false)
        };

        let (examined, stopped) = run(&[Err("x"), Err("x"), Err("x"), Ok(()), Ok(())]);
        assert!(stopped);
        assert_eq!(examined, 3);

        let (examined, stopped) = run(&[Err("x"), Err("x"), Ok(()), Err("x"), Err("x")]);
        assert!(!stopped);
        assert_eq!(examined, 5);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn product_strategy() -> impl Strategy<Value = SimProduct> {
        (
            0i32..=1_000,
            prop::collection::vec(0i32..=1_000, 0..5),
        )
            .prop_map(|(manual_stock, variant_stocks)| SimProduct {
                manual_stock,
                variant_stocks,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// After one sync pass no product violates the invariant, and the
        /// canonical total of every variant-bearing product is unchanged
        #[test]
        fn prop_sync_restores_invariant(
            mut products in prop::collection::vec(product_strategy(), 1..20)
        ) {
            let totals_before: Vec<i64> = products
                .iter()
                .map(|p| if p.variant_count() > 0 { p.total() } else { 0 })
                .collect();

            simulate_sync(&mut products);

            for (product, total_before) in products.iter().zip(totals_before) {
                prop_assert!(!manual_stock_violation(
                    product.manual_stock,
                    product.variant_count()
                ));
                if product.variant_count() > 0 {
                    prop_assert_eq!(product.manual_stock, 0);
                    prop_assert_eq!(product.total(), total_before);
                }
            }
        }

        /// The second pass never updates anything
        #[test]
        fn prop_sync_idempotent(
            mut products in prop::collection::vec(product_strategy(), 1..20)
        ) {
            simulate_sync(&mut products);
            let (updated, _, adjustments) = simulate_sync(&mut products);

            prop_assert_eq!(updated, 0);
            prop_assert!(adjustments.is_empty());
        }

        /// Every recorded adjustment magnitude equals the manual stock it
        /// compensated for
        #[test]
        fn prop_adjustment_magnitudes_match(
            products in prop::collection::vec(product_strategy(), 1..20)
        ) {
            let expected: Vec<i32> = products
                .iter()
                .filter(|p| manual_stock_violation(p.manual_stock, p.variant_count()))
                .map(|p| p.manual_stock)
                .collect();

            let mut products = products;
            let (_, _, adjustments) = simulate_sync(&mut products);

            prop_assert_eq!(adjustments, expected);
        }
    }
}
