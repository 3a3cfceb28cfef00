//! Stock movement models and the quantity-mutation rule
//!
//! A movement is one immutable, append-only record of a quantity change.
//! Current stock lives on the product/variant row; the movement log is the
//! causal audit trail, not the source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "adjustment" => Ok(MovementType::Adjustment),
            _ => Err("unknown movement type"),
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable stock movement record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Present when the movement targeted a variant instead of the product's manual stock
    pub variant_id: Option<Uuid>,
    pub movement_type: MovementType,
    /// Non-negative magnitude; for adjustments the distance between old and target
    pub quantity: i32,
    pub old_value: i32,
    pub new_value: i32,
    /// Human-readable note only; quantities live in `old_value`/`new_value`
    pub reason: Option<String>,
    /// Correlation id, e.g. an order id or a sync-run id
    pub reference: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Behavior when an OUT movement requests more than is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdrawPolicy {
    /// Clamp the stored quantity at zero; the log keeps the full requested magnitude
    #[default]
    Clamp,
    /// Refuse the movement with an insufficient-stock error
    Reject,
    /// Let the stored quantity go below zero (backorders)
    AllowNegative,
}

/// Outcome of applying the quantity-mutation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityChange {
    pub new_value: i32,
    /// Magnitude written to the movement log
    pub recorded_quantity: i32,
}

/// Rejection reasons for the quantity-mutation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MovementRuleError {
    #[error("movement quantity must be positive")]
    NonPositiveQuantity,
    #[error("adjustment target cannot be negative")]
    NegativeTarget,
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i32, requested: i32 },
}

/// The single quantity-mutation rule shared by the movement ledger and the
/// reconciler. `quantity` is the magnitude for IN/OUT and the absolute target
/// for ADJUSTMENT; the recorded magnitude for an adjustment is the distance
/// `|target - current|`.
pub fn apply_movement_rule(
    current: i32,
    movement_type: MovementType,
    quantity: i32,
    policy: OverdrawPolicy,
) -> Result<QuantityChange, MovementRuleError> {
    match movement_type {
        MovementType::In => {
            if quantity <= 0 {
                return Err(MovementRuleError::NonPositiveQuantity);
            }
            Ok(QuantityChange {
                new_value: current.saturating_add(quantity),
                recorded_quantity: quantity,
            })
        }
        MovementType::Out => {
            if quantity <= 0 {
                return Err(MovementRuleError::NonPositiveQuantity);
            }
            let new_value = match policy {
                OverdrawPolicy::Clamp => (current - quantity).max(0),
                OverdrawPolicy::Reject => {
                    if quantity > current {
                        return Err(MovementRuleError::InsufficientStock {
                            available: current,
                            requested: quantity,
                        });
                    }
                    current - quantity
                }
                OverdrawPolicy::AllowNegative => current.saturating_sub(quantity),
            };
            Ok(QuantityChange {
                new_value,
                recorded_quantity: quantity,
            })
        }
        MovementType::Adjustment => {
            if quantity < 0 {
                return Err(MovementRuleError::NegativeTarget);
            }
            let distance = (quantity as i64 - current as i64).abs().min(i32::MAX as i64);
            Ok(QuantityChange {
                new_value: quantity,
                recorded_quantity: distance as i32,
            })
        }
    }
}
