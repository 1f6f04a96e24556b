//! Stock movement rules.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,
    #[error("Quantity cannot be negative")]
    NegativeQuantity,
    #[error("Insufficient stock: {available} available, {requested} requested")]
    Insufficient { available: i32, requested: i32 },
    #[error("Stock quantity out of range")]
    Overflow,
}

/// Kind of an inventory transaction, stored in `inventory_transactions.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Receive,
    Issue,
    Adjust,
    TransferIn,
    TransferOut,
    Sale,
    SaleCancel,
}

impl MovementKind {
    pub const ALL: [Self; 7] = [
        Self::Receive,
        Self::Issue,
        Self::Adjust,
        Self::TransferIn,
        Self::TransferOut,
        Self::Sale,
        Self::SaleCancel,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Receive => "receive",
            Self::Issue => "issue",
            Self::Adjust => "adjust",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Sale => "sale",
            Self::SaleCancel => "sale_cancel",
        }
    }

    /// Whether the movement takes stock out of a location.
    pub const fn is_outbound(self) -> bool {
        matches!(self, Self::Issue | Self::TransferOut | Self::Sale)
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown movement kind: '{s}'"))
    }
}

/// Signed delta for moving `quantity` units in the direction of `kind`.
///
/// `Adjust` has no direction of its own; use [`adjustment_delta`] instead.
pub fn signed_delta(kind: MovementKind, quantity: i32) -> Result<i32, StockError> {
    if quantity <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }

    Ok(if kind.is_outbound() { -quantity } else { quantity })
}

/// Apply `delta` to the quantity on hand, refusing to go below zero.
pub fn apply_delta(current: i32, delta: i32) -> Result<i32, StockError> {
    let next = current.checked_add(delta).ok_or(StockError::Overflow)?;

    if next < 0 {
        return Err(StockError::Insufficient {
            available: current,
            requested: -delta,
        });
    }

    Ok(next)
}

/// Delta that brings `current` to the absolute `target` quantity.
pub fn adjustment_delta(current: i32, target: i32) -> Result<i32, StockError> {
    if target < 0 {
        return Err(StockError::NegativeQuantity);
    }

    target.checked_sub(current).ok_or(StockError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(MovementKind::Receive, 5), Ok(5));
        assert_eq!(signed_delta(MovementKind::SaleCancel, 2), Ok(2));
        assert_eq!(signed_delta(MovementKind::Sale, 3), Ok(-3));
        assert_eq!(signed_delta(MovementKind::TransferOut, 1), Ok(-1));
        assert_eq!(
            signed_delta(MovementKind::Issue, 0),
            Err(StockError::NonPositiveQuantity)
        );
    }

    #[test]
    fn test_apply_delta_never_goes_negative() {
        assert_eq!(apply_delta(10, -4), Ok(6));
        assert_eq!(apply_delta(4, -4), Ok(0));
        assert_eq!(
            apply_delta(3, -4),
            Err(StockError::Insufficient {
                available: 3,
                requested: 4,
            })
        );
        assert_eq!(apply_delta(i32::MAX, 1), Err(StockError::Overflow));
    }

    #[test]
    fn test_adjustment_delta() {
        assert_eq!(adjustment_delta(10, 7), Ok(-3));
        assert_eq!(adjustment_delta(0, 12), Ok(12));
        assert_eq!(adjustment_delta(5, 5), Ok(0));
        assert_eq!(adjustment_delta(5, -1), Err(StockError::NegativeQuantity));
    }

    #[test]
    fn test_movement_kind_parsing() {
        for kind in MovementKind::ALL {
            assert_eq!(kind.as_str().parse::<MovementKind>(), Ok(kind));
        }
        assert!("teleport".parse::<MovementKind>().is_err());
    }
}
