//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are fixed-point decimals end to end; results are rounded to
//! 2 decimal places, half away from zero.

use super::error::OrderError;
use rust_decimal::prelude::*;
use shared::models::LineItem;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per item
const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
/// Maximum allowed quantity per item
const MAX_QUANTITY: i32 = 9999;

/// Round to 2 decimal places
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Equal within [`MONEY_TOLERANCE`]
#[inline]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= MONEY_TOLERANCE
}

/// Validate a line item before it becomes part of an order
pub fn validate_line_item(item: &LineItem) -> Result<(), OrderError> {
    if item.item_id.trim().is_empty() {
        return Err(OrderError::InvalidLineItem("item id is required".to_string()));
    }
    if item.name.trim().is_empty() {
        return Err(OrderError::InvalidLineItem(format!(
            "item {} has no name",
            item.item_id
        )));
    }

    // Price must be non-negative and within bounds
    if item.unit_price < Decimal::ZERO {
        return Err(OrderError::InvalidLineItem(format!(
            "price must be non-negative, got {}",
            item.unit_price
        )));
    }
    if item.unit_price > MAX_PRICE {
        return Err(OrderError::InvalidLineItem(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, item.unit_price
        )));
    }
    // 价格最多两位小数，否则逐行取整与整单取整结果不一致
    if item.unit_price.normalize().scale() > DECIMAL_PLACES {
        return Err(OrderError::InvalidLineItem(format!(
            "price must have at most {} decimal places, got {}",
            DECIMAL_PLACES, item.unit_price
        )));
    }

    // Quantity must be positive and within bounds
    if item.quantity < 1 {
        return Err(OrderError::InvalidLineItem(format!(
            "quantity must be at least 1, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(OrderError::InvalidLineItem(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }

    Ok(())
}

/// unit_price × quantity, rounded
#[inline]
pub fn line_total(item: &LineItem) -> Decimal {
    round_money(item.unit_price * Decimal::from(item.quantity))
}

/// Σ unit_price × quantity, rounded once
pub fn order_total(items: &[LineItem]) -> Decimal {
    round_money(
        items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum(),
    )
}

/// change = cash_given − due, rejecting short cash
pub fn compute_change(cash_given: Decimal, due: Decimal) -> Result<Decimal, OrderError> {
    if cash_given < due {
        return Err(OrderError::InsufficientCash { cash_given, due });
    }
    Ok(round_money(cash_given - due))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: Decimal, quantity: i32) -> LineItem {
        LineItem {
            item_id: "m-1".to_string(),
            name: "Adobo".to_string(),
            unit_price: price,
            quantity,
            notes: None,
            category: None,
        }
    }

    #[test]
    fn test_order_total_scenario() {
        let items = vec![
            item(Decimal::new(12050, 2), 2),
            item(Decimal::new(4500, 2), 1),
        ];
        assert_eq!(order_total(&items), Decimal::new(28600, 2));
    }

    #[test]
    fn test_order_total_no_float_drift() {
        // 0.1 × 3 在 f64 下是 0.30000000000000004
        let items = vec![item(Decimal::new(1, 1), 3)];
        assert_eq!(order_total(&items), Decimal::new(30, 2));
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_compute_change() {
        let due = Decimal::new(28600, 2);
        assert_eq!(compute_change(Decimal::from(300), due).unwrap(), Decimal::new(1400, 2));
        assert_eq!(compute_change(due, due).unwrap(), Decimal::ZERO);
        assert!(matches!(
            compute_change(Decimal::from(280), due),
            Err(OrderError::InsufficientCash { .. })
        ));
    }

    #[test]
    fn test_validate_line_item() {
        assert!(validate_line_item(&item(Decimal::ZERO, 1)).is_ok());
        assert!(validate_line_item(&item(Decimal::new(-1, 2), 1)).is_err());
        assert!(validate_line_item(&item(Decimal::ONE, 0)).is_err());
        assert!(validate_line_item(&item(Decimal::ONE, -2)).is_err());
        assert!(validate_line_item(&item(Decimal::ONE, 10_000)).is_err());
        assert!(validate_line_item(&item(Decimal::from(2_000_000), 1)).is_err());

        let mut unnamed = item(Decimal::ONE, 1);
        unnamed.name = "  ".to_string();
        assert!(validate_line_item(&unnamed).is_err());
    }

    #[test]
    fn test_sub_cent_prices_rejected() {
        assert!(matches!(
            validate_line_item(&item(Decimal::new(5, 3), 1)),
            Err(OrderError::InvalidLineItem(_))
        ));
        assert!(validate_line_item(&item(Decimal::new(12345, 4), 1)).is_err());
        // 尾随零不算多余精度
        assert!(validate_line_item(&item(Decimal::new(1100, 3), 1)).is_ok());
        assert!(validate_line_item(&item(Decimal::new(1205, 2), 1)).is_ok());
    }

    #[test]
    fn test_order_total_rounds_once() {
        // 3 × 0.005 = 0.015 → 0.02；逐行取整会得到 0.03
        let items = vec![
            item(Decimal::new(5, 3), 1),
            item(Decimal::new(5, 3), 1),
            item(Decimal::new(5, 3), 1),
        ];
        assert_eq!(order_total(&items), Decimal::new(2, 2));
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(1004, 3)), Decimal::new(100, 2));
        assert!(money_eq(Decimal::new(100, 2), Decimal::new(101, 2)));
        assert!(!money_eq(Decimal::new(100, 2), Decimal::new(102, 2)));
    }
}
