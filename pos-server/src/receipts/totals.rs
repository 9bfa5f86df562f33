//! 含税价拆分
//!
//! 菜单价格含 VAT。`gross` 为订单总额，`r` 为税率 (如 0.12)：
//!
//! ```text
//! subtotal = round2(gross / (1 + r))
//! tax      = gross − subtotal
//! total    = subtotal + tax − discount
//! ```

use super::error::{ReceiptError, ReceiptResult};
use crate::orders::money::{money_eq, round_money};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

/// Split `gross` into subtotal and tax, apply the discount and reconcile
///
/// `expected` is the total the caller believes is due (payment amount or
/// terminal-computed receipt total); it defaults to `gross − discount`.
pub fn compute(
    gross: Decimal,
    tax_rate: Decimal,
    discount: Decimal,
    expected: Option<Decimal>,
) -> ReceiptResult<ReceiptTotals> {
    let discount = round_money(discount);
    if discount < Decimal::ZERO || discount > gross {
        return Err(ReceiptError::InvalidDiscount(format!(
            "discountAmount must be between 0 and {gross}, got {discount}"
        )));
    }

    let subtotal = round_money(gross / (Decimal::ONE + tax_rate));
    let tax_amount = gross - subtotal;
    let total_amount = subtotal + tax_amount - discount;

    let nominal_tax = round_money(subtotal * tax_rate);
    if !money_eq(tax_amount, nominal_tax) {
        return Err(ReceiptError::Reconciliation {
            expected: subtotal + nominal_tax - discount,
            computed: total_amount,
        });
    }

    let expected = expected.unwrap_or(gross - discount);
    if !money_eq(expected, total_amount) {
        return Err(ReceiptError::Reconciliation {
            expected,
            computed: total_amount,
        });
    }

    Ok(ReceiptTotals {
        subtotal,
        tax_amount,
        discount_amount: discount,
        total_amount,
    })
}
