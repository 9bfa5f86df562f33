//! 订单状态机
//!
//! ```text
//! pending ──► in_progress ──► ready ──┬─► served      (堂食点单)
//!    │             │                  └─► completed   (顾客自助点单)
//!    └─────────────┴──────────────────────► cancelled
//! ```
//!
//! 支付状态独立：`unpaid → paid → refunded`。
//! served/completed 的选择由调用方决定，这里只检查可达性。

use super::error::{OrderError, OrderResult};
use super::money::{compute_change, money_eq, round_money};
use crate::store::CommandMetadata;
use rust_decimal::Decimal;
use shared::models::{Order, OrderStatus, PaymentMethod, PaymentStatus, StatusChange};

/// Legal next states
pub fn allowed_targets(from: OrderStatus) -> &'static [OrderStatus] {
    use OrderStatus::*;
    match from {
        Pending => &[InProgress, Cancelled],
        InProgress => &[Ready, Cancelled],
        Ready => &[Served, Completed],
        Served | Completed | Cancelled => &[],
    }
}

pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Move the order along the graph and record who did it
pub fn transition(order: &mut Order, to: OrderStatus, meta: &CommandMetadata) -> OrderResult<()> {
    let from = order.status;
    if !can_transition(from, to) {
        return Err(OrderError::InvalidTransition { from, to });
    }

    order.status = to;
    order.status_history.push(StatusChange {
        from,
        to,
        operator_id: meta.operator_id.clone(),
        operator_name: meta.operator_name.clone(),
        at: meta.timestamp,
    });
    order.touch(meta.timestamp);
    Ok(())
}

/// Payment input after parsing
#[derive(Debug, Clone, Default)]
pub struct PaymentInput {
    pub method: Option<PaymentMethod>,
    pub discount: Option<Decimal>,
    pub cash_given: Option<Decimal>,
    /// Change as computed by the terminal
    pub change_amount: Option<Decimal>,
}

/// unpaid → paid
///
/// Amount due is `total_amount − discount`. Cash payments must cover it;
/// change is computed here, a terminal-supplied change must agree.
pub fn pay(order: &mut Order, input: &PaymentInput, now: i64) -> OrderResult<()> {
    match order.payment_status {
        PaymentStatus::Unpaid => {}
        PaymentStatus::Paid => return Err(OrderError::AlreadyPaid(order.order_id.clone())),
        PaymentStatus::Refunded => {
            return Err(OrderError::AlreadyRefunded(order.order_id.clone()));
        }
    }
    let method = input.method.ok_or(OrderError::MissingPaymentMethod)?;

    let discount = round_money(input.discount.unwrap_or(Decimal::ZERO));
    if discount < Decimal::ZERO || discount > order.total_amount {
        return Err(OrderError::Validation(format!(
            "discountAmount must be between 0 and {}, got {}",
            order.total_amount, discount
        )));
    }
    let due = order.total_amount - discount;

    let (cash_given, change) = match method {
        PaymentMethod::Cash => {
            let cash_given = input.cash_given.ok_or(OrderError::CashRequired)?;
            let change = compute_change(cash_given, due)?;
            if let Some(claimed) = input.change_amount
                && !money_eq(claimed, change)
            {
                return Err(OrderError::Validation(format!(
                    "changeAmount {} does not match computed change {}",
                    claimed, change
                )));
            }
            (Some(cash_given), Some(change))
        }
        PaymentMethod::Card | PaymentMethod::Online => (None, None),
    };

    order.payment_status = PaymentStatus::Paid;
    order.payment_method = Some(method);
    order.discount_amount = discount;
    order.amount_paid = Some(due);
    order.cash_given = cash_given;
    order.change_amount = change;
    order.payment_time = Some(now);
    order.touch(now);
    Ok(())
}

/// paid → refunded
pub fn refund(order: &mut Order, now: i64) -> OrderResult<()> {
    match order.payment_status {
        PaymentStatus::Paid => {}
        PaymentStatus::Unpaid => return Err(OrderError::NotPaid(order.order_id.clone())),
        PaymentStatus::Refunded => {
            return Err(OrderError::AlreadyRefunded(order.order_id.clone()));
        }
    }

    order.payment_status = PaymentStatus::Refunded;
    order.refunded_at = Some(now);
    order.touch(now);
    Ok(())
}
