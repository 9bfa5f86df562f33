//! 订单错误

use crate::receipts::ReceiptError;
use crate::store::{StorageError, VersionConflict};
use crate::tables::TableError;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Stale(#[from] VersionConflict),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order must contain at least one line item")]
    EmptyOrder,

    #[error("Invalid line item: {0}")]
    InvalidLineItem(String),

    #[error("Invalid table reference: {0}")]
    InvalidTableReference(String),

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order already paid: {0}")]
    AlreadyPaid(String),

    #[error("Payment already refunded: {0}")]
    AlreadyRefunded(String),

    #[error("Order is not paid: {0}")]
    NotPaid(String),

    #[error("paymentMethod is required")]
    MissingPaymentMethod,

    #[error("cashGiven is required for cash payments")]
    CashRequired,

    #[error("Cash given {cash_given} is less than amount due {due}")]
    InsufficientCash { cash_given: Decimal, due: Decimal },

    #[error("Idempotency key {key} was already used for order {order_id}")]
    IdempotencyKeyReused { key: String, order_id: String },

    #[error("{0}")]
    Validation(String),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let code = match err {
            OrderError::Table(e) => return e.into(),
            OrderError::Receipt(e) => return e.into(),
            OrderError::Stale(conflict) => {
                return AppError::stale_state(conflict.expected, conflict.actual);
            }
            OrderError::Storage(ref e) => {
                tracing::error!(error = %e, "Storage error in order command");
                ErrorCode::DatabaseError
            }
            OrderError::NotFound(_) => ErrorCode::OrderNotFound,
            OrderError::EmptyOrder => ErrorCode::OrderEmpty,
            OrderError::InvalidLineItem(_) => ErrorCode::InvalidLineItem,
            OrderError::InvalidTableReference(_) => ErrorCode::InvalidTableReference,
            OrderError::InvalidTransition { .. } => ErrorCode::InvalidStatusTransition,
            OrderError::AlreadyPaid(_) => ErrorCode::OrderAlreadyPaid,
            OrderError::AlreadyRefunded(_) => ErrorCode::PaymentAlreadyRefunded,
            OrderError::NotPaid(_) => ErrorCode::OrderNotPaid,
            OrderError::MissingPaymentMethod => ErrorCode::PaymentInvalidMethod,
            OrderError::CashRequired => ErrorCode::PaymentCashRequired,
            OrderError::InsufficientCash { .. } => ErrorCode::PaymentInsufficientAmount,
            OrderError::IdempotencyKeyReused { .. } => ErrorCode::AlreadyExists,
            OrderError::Validation(_) => ErrorCode::ValidationFailed,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_insufficient_cash_is_402() {
        let err: AppError = OrderError::InsufficientCash {
            cash_given: Decimal::new(280, 0),
            due: Decimal::new(286, 0),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentInsufficientAmount);
        assert_eq!(err.http_status(), StatusCode::PAYMENT_REQUIRED);
        assert!(err.message.contains("280"));
    }

    #[test]
    fn test_nested_errors_keep_their_codes() {
        let err: AppError = OrderError::Table(TableError::NotFound(4)).into();
        assert_eq!(err.code, ErrorCode::TableNotFound);

        let err: AppError = OrderError::Receipt(ReceiptError::AlreadyExists("o1".into())).into();
        assert_eq!(err.code, ErrorCode::ReceiptAlreadyExists);
    }

    #[test]
    fn test_invalid_transition_is_409() {
        let err: AppError = OrderError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Served,
        }
        .into();
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.message, "Cannot move order from pending to served");
    }

    #[test]
    fn test_reused_idempotency_key_is_409() {
        let err: AppError = OrderError::IdempotencyKeyReused {
            key: "pay-1".into(),
            order_id: "o1".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }
}
