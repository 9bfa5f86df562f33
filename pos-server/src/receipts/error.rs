//! 小票错误

use crate::store::StorageError;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Receipt not found: {0}")]
    NotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order is not paid: {0}")]
    OrderNotPaid(String),

    #[error("Receipt already exists for order {0}")]
    AlreadyExists(String),

    #[error("Receipt totals do not reconcile: expected {expected}, computed {computed}")]
    Reconciliation { expected: Decimal, computed: Decimal },

    #[error("{0}")]
    InvalidDiscount(String),

    #[error("Paid order {0} has no payment method")]
    MissingPaymentMethod(String),

    #[error("Correction window closed for receipt {0}")]
    CorrectionWindowClosed(String),

    #[error("Invalid correction: {0}")]
    InvalidCorrection(String),
}

pub type ReceiptResult<T> = Result<T, ReceiptError>;

impl From<ReceiptError> for AppError {
    fn from(err: ReceiptError) -> Self {
        let code = match &err {
            ReceiptError::Storage(e) => {
                tracing::error!(error = %e, "Storage error in receipt command");
                ErrorCode::DatabaseError
            }
            ReceiptError::NotFound(_) => ErrorCode::ReceiptNotFound,
            ReceiptError::OrderNotFound(_) => ErrorCode::OrderNotFound,
            ReceiptError::OrderNotPaid(_) => ErrorCode::OrderNotPaid,
            ReceiptError::AlreadyExists(_) => ErrorCode::ReceiptAlreadyExists,
            ReceiptError::Reconciliation { expected, computed } => {
                tracing::warn!(%expected, %computed, "Receipt reconciliation failed");
                ErrorCode::ReceiptReconciliationFailed
            }
            ReceiptError::InvalidDiscount(_) => ErrorCode::ValidationFailed,
            ReceiptError::MissingPaymentMethod(_) => ErrorCode::PaymentInvalidMethod,
            ReceiptError::CorrectionWindowClosed(_) => ErrorCode::ReceiptCorrectionClosed,
            ReceiptError::InvalidCorrection(_) => ErrorCode::ReceiptInvalidCorrection,
        };
        let mut app = AppError::with_message(code, err.to_string());
        if let ReceiptError::Reconciliation { expected, computed } = err {
            app = app
                .with_detail("expected", expected.to_string())
                .with_detail("computed", computed.to_string());
        }
        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_reconciliation_is_422_with_details() {
        let err: AppError = ReceiptError::Reconciliation {
            expected: Decimal::new(28000, 2),
            computed: Decimal::new(28600, 2),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ReceiptReconciliationFailed);
        assert_eq!(err.http_status(), StatusCode::UNPROCESSABLE_ENTITY);
        let details = err.details.unwrap();
        assert_eq!(details["expected"], "280.00");
        assert_eq!(details["computed"], "286.00");
    }

    #[test]
    fn test_duplicate_is_409() {
        let err: AppError = ReceiptError::AlreadyExists("o1".into()).into();
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }
}
