//! Unified error codes for the POS service
//!
//! This module defines all error codes returned by pos-server to terminals.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Receipt errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Entity changed since the client last observed it
    StaleState = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order is not paid
    OrderNotPaid = 4003,
    /// Status transition not allowed by the lifecycle graph
    InvalidStatusTransition = 4004,
    /// Line item has invalid price or quantity
    InvalidLineItem = 4005,
    /// Order has no line items
    OrderEmpty = 4007,
    /// Order references a table or group that cannot take orders
    InvalidTableReference = 4008,

    // ==================== 5xxx: Payment ====================
    /// Insufficient payment amount
    PaymentInsufficientAmount = 5002,
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// Payment has already been refunded
    PaymentAlreadyRefunded = 5004,
    /// Cash payment without cash given
    PaymentCashRequired = 5006,

    // ==================== 6xxx: Receipt ====================
    /// Receipt not found
    ReceiptNotFound = 6001,
    /// Receipt already generated for this order
    ReceiptAlreadyExists = 6002,
    /// Computed totals disagree with supplied totals
    ReceiptReconciliationFailed = 6003,
    /// Receipt can no longer be corrected
    ReceiptCorrectionClosed = 6004,
    /// Correction not allowed for this receipt
    ReceiptInvalidCorrection = 6005,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// Table is not available
    TableUnavailable = 7002,
    /// Table is already part of a group
    TableAlreadyGrouped = 7003,
    /// Table group not found
    TableGroupNotFound = 7004,
    /// Fewer than two tables supplied for a join
    InsufficientTables = 7005,
    /// Reservation date or time missing
    MissingReservationDetails = 7006,
    /// Table number already in use
    TableNumberExists = 7007,
    /// Status transition not allowed for table or group
    InvalidTableTransition = 7008,
    /// Table cannot be deleted in its current state
    TableNotDeletable = 7009,
    /// Table (or group) still has open orders
    TableHasOrders = 7104,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::StaleState => "Resource was modified by another terminal",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderNotPaid => "Order is not paid",
            ErrorCode::InvalidStatusTransition => "Order status transition is not allowed",
            ErrorCode::InvalidLineItem => "Line item is invalid",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidTableReference => "Order table reference is invalid",

            // Payment
            ErrorCode::PaymentInsufficientAmount => "Insufficient payment amount",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentAlreadyRefunded => "Payment has already been refunded",
            ErrorCode::PaymentCashRequired => "Cash given is required for cash payments",

            // Receipt
            ErrorCode::ReceiptNotFound => "Receipt not found",
            ErrorCode::ReceiptAlreadyExists => "Receipt already exists for this order",
            ErrorCode::ReceiptReconciliationFailed => "Receipt totals do not reconcile",
            ErrorCode::ReceiptCorrectionClosed => "Receipt correction window has closed",
            ErrorCode::ReceiptInvalidCorrection => "Receipt correction is not allowed",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableUnavailable => "Table is not available",
            ErrorCode::TableAlreadyGrouped => "Table is already part of a group",
            ErrorCode::TableGroupNotFound => "Table group not found",
            ErrorCode::InsufficientTables => "At least two tables are required",
            ErrorCode::MissingReservationDetails => "Reservation date and time are required",
            ErrorCode::TableNumberExists => "Table number already exists",
            ErrorCode::InvalidTableTransition => "Table status transition is not allowed",
            ErrorCode::TableNotDeletable => "Table must be available and ungrouped to delete",
            ErrorCode::TableHasOrders => "Table has open orders",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::InvalidFormat,
            7 => ErrorCode::RequiredField,
            8 => ErrorCode::ValueOutOfRange,
            9 => ErrorCode::StaleState,

            1001 => ErrorCode::NotAuthenticated,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,

            2001 => ErrorCode::PermissionDenied,

            4001 => ErrorCode::OrderNotFound,
            4002 => ErrorCode::OrderAlreadyPaid,
            4003 => ErrorCode::OrderNotPaid,
            4004 => ErrorCode::InvalidStatusTransition,
            4005 => ErrorCode::InvalidLineItem,
            4007 => ErrorCode::OrderEmpty,
            4008 => ErrorCode::InvalidTableReference,

            5002 => ErrorCode::PaymentInsufficientAmount,
            5003 => ErrorCode::PaymentInvalidMethod,
            5004 => ErrorCode::PaymentAlreadyRefunded,
            5006 => ErrorCode::PaymentCashRequired,

            6001 => ErrorCode::ReceiptNotFound,
            6002 => ErrorCode::ReceiptAlreadyExists,
            6003 => ErrorCode::ReceiptReconciliationFailed,
            6004 => ErrorCode::ReceiptCorrectionClosed,
            6005 => ErrorCode::ReceiptInvalidCorrection,

            7001 => ErrorCode::TableNotFound,
            7002 => ErrorCode::TableUnavailable,
            7003 => ErrorCode::TableAlreadyGrouped,
            7004 => ErrorCode::TableGroupNotFound,
            7005 => ErrorCode::InsufficientTables,
            7006 => ErrorCode::MissingReservationDetails,
            7007 => ErrorCode::TableNumberExists,
            7008 => ErrorCode::InvalidTableTransition,
            7009 => ErrorCode::TableNotDeletable,
            7104 => ErrorCode::TableHasOrders,

            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9004 => ErrorCode::TimeoutError,
            9005 => ErrorCode::ConfigError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip_through_u16() {
        for code in [
            ErrorCode::StaleState,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::PaymentInsufficientAmount,
            ErrorCode::ReceiptReconciliationFailed,
            ErrorCode::TableAlreadyGrouped,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableGroupNotFound).unwrap();
        assert_eq!(json, "7004");
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::PaymentInsufficientAmount);
    }
}
