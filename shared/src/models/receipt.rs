//! Receipt Model

use super::order::{LineItem, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable receipt derived from a paid order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub receipt_id: String,
    /// RCP{yyyymmdd}{10000+n}
    pub receipt_number: String,
    pub order_id: String,
    pub items: Vec<LineItem>,
    /// VAT-exclusive amount
    pub subtotal: Decimal,
    /// Rate as a fraction, e.g. 0.12
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_given: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<Decimal>,
    pub table_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_at: Option<i64>,
}

/// Explicit receipt generation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptCreate {
    pub order_id: String,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    /// Total as computed by the terminal
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

/// Correction payload, only cash_given and notes may change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptCorrection {
    #[serde(default)]
    pub cash_given: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}
