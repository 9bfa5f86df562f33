//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order fulfilment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Ready,
    /// Terminal, staff-placed order
    Served,
    /// Terminal, customer self-order
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Served | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status, orthogonal to [`OrderStatus`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Online => "online",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an order is seated at
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableRef {
    Table { id: u64 },
    Group { id: String },
}

/// Line item (菜品行)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(alias = "id")]
    pub item_id: String,
    pub name: String,
    /// VAT-inclusive unit price
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    /// Signed so that bad input reaches validation instead of failing to parse
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Menu category, used by reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// One entry of the status audit trail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub operator_id: String,
    pub operator_name: String,
    pub at: i64,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub table_ref: TableRef,
    /// "Table 4" or "Tables 2 + 5"
    pub table_label: String,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// Amount charged, after discount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_given: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_customer_order: bool,
    /// Σ unit_price × quantity, fixed at creation
    pub total_amount: Decimal,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: u64,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
}

impl Order {
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn touch(&mut self, now: i64) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Create order payload
///
/// Exactly one of `table_number` / `group_id` must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(default)]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub group_id: Option<String>,
    /// Used when the order seats an available table or group (default 1)
    #[serde(default)]
    pub guest_count: Option<u32>,
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_customer_order: bool,
    /// Pay immediately (pre-payment)
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// `paid` requires `payment_method`; `unpaid` forbids it
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub cash_given: Option<Decimal>,
    /// Change as computed by the terminal; must match ours when present
    #[serde(default)]
    pub change_amount: Option<Decimal>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

/// Status transition payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Payment payload: `paid` records a payment, `refunded` refunds it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub order_id: String,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Amount due as seen by the terminal; checked against the order
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub cash_given: Option<Decimal>,
    /// Change as computed by the terminal; must match ours when present
    #[serde(default)]
    pub change_amount: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// List orders query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_accepts_terminal_field_names() {
        let json = r#"{"id":"m-12","name":"Sisig","price":120.50,"quantity":2,"notes":"extra spicy"}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.item_id, "m-12");
        assert_eq!(item.unit_price, Decimal::new(12050, 2));
        assert_eq!(item.quantity, 2);
        assert!(item.category.is_none());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
        assert!(status.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_table_ref_tagged() {
        let json = serde_json::to_value(TableRef::Group { id: "g".into() }).unwrap();
        assert_eq!(json["type"], "group");
        assert_eq!(json["id"], "g");
    }
}
