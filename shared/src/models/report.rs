//! Reporting DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inclusive date range query (`YYYY-MM-DD`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_orders: u64,
    pub average_order_value: Decimal,
    /// Percent change vs the preceding window of the same length
    pub revenue_change: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BestSellingItem {
    pub item_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummaryResponse {
    pub summary: SalesSummary,
    pub best_selling_item: Option<BestSellingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySales {
    pub date: String,
    pub revenue: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub quantity: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlySales {
    pub hour: u32,
    pub revenue: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSales {
    pub method: String,
    pub revenue: Decimal,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub from: String,
    pub to: String,
    pub summary: SalesSummary,
    pub best_selling_item: Option<BestSellingItem>,
    pub daily: Vec<DailySales>,
    pub categories: Vec<CategorySales>,
    pub hourly: Vec<HourlySales>,
    pub payment_methods: Vec<PaymentMethodSales>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableCounts {
    pub available: u64,
    pub occupied: u64,
    pub reserved: u64,
    pub groups: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrderCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub ready: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub tables: TableCounts,
    pub open_orders: OpenOrderCounts,
    pub unpaid_orders: u64,
    pub today_revenue: Decimal,
    pub today_orders: u64,
}
