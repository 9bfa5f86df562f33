//! 销售聚合 - 纯函数
//!
//! 输入是已按时间窗口过滤的已支付订单，输出报表 DTO。
//! 空输入一律返回零值，不报错。

use crate::orders::money::{line_total, round_money};
use crate::utils::time::{local_date, local_hour};
use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    BestSellingItem, CategorySales, DailySales, HourlySales, Order, PaymentMethodSales,
    PaymentStatus, SalesSummary,
};
use std::collections::{BTreeMap, HashMap};

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Paid orders whose payment time falls in `[start, end)`
pub fn sales_in_window(orders: &[Order], start: i64, end: i64) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| o.payment_status == PaymentStatus::Paid)
        .filter(|o| o.payment_time.is_some_and(|t| t >= start && t < end))
        .collect()
}

/// Amount actually charged for an order
pub fn sale_amount(order: &Order) -> Decimal {
    order.amount_paid.unwrap_or(order.total_amount)
}

pub fn total_revenue(sales: &[&Order]) -> Decimal {
    round_money(sales.iter().map(|o| sale_amount(o)).sum())
}

/// Percent change; 0 when both windows are empty, 100 when only the previous is
pub fn revenue_change(current: Decimal, previous: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED
        };
    }
    round_money((current - previous) / previous * Decimal::ONE_HUNDRED)
}

pub fn summarize(current: &[&Order], previous: &[&Order]) -> SalesSummary {
    let revenue = total_revenue(current);
    let count = current.len() as u64;
    let average = if count == 0 {
        Decimal::ZERO
    } else {
        round_money(revenue / Decimal::from(count))
    };

    SalesSummary {
        total_revenue: revenue,
        total_orders: count,
        average_order_value: average,
        revenue_change: revenue_change(revenue, total_revenue(previous)),
    }
}

/// Highest quantity sold; ties go to the alphabetically first name
pub fn best_selling_item(sales: &[&Order]) -> Option<BestSellingItem> {
    let mut by_item: HashMap<&str, BestSellingItem> = HashMap::new();
    for item in sales.iter().flat_map(|o| o.items.iter()) {
        let entry = by_item
            .entry(item.item_id.as_str())
            .or_insert_with(|| BestSellingItem {
                item_id: item.item_id.clone(),
                name: item.name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
        entry.quantity += i64::from(item.quantity);
        entry.revenue += line_total(item);
    }

    by_item
        .into_values()
        .max_by(|a, b| {
            a.quantity
                .cmp(&b.quantity)
                .then_with(|| b.name.cmp(&a.name))
                .then_with(|| b.item_id.cmp(&a.item_id))
        })
}

/// One entry per calendar day in `[from, to]`, zero-filled
pub fn daily_series(sales: &[&Order], from: NaiveDate, to: NaiveDate, tz: Tz) -> Vec<DailySales> {
    let mut buckets: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
    let mut day = from;
    while day <= to {
        buckets.insert(day, (Decimal::ZERO, 0));
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    for order in sales {
        let Some(paid_at) = order.payment_time else {
            continue;
        };
        if let Some(bucket) = buckets.get_mut(&local_date(paid_at, tz)) {
            bucket.0 += sale_amount(order);
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, (revenue, orders))| DailySales {
            date: date.format("%Y-%m-%d").to_string(),
            revenue: round_money(revenue),
            orders,
        })
        .collect()
}

/// Line-item revenue per menu category, highest first
pub fn category_breakdown(sales: &[&Order]) -> Vec<CategorySales> {
    let mut by_category: BTreeMap<&str, (i64, Decimal)> = BTreeMap::new();
    for item in sales.iter().flat_map(|o| o.items.iter()) {
        let category = item.category.as_deref().unwrap_or(UNCATEGORIZED);
        let entry = by_category.entry(category).or_insert((0, Decimal::ZERO));
        entry.0 += i64::from(item.quantity);
        entry.1 += line_total(item);
    }

    let mut categories: Vec<CategorySales> = by_category
        .into_iter()
        .map(|(category, (quantity, revenue))| CategorySales {
            category: category.to_string(),
            quantity,
            revenue: round_money(revenue),
        })
        .collect();
    categories.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.category.cmp(&b.category)));
    categories
}

/// 24 buckets, hour of payment in the business timezone
pub fn hourly_distribution(sales: &[&Order], tz: Tz) -> Vec<HourlySales> {
    let mut hours: Vec<HourlySales> = (0..24)
        .map(|hour| HourlySales {
            hour,
            revenue: Decimal::ZERO,
            orders: 0,
        })
        .collect();

    for order in sales {
        let Some(paid_at) = order.payment_time else {
            continue;
        };
        let bucket = &mut hours[local_hour(paid_at, tz) as usize % 24];
        bucket.revenue += sale_amount(order);
        bucket.orders += 1;
    }
    for bucket in &mut hours {
        bucket.revenue = round_money(bucket.revenue);
    }
    hours
}

pub fn payment_method_breakdown(sales: &[&Order]) -> Vec<PaymentMethodSales> {
    let mut by_method: BTreeMap<&str, (Decimal, u64)> = BTreeMap::new();
    for order in sales {
        let method = order.payment_method.map(|m| m.as_str()).unwrap_or("unknown");
        let entry = by_method.entry(method).or_insert((Decimal::ZERO, 0));
        entry.0 += sale_amount(order);
        entry.1 += 1;
    }

    by_method
        .into_iter()
        .map(|(method, (revenue, orders))| PaymentMethodSales {
            method: method.to_string(),
            revenue: round_money(revenue),
            orders,
        })
        .collect()
}
