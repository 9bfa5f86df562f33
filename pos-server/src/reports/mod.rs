//! 报表服务 - 只读聚合
//!
//! 读取存储快照，交给 [`sales`] 中的纯函数计算。
//! 日期范围为业务时区的自然日，含首尾两天。

pub mod sales;

use crate::store::PosStorage;
use crate::utils::time::{day_end_millis, day_start_millis, local_date, parse_date};
use crate::utils::{AppError, AppResult};
use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use shared::models::{
    Dashboard, GroupStatus, OpenOrderCounts, OrderStatus, PaymentStatus, SalesReport,
    SalesSummaryResponse, TableCounts, TableStatus,
};

/// 单次查询最多覆盖的天数
pub const MAX_RANGE_DAYS: i64 = 366;

#[derive(Clone)]
pub struct ReportService {
    storage: PosStorage,
    tz: Tz,
}

impl std::fmt::Debug for ReportService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportService").field("tz", &self.tz).finish()
    }
}

/// Validated inclusive range plus the equal-length window before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReportRange {
    from: NaiveDate,
    to: NaiveDate,
    previous_from: NaiveDate,
    previous_to: NaiveDate,
}

impl ReportRange {
    fn parse(from: &str, to: &str) -> AppResult<Self> {
        let from = parse_date(from)?;
        let to = parse_date(to)?;
        if from > to {
            return Err(AppError::validation(format!(
                "from ({}) must not be after to ({})",
                from, to
            )));
        }
        let days = (to - from).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(AppError::validation(format!(
                "Date range spans {} days, at most {} allowed",
                days, MAX_RANGE_DAYS
            )));
        }

        Ok(Self {
            from,
            to,
            previous_from: from - Duration::days(days),
            previous_to: from - Duration::days(1),
        })
    }
}

impl ReportService {
    pub fn new(storage: PosStorage, tz: Tz) -> Self {
        Self { storage, tz }
    }

    /// Headline numbers and best seller for `[from, to]`
    pub fn sales_summary(&self, from: &str, to: &str) -> AppResult<SalesSummaryResponse> {
        let range = ReportRange::parse(from, to)?;
        let orders = self.storage.list_orders()?;

        let current = sales::sales_in_window(
            &orders,
            day_start_millis(range.from, self.tz),
            day_end_millis(range.to, self.tz),
        );
        let previous = sales::sales_in_window(
            &orders,
            day_start_millis(range.previous_from, self.tz),
            day_end_millis(range.previous_to, self.tz),
        );

        tracing::debug!(from = %range.from, to = %range.to, orders = current.len(), "Sales summary");
        Ok(SalesSummaryResponse {
            summary: sales::summarize(&current, &previous),
            best_selling_item: sales::best_selling_item(&current),
        })
    }

    /// Full report with daily, category, hourly and payment-method breakdowns
    pub fn sales_report(&self, from: &str, to: &str) -> AppResult<SalesReport> {
        let range = ReportRange::parse(from, to)?;
        let orders = self.storage.list_orders()?;

        let current = sales::sales_in_window(
            &orders,
            day_start_millis(range.from, self.tz),
            day_end_millis(range.to, self.tz),
        );
        let previous = sales::sales_in_window(
            &orders,
            day_start_millis(range.previous_from, self.tz),
            day_end_millis(range.previous_to, self.tz),
        );

        Ok(SalesReport {
            from: range.from.format("%Y-%m-%d").to_string(),
            to: range.to.format("%Y-%m-%d").to_string(),
            summary: sales::summarize(&current, &previous),
            best_selling_item: sales::best_selling_item(&current),
            daily: sales::daily_series(&current, range.from, range.to, self.tz),
            categories: sales::category_breakdown(&current),
            hourly: sales::hourly_distribution(&current, self.tz),
            payment_methods: sales::payment_method_breakdown(&current),
        })
    }

    /// Floor snapshot at `now`
    pub fn dashboard(&self, now: i64) -> AppResult<Dashboard> {
        let tables = self.storage.list_tables()?;
        let groups = self.storage.list_groups()?;
        let orders = self.storage.list_orders()?;

        let mut table_counts = TableCounts {
            groups: groups.len() as u64,
            ..Default::default()
        };
        for table in &tables {
            match table.status {
                TableStatus::Available => table_counts.available += 1,
                TableStatus::Occupied => table_counts.occupied += 1,
                TableStatus::Reserved => table_counts.reserved += 1,
            }
        }
        // 拼桌占用记在组上，成员桌按占用计
        for group in groups.iter().filter(|g| g.status == GroupStatus::Occupied) {
            let members = group.member_table_ids.len() as u64;
            table_counts.available = table_counts.available.saturating_sub(members);
            table_counts.occupied += members;
        }

        let mut open_orders = OpenOrderCounts::default();
        let mut unpaid_orders = 0;
        for order in &orders {
            match order.status {
                OrderStatus::Pending => open_orders.pending += 1,
                OrderStatus::InProgress => open_orders.in_progress += 1,
                OrderStatus::Ready => open_orders.ready += 1,
                _ => {}
            }
            if order.payment_status == PaymentStatus::Unpaid && order.status != OrderStatus::Cancelled {
                unpaid_orders += 1;
            }
        }

        let today = local_date(now, self.tz);
        let today_sales = sales::sales_in_window(
            &orders,
            day_start_millis(today, self.tz),
            day_end_millis(today, self.tz),
        );

        Ok(Dashboard {
            tables: table_counts,
            open_orders,
            unpaid_orders,
            today_revenue: sales::total_revenue(&today_sales),
            today_orders: today_sales.len() as u64,
        })
    }
}
