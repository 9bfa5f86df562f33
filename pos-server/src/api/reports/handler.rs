//! Reports API Handlers

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::ok;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{Dashboard, DateRangeQuery, SalesReport, SalesSummaryResponse};

type Reply<T> = AppResult<Json<ApiResponse<T>>>;

/// GET /api/reports/sales-summary?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn sales_summary(
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> Reply<SalesSummaryResponse> {
    Ok(ok(state.reports.sales_summary(&query.from, &query.to)?))
}

/// GET /api/reports/sales-report?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn sales_report(
    State(state): State<ServerState>,
    Query(query): Query<DateRangeQuery>,
) -> Reply<SalesReport> {
    Ok(ok(state.reports.sales_report(&query.from, &query.to)?))
}

/// GET /api/reports/dashboard
pub async fn dashboard(State(state): State<ServerState>) -> Reply<Dashboard> {
    Ok(ok(state.reports.dashboard(shared::util::now_millis())?))
}
