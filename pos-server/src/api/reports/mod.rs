//! Reports API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::REPORTS_VIEW;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/sales-summary", get(handler::sales_summary))
        .route("/sales-report", get(handler::sales_report))
        .route("/dashboard", get(handler::dashboard))
        .layer(middleware::from_fn(require_permission(REPORTS_VIEW)))
}
