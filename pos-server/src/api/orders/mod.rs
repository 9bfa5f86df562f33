//! Order API 模块
//!
//! 退款 (`paymentStatus = refunded`) 需要 `orders:refund`，在处理器内检查。

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/status", put(handler::update_status))
        .route("/payment", put(handler::update_payment))
        .route("/{id}", get(handler::get_by_id))
}
