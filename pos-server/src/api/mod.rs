//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公共)
//! - [`tables`] - 桌台、拼桌接口
//! - [`orders`] - 订单与支付接口
//! - [`receipts`] - 小票接口
//! - [`reports`] - 报表接口

pub mod health;
pub mod orders;
pub mod receipts;
pub mod reports;
pub mod tables;

use axum::{Json, Router};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::ApiResponse;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// 所有路由 (不含中间件与状态)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(receipts::router())
        .merge(reports::router())
}

/// 成功响应
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}

pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success_with_message(message, data))
}
