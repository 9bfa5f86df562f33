//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::{ok, ok_with_message};
use crate::auth::CurrentUser;
use crate::auth::permissions::ORDERS_REFUND;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{ApiResponse, AppError, AppResult};
use shared::models::{Order, OrderCreate, OrderQuery, OrderStatusUpdate, PaymentStatus, PaymentUpdate};

type Reply<T> = AppResult<Json<ApiResponse<T>>>;

/// GET /api/orders?status=&paymentStatus=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> Reply<Vec<Order>> {
    Ok(ok(state.orders.list_orders(&query)?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> Reply<Order> {
    Ok(ok(state.orders.get_order(&id)?))
}

/// POST /api/orders - 下单 (可同时开台、预付)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> Reply<Order> {
    let order = state.orders.create_order(&payload, &user.command_metadata())?;
    Ok(ok_with_message(order, "Order created"))
}

/// PUT /api/orders/status - 订单状态流转
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderStatusUpdate>,
) -> Reply<Order> {
    let order = state
        .orders
        .transition_status(&payload, &user.command_metadata())?;
    let message = format!("Order status updated to {}", order.status);
    Ok(ok_with_message(order, message))
}

/// PUT /api/orders/payment - 支付或退款
pub async fn update_payment(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PaymentUpdate>,
) -> Reply<Order> {
    if payload.payment_status == PaymentStatus::Refunded && !user.has_permission(ORDERS_REFUND) {
        security_log!(
            "WARN",
            "permission_denied",
            user_id = user.id.clone(),
            username = user.username.clone(),
            required_permission = ORDERS_REFUND
        );
        return Err(AppError::permission_denied(format!(
            "Permission denied: {}",
            ORDERS_REFUND
        )));
    }

    let order = state.orders.update_payment(&payload, &user.command_metadata())?;
    let message = format!("Payment status updated to {}", order.payment_status);
    Ok(ok_with_message(order, message))
}
