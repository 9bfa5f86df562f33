//! Receipt API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{ok, ok_with_message};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{Receipt, ReceiptCorrection, ReceiptCreate};

type Reply<T> = AppResult<Json<ApiResponse<T>>>;

/// GET /api/receipts
pub async fn list(State(state): State<ServerState>) -> Reply<Vec<Receipt>> {
    Ok(ok(state.receipts.list()?))
}

/// GET /api/receipts/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<String>) -> Reply<Receipt> {
    Ok(ok(state.receipts.get(&id)?))
}

/// GET /api/receipts/order/{order_id}
pub async fn get_by_order(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> Reply<Receipt> {
    Ok(ok(state.receipts.get_by_order(&order_id)?))
}

/// POST /api/receipts - 为已支付订单补开小票
pub async fn generate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ReceiptCreate>,
) -> Reply<Receipt> {
    let receipt = state.receipts.generate(&payload, &user.command_metadata())?;
    Ok(ok_with_message(receipt, "Receipt generated"))
}

/// PUT /api/receipts/{id} - 更正 (仅 cashGiven / notes，限时)
pub async fn correct(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReceiptCorrection>,
) -> Reply<Receipt> {
    let receipt = state
        .receipts
        .correct(&id, &payload, &user.command_metadata())?;
    Ok(ok_with_message(receipt, "Receipt corrected"))
}
