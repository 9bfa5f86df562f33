//! Receipt API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::RECEIPTS_CORRECT;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/receipts", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list).post(handler::generate))
        .route("/{id}", get(handler::get_by_id))
        .route("/order/{order_id}", get(handler::get_by_order));

    let correct_routes = Router::new()
        .route("/{id}", put(handler::correct))
        .layer(middleware::from_fn(require_permission(RECEIPTS_CORRECT)));

    read_routes.merge(correct_routes)
}
