//! Table API 模块
//!
//! 桌台 CRUD、状态流转 (开台/清台/预订) 和拼桌。
//! 静态路径 (`/join`, `/groups`) 优先于 `/{id}` 匹配。

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::permissions::TABLES_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    let floor_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/seat", post(handler::seat))
        .route("/{id}/free", post(handler::free))
        .route("/{id}/reserve", post(handler::reserve))
        .route("/join", post(handler::join).delete(handler::separate))
        .route("/groups", get(handler::list_groups))
        .route("/groups/{id}", get(handler::get_group))
        .route("/groups/{id}/seat", post(handler::seat_group))
        .route("/groups/{id}/free", post(handler::free_group));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(TABLES_MANAGE)));

    floor_routes.merge(manage_routes)
}
