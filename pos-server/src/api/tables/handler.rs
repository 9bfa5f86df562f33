//! Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::{ok, ok_with_message};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult};
use shared::models::{
    FreeRequest, JoinTablesRequest, JoinTablesResponse, ReserveRequest, SeatRequest,
    SeparateTablesRequest, SeparateTablesResponse, Table, TableCreate, TableGroup,
};

type Reply<T> = AppResult<Json<ApiResponse<T>>>;

/// GET /api/tables - 所有桌台 (按桌号)
pub async fn list(State(state): State<ServerState>) -> Reply<Vec<Table>> {
    Ok(ok(state.tables.list_tables()?))
}

/// GET /api/tables/{id}
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<u64>) -> Reply<Table> {
    Ok(ok(state.tables.get_table(id)?))
}

/// POST /api/tables - 新建桌台
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<TableCreate>,
) -> Reply<Table> {
    let table = state.tables.create_table(&payload, &user.command_metadata())?;
    Ok(ok(table))
}

/// DELETE /api/tables/{id} - 仅空闲且未拼桌的桌台
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
) -> Reply<Table> {
    let table = state.tables.delete_table(id, &user.command_metadata())?;
    Ok(ok_with_message(table, "Table deleted"))
}

/// POST /api/tables/{id}/seat - 开台
pub async fn seat(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<SeatRequest>,
) -> Reply<Table> {
    Ok(ok(state.tables.seat_table(id, &payload, &user.command_metadata())?))
}

/// POST /api/tables/{id}/free - 清台 (请求体可省略)
pub async fn free(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    payload: Option<Json<FreeRequest>>,
) -> Reply<Table> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    Ok(ok(state.tables.free_table(id, &payload, &user.command_metadata())?))
}

/// POST /api/tables/{id}/reserve - 预订
pub async fn reserve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<u64>,
    Json(payload): Json<ReserveRequest>,
) -> Reply<Table> {
    Ok(ok(state.tables.reserve_table(id, &payload, &user.command_metadata())?))
}

/// POST /api/tables/join - 拼桌
pub async fn join(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<JoinTablesRequest>,
) -> Reply<JoinTablesResponse> {
    let response = state.tables.join_tables(&payload, &user.command_metadata())?;
    Ok(ok_with_message(response, "Tables joined"))
}

/// DELETE /api/tables/join - 拆桌 (groupId 或 tableIds)
pub async fn separate(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<SeparateTablesRequest>,
) -> Reply<SeparateTablesResponse> {
    let response = state.tables.separate_tables(&payload, &user.command_metadata())?;
    Ok(ok_with_message(response, "Tables separated"))
}

/// GET /api/tables/groups
pub async fn list_groups(State(state): State<ServerState>) -> Reply<Vec<TableGroup>> {
    Ok(ok(state.tables.list_groups()?))
}

/// GET /api/tables/groups/{id}
pub async fn get_group(
    State(state): State<ServerState>,
    Path(group_id): Path<String>,
) -> Reply<TableGroup> {
    Ok(ok(state.tables.get_group(&group_id)?))
}

/// POST /api/tables/groups/{id}/seat
pub async fn seat_group(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<String>,
    Json(payload): Json<SeatRequest>,
) -> Reply<TableGroup> {
    let group = state
        .tables
        .seat_group(&group_id, &payload, &user.command_metadata())?;
    Ok(ok(group))
}

/// POST /api/tables/groups/{id}/free
pub async fn free_group(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(group_id): Path<String>,
    payload: Option<Json<FreeRequest>>,
) -> Reply<TableGroup> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let group = state
        .tables
        .free_group(&group_id, &payload, &user.command_metadata())?;
    Ok(ok(group))
}
