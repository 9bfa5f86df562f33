//! 桌台管理
//!
//! - [`status`] - 单桌状态转换 (开台/清台/预订)
//! - [`grouping`] - 拼桌与拆桌
//!
//! [`TableManager`] 把规则包在写事务里：每个命令在事务内重新读取实体、
//! 重新检查前置条件，失败时整个事务丢弃。

pub mod error;
pub mod grouping;
pub mod status;

pub use error::{TableError, TableResult};

use crate::audit_log;
use crate::store::{CommandMetadata, PosStorage, check_version};
use shared::models::{
    FreeRequest, JoinTablesRequest, JoinTablesResponse, ReserveRequest, SeatRequest,
    SeparateTablesRequest, SeparateTablesResponse, Table, TableCreate, TableGroup, TableRef,
};

const TABLE_ID_COUNTER: &str = "table_id";

/// 单桌最大座位数
pub const MAX_CAPACITY: u32 = 100;

/// Table and table-group commands
#[derive(Clone)]
pub struct TableManager {
    storage: PosStorage,
}

impl std::fmt::Debug for TableManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableManager").finish_non_exhaustive()
    }
}

impl TableManager {
    pub fn new(storage: PosStorage) -> Self {
        Self { storage }
    }

    // ========== Administration ==========

    pub fn create_table(&self, payload: &TableCreate, meta: &CommandMetadata) -> TableResult<Table> {
        if payload.number == 0 {
            return Err(TableError::InvalidInput("number must be positive".to_string()));
        }
        if payload.capacity == 0 {
            return Err(TableError::InvalidInput("capacity must be positive".to_string()));
        }
        if payload.capacity > MAX_CAPACITY {
            return Err(TableError::InvalidInput(format!(
                "capacity must not exceed {MAX_CAPACITY}"
            )));
        }

        let table = self.storage.transact(|ctx| -> TableResult<_> {
            if ctx.table_id_by_number(payload.number)?.is_some() {
                return Err(TableError::NumberExists(payload.number));
            }
            let id = ctx.next_counter(TABLE_ID_COUNTER)?;
            let table = Table::new(id, payload.number, payload.capacity, meta.timestamp);
            ctx.put_table(&table)?;
            Ok(table)
        })?;

        tracing::info!(table_id = table.id, number = table.number, "Table created");
        audit_log!(meta, "table.create", table.label());
        Ok(table)
    }

    pub fn delete_table(&self, id: u64, meta: &CommandMetadata) -> TableResult<Table> {
        let table = self.storage.transact(|ctx| -> TableResult<_> {
            let table = ctx.get_table(id)?.ok_or(TableError::NotFound(id))?;
            if table.status != shared::models::TableStatus::Available || table.is_grouped() {
                return Err(TableError::NotDeletable(table.number));
            }
            ctx.remove_table(&table)?;
            Ok(table)
        })?;

        tracing::info!(table_id = id, number = table.number, "Table deleted");
        audit_log!(meta, "table.delete", table.label());
        Ok(table)
    }

    pub fn list_tables(&self) -> TableResult<Vec<Table>> {
        Ok(self.storage.list_tables()?)
    }

    pub fn get_table(&self, id: u64) -> TableResult<Table> {
        self.storage.get_table(id)?.ok_or(TableError::NotFound(id))
    }

    // ========== Status transitions ==========

    pub fn seat_table(
        &self,
        id: u64,
        payload: &SeatRequest,
        meta: &CommandMetadata,
    ) -> TableResult<Table> {
        let table = self.storage.transact(|ctx| -> TableResult<_> {
            let mut table = ctx.get_table(id)?.ok_or(TableError::NotFound(id))?;
            check_version(payload.expected_version, table.version)?;
            status::seat(&mut table, payload.guest_count, meta.timestamp)?;
            ctx.put_table(&table)?;
            Ok(table)
        })?;

        tracing::info!(table_id = id, guest_count = payload.guest_count, "Table seated");
        audit_log!(meta, "table.seat", table.label(), format!("guests={}", payload.guest_count));
        Ok(table)
    }

    pub fn free_table(
        &self,
        id: u64,
        payload: &FreeRequest,
        meta: &CommandMetadata,
    ) -> TableResult<Table> {
        let table = self.storage.transact(|ctx| -> TableResult<_> {
            let mut table = ctx.get_table(id)?.ok_or(TableError::NotFound(id))?;
            check_version(payload.expected_version, table.version)?;
            if !ctx.open_orders_for(&TableRef::Table { id })?.is_empty() {
                return Err(TableError::HasActiveOrders(table.label()));
            }
            status::free(&mut table, meta.timestamp)?;
            ctx.put_table(&table)?;
            Ok(table)
        })?;

        tracing::info!(table_id = id, "Table freed");
        audit_log!(meta, "table.free", table.label());
        Ok(table)
    }

    pub fn reserve_table(
        &self,
        id: u64,
        payload: &ReserveRequest,
        meta: &CommandMetadata,
    ) -> TableResult<Table> {
        let table = self.storage.transact(|ctx| -> TableResult<_> {
            let mut table = ctx.get_table(id)?.ok_or(TableError::NotFound(id))?;
            check_version(payload.expected_version, table.version)?;
            status::reserve(&mut table, &payload.date, &payload.time, meta.timestamp)?;
            ctx.put_table(&table)?;
            Ok(table)
        })?;

        tracing::info!(table_id = id, date = %payload.date, time = %payload.time, "Table reserved");
        audit_log!(
            meta,
            "table.reserve",
            table.label(),
            format!("{} {}", payload.date, payload.time)
        );
        Ok(table)
    }

    // ========== Join / separate ==========

    pub fn join_tables(
        &self,
        payload: &JoinTablesRequest,
        meta: &CommandMetadata,
    ) -> TableResult<JoinTablesResponse> {
        let ids = grouping::normalize_join_ids(&payload.table_ids)?;

        let (group, members) = self.storage.transact(|ctx| -> TableResult<_> {
            let mut members = Vec::with_capacity(ids.len());
            for &id in &ids {
                members.push(ctx.get_table(id)?.ok_or(TableError::NotFound(id))?);
            }

            let group = grouping::join(shared::util::new_id(), &mut members, meta.timestamp)?;
            for table in &members {
                ctx.put_table(table)?;
            }
            ctx.put_group(&group)?;
            Ok((group, members))
        })?;

        tracing::info!(
            group_id = %group.group_id,
            tables = ?group.member_table_ids,
            capacity = group.combined_capacity,
            "Tables joined"
        );
        audit_log!(meta, "table.join", group.group_id, group.combined_name);

        Ok(JoinTablesResponse {
            group_id: group.group_id,
            combined_name: group.combined_name,
            total_capacity: group.combined_capacity,
            primary_table_id: group.primary_table_id,
            tables: members,
        })
    }

    /// Dissolve a whole group, addressed by id or by any of its member tables
    pub fn separate_tables(
        &self,
        payload: &SeparateTablesRequest,
        meta: &CommandMetadata,
    ) -> TableResult<SeparateTablesResponse> {
        let (group_id, tables) = self.storage.transact(|ctx| -> TableResult<_> {
            let group_id = match (&payload.group_id, &payload.table_ids) {
                (Some(group_id), _) => group_id.clone(),
                (None, Some(table_ids)) => {
                    let mut tables = Vec::with_capacity(table_ids.len());
                    for &id in table_ids {
                        tables.push(ctx.get_table(id)?.ok_or(TableError::NotFound(id))?);
                    }
                    grouping::group_of(&tables)?
                }
                (None, None) => {
                    return Err(TableError::InvalidInput(
                        "Either groupId or tableIds is required".to_string(),
                    ));
                }
            };

            let group = ctx
                .get_group(&group_id)?
                .ok_or_else(|| TableError::GroupNotFound(group_id.clone()))?;
            let group_ref = TableRef::Group {
                id: group.group_id.clone(),
            };
            if !ctx.open_orders_for(&group_ref)?.is_empty() {
                return Err(TableError::HasActiveOrders(group.combined_name.clone()));
            }

            let mut tables = Vec::with_capacity(group.member_table_ids.len());
            for &id in &group.member_table_ids {
                // 成员桌台被删除的情况不会发生 (删除要求未拼桌)，缺失时跳过
                let Some(mut table) = ctx.get_table(id)? else {
                    tracing::warn!(table_id = id, group_id = %group.group_id, "Group member missing");
                    continue;
                };
                grouping::release(&mut table, meta.timestamp);
                ctx.put_table(&table)?;
                tables.push(table);
            }
            ctx.remove_group(&group.group_id)?;
            Ok((group.group_id, tables))
        })?;

        tracing::info!(group_id = %group_id, tables = tables.len(), "Tables separated");
        audit_log!(meta, "table.separate", group_id);
        Ok(SeparateTablesResponse { tables })
    }

    // ========== Groups ==========

    pub fn list_groups(&self) -> TableResult<Vec<TableGroup>> {
        Ok(self.storage.list_groups()?)
    }

    pub fn get_group(&self, group_id: &str) -> TableResult<TableGroup> {
        self.storage
            .get_group(group_id)?
            .ok_or_else(|| TableError::GroupNotFound(group_id.to_string()))
    }

    pub fn seat_group(
        &self,
        group_id: &str,
        payload: &SeatRequest,
        meta: &CommandMetadata,
    ) -> TableResult<TableGroup> {
        let group = self.storage.transact(|ctx| -> TableResult<_> {
            let mut group = ctx
                .get_group(group_id)?
                .ok_or_else(|| TableError::GroupNotFound(group_id.to_string()))?;
            check_version(payload.expected_version, group.version)?;
            status::seat_group(&mut group, payload.guest_count, meta.timestamp)?;
            ctx.put_group(&group)?;
            Ok(group)
        })?;

        tracing::info!(group_id = %group_id, guest_count = payload.guest_count, "Group seated");
        audit_log!(meta, "group.seat", group.combined_name, format!("guests={}", payload.guest_count));
        Ok(group)
    }

    pub fn free_group(
        &self,
        group_id: &str,
        payload: &FreeRequest,
        meta: &CommandMetadata,
    ) -> TableResult<TableGroup> {
        let group = self.storage.transact(|ctx| -> TableResult<_> {
            let mut group = ctx
                .get_group(group_id)?
                .ok_or_else(|| TableError::GroupNotFound(group_id.to_string()))?;
            check_version(payload.expected_version, group.version)?;
            let group_ref = TableRef::Group {
                id: group_id.to_string(),
            };
            if !ctx.open_orders_for(&group_ref)?.is_empty() {
                return Err(TableError::HasActiveOrders(group.combined_name.clone()));
            }
            status::free_group(&mut group, meta.timestamp)?;
            ctx.put_group(&group)?;
            Ok(group)
        })?;

        tracing::info!(group_id = %group_id, "Group freed");
        audit_log!(meta, "group.free", group.combined_name);
        Ok(group)
    }
}
