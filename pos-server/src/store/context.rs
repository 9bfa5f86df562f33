//! Command context - entity access within one write transaction
//!
//! Engines open a [`redb::WriteTransaction`], wrap it in a [`CommandContext`],
//! re-check their preconditions through it and commit only when the whole
//! command succeeded. Dropping the transaction discards every write.

use super::storage::{
    GROUPS_TABLE, ORDERS_TABLE, PROCESSED_COMMANDS_TABLE, PosStorage, RECEIPTS_BY_ORDER_TABLE,
    RECEIPTS_TABLE, SEQUENCE_TABLE, StorageError, StorageResult, TABLE_NUMBERS_TABLE, TABLES_TABLE,
};
use redb::{ReadableTable, WriteTransaction};
use shared::models::{Order, Receipt, Table, TableGroup, TableRef};

/// Who performs a command, and when
///
/// Every mutating command carries one; it ends up in audit logs and in
/// `created_by` / `status_history` fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    pub operator_id: String,
    pub operator_name: String,
    pub timestamp: i64,
}

impl CommandMetadata {
    pub fn new(operator_id: impl Into<String>, operator_name: impl Into<String>) -> Self {
        Self {
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            timestamp: shared::util::now_millis(),
        }
    }

    /// Same operator, explicit timestamp
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Entity version differs from what the client last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("stale state: expected version {expected}, found {actual}")]
pub struct VersionConflict {
    pub expected: u64,
    pub actual: u64,
}

/// Optimistic concurrency check; `None` means the client did not ask for one
pub fn check_version(expected: Option<u64>, actual: u64) -> Result<(), VersionConflict> {
    match expected {
        Some(expected) if expected != actual => Err(VersionConflict { expected, actual }),
        _ => Ok(()),
    }
}

impl PosStorage {
    /// Run `f` inside one write transaction, committing only when it succeeds
    pub fn transact<T, E>(&self, f: impl FnOnce(&CommandContext<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let txn = self.begin_write()?;
        let value = {
            let ctx = CommandContext::new(&txn, self);
            f(&ctx)?
        };
        txn.commit().map_err(StorageError::from)?;
        Ok(value)
    }
}

/// Transaction-scoped view over [`PosStorage`]
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a PosStorage,
}

impl<'a> CommandContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a PosStorage) -> Self {
        Self { txn, storage }
    }

    pub fn storage(&self) -> &PosStorage {
        self.storage
    }

    // ========== Tables ==========

    pub fn get_table(&self, id: u64) -> StorageResult<Option<Table>> {
        let table = self.txn.open_table(TABLES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn table_id_by_number(&self, number: u32) -> StorageResult<Option<u64>> {
        let index = self.txn.open_table(TABLE_NUMBERS_TABLE)?;
        Ok(index.get(number)?.map(|g| g.value()))
    }

    pub fn get_table_by_number(&self, number: u32) -> StorageResult<Option<Table>> {
        match self.table_id_by_number(number)? {
            Some(id) => self.get_table(id),
            None => Ok(None),
        }
    }

    /// Insert or update a table and its number index
    pub fn put_table(&self, t: &Table) -> StorageResult<()> {
        let bytes = serde_json::to_vec(t)?;
        {
            let mut table = self.txn.open_table(TABLES_TABLE)?;
            table.insert(t.id, bytes.as_slice())?;
        }
        let mut index = self.txn.open_table(TABLE_NUMBERS_TABLE)?;
        index.insert(t.number, t.id)?;
        Ok(())
    }

    pub fn remove_table(&self, t: &Table) -> StorageResult<()> {
        {
            let mut table = self.txn.open_table(TABLES_TABLE)?;
            table.remove(t.id)?;
        }
        let mut index = self.txn.open_table(TABLE_NUMBERS_TABLE)?;
        index.remove(t.number)?;
        Ok(())
    }

    // ========== Groups ==========

    pub fn get_group(&self, group_id: &str) -> StorageResult<Option<TableGroup>> {
        let table = self.txn.open_table(GROUPS_TABLE)?;
        match table.get(group_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_group(&self, group: &TableGroup) -> StorageResult<()> {
        let bytes = serde_json::to_vec(group)?;
        let mut table = self.txn.open_table(GROUPS_TABLE)?;
        table.insert(group.group_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    pub fn remove_group(&self, group_id: &str) -> StorageResult<()> {
        let mut table = self.txn.open_table(GROUPS_TABLE)?;
        table.remove(group_id)?;
        Ok(())
    }

    // ========== Orders ==========

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let table = self.txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn put_order(&self, order: &Order) -> StorageResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let mut table = self.txn.open_table(ORDERS_TABLE)?;
        table.insert(order.order_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Non-terminal orders seated at the given table or group
    pub fn open_orders_for(&self, table_ref: &TableRef) -> StorageResult<Vec<Order>> {
        let table = self.txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if order.is_open() && &order.table_ref == table_ref {
                orders.push(order);
            }
        }
        Ok(orders)
    }

    // ========== Receipts ==========

    pub fn get_receipt(&self, receipt_id: &str) -> StorageResult<Option<Receipt>> {
        let table = self.txn.open_table(RECEIPTS_TABLE)?;
        match table.get(receipt_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn receipt_id_for_order(&self, order_id: &str) -> StorageResult<Option<String>> {
        let index = self.txn.open_table(RECEIPTS_BY_ORDER_TABLE)?;
        Ok(index.get(order_id)?.map(|g| g.value().to_string()))
    }

    /// Insert or update a receipt and its order index
    pub fn put_receipt(&self, receipt: &Receipt) -> StorageResult<()> {
        let bytes = serde_json::to_vec(receipt)?;
        {
            let mut table = self.txn.open_table(RECEIPTS_TABLE)?;
            table.insert(receipt.receipt_id.as_str(), bytes.as_slice())?;
        }
        let mut index = self.txn.open_table(RECEIPTS_BY_ORDER_TABLE)?;
        index.insert(receipt.order_id.as_str(), receipt.receipt_id.as_str())?;
        Ok(())
    }

    // ========== Counters & idempotency ==========

    /// Increment a named counter and return the new value (first call → 1)
    pub fn next_counter(&self, name: &str) -> StorageResult<u64> {
        let mut table = self.txn.open_table(SEQUENCE_TABLE)?;
        let current = table.get(name)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(name, next)?;
        Ok(next)
    }

    /// Order id recorded for an idempotency key, if the command already ran
    pub fn processed_command(&self, key: &str) -> StorageResult<Option<String>> {
        let table = self.txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(key)?.map(|g| g.value().to_string()))
    }

    pub fn mark_command_processed(&self, key: &str, order_id: &str) -> StorageResult<()> {
        let mut table = self.txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(key, order_id)?;
        Ok(())
    }
}
