//! redb-based entity store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `tables` | `table_id` | `Table` | Physical tables |
//! | `table_numbers` | `number` | `table_id` | Number uniqueness index |
//! | `table_groups` | `group_id` | `TableGroup` | Joined tables |
//! | `orders` | `order_id` | `Order` | Orders |
//! | `receipts` | `receipt_id` | `Receipt` | Receipts |
//! | `receipts_by_order` | `order_id` | `receipt_id` | One receipt per order |
//! | `processed_commands` | `idempotency_key` | `order_id` | Idempotency check |
//! | `sequence_counter` | name | `u64` | Table ids, receipt numbers |
//!
//! Values are JSON. Every mutating command runs inside exactly one write
//! transaction; redb allows a single writer at a time, so preconditions read
//! inside the transaction cannot change before commit.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use serde::de::DeserializeOwned;
use shared::models::{Order, Receipt, Table, TableGroup};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

pub(super) const TABLES_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("tables");

pub(super) const TABLE_NUMBERS_TABLE: TableDefinition<u32, u64> =
    TableDefinition::new("table_numbers");

pub(super) const GROUPS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("table_groups");

pub(super) const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

pub(super) const RECEIPTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("receipts");

pub(super) const RECEIPTS_BY_ORDER_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("receipts_by_order");

pub(super) const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("processed_commands");

pub(super) const SEQUENCE_TABLE: TableDefinition<&str, u64> =
    TableDefinition::new("sequence_counter");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        tracing::error!(error = %err, "Storage error occurred");
        shared::error::AppError::database(err.to_string())
    }
}

/// Entity storage backed by redb
#[derive(Clone)]
pub struct PosStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for PosStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosStorage").finish_non_exhaustive()
    }
}

impl PosStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable as soon as `commit()` returns.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        // Create all tables if they don't exist
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(TABLES_TABLE)?;
            let _ = write_txn.open_table(TABLE_NUMBERS_TABLE)?;
            let _ = write_txn.open_table(GROUPS_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(RECEIPTS_TABLE)?;
            let _ = write_txn.open_table(RECEIPTS_BY_ORDER_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
            let _ = write_txn.open_table(SEQUENCE_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Begin a write transaction
    ///
    /// Blocks while another writer is active.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Reads (snapshot isolation) ==========

    pub fn get_table(&self, id: u64) -> StorageResult<Option<Table>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All tables, ordered by table number
    pub fn list_tables(&self) -> StorageResult<Vec<Table>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLES_TABLE)?;
        let mut tables: Vec<Table> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            tables.push(serde_json::from_slice(value.value())?);
        }
        tables.sort_by_key(|t| t.number);
        Ok(tables)
    }

    pub fn get_group(&self, group_id: &str) -> StorageResult<Option<TableGroup>> {
        self.get_json(GROUPS_TABLE, group_id)
    }

    pub fn list_groups(&self) -> StorageResult<Vec<TableGroup>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(GROUPS_TABLE)?;
        let mut groups: Vec<TableGroup> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            groups.push(serde_json::from_slice(value.value())?);
        }
        groups.sort_by_key(|g| g.created_at);
        Ok(groups)
    }

    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        self.get_json(ORDERS_TABLE, order_id)
    }

    /// All orders, oldest first
    pub fn list_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders: Vec<Order> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    pub fn get_receipt(&self, receipt_id: &str) -> StorageResult<Option<Receipt>> {
        self.get_json(RECEIPTS_TABLE, receipt_id)
    }

    pub fn get_receipt_by_order(&self, order_id: &str) -> StorageResult<Option<Receipt>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(RECEIPTS_BY_ORDER_TABLE)?;
        let Some(receipt_id) = index.get(order_id)?.map(|g| g.value().to_string()) else {
            return Ok(None);
        };
        let table = read_txn.open_table(RECEIPTS_TABLE)?;
        match table.get(receipt_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All receipts, oldest first
    pub fn list_receipts(&self) -> StorageResult<Vec<Receipt>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(RECEIPTS_TABLE)?;
        let mut receipts: Vec<Receipt> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            receipts.push(serde_json::from_slice(value.value())?);
        }
        receipts.sort_by_key(|r| r.created_at);
        Ok(receipts)
    }

    /// Get current value of a named counter (without incrementing)
    pub fn get_counter(&self, name: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCE_TABLE)?;
        Ok(table.get(name)?.map(|g| g.value()).unwrap_or(0))
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        def: TableDefinition<'static, &'static str, &'static [u8]>,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        match table.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CommandContext;

    #[test]
    fn test_open_on_disk_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.redb");

        {
            let storage = PosStorage::open(&path).unwrap();
            let txn = storage.begin_write().unwrap();
            let ctx = CommandContext::new(&txn, &storage);
            let id = ctx.next_counter("table_id").unwrap();
            ctx.put_table(&Table::new(id, 4, 2, 0)).unwrap();
            txn.commit().unwrap();
        }

        let storage = PosStorage::open(&path).unwrap();
        let tables = storage.list_tables().unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].number, 4);
        assert_eq!(storage.get_counter("table_id").unwrap(), 1);
    }

    #[test]
    fn test_uncommitted_transaction_is_discarded() {
        let storage = PosStorage::open_in_memory().unwrap();
        {
            let txn = storage.begin_write().unwrap();
            let ctx = CommandContext::new(&txn, &storage);
            ctx.put_table(&Table::new(1, 1, 4, 0)).unwrap();
            // dropped without commit
        }
        assert!(storage.get_table(1).unwrap().is_none());
        assert!(storage.list_tables().unwrap().is_empty());
    }
}
