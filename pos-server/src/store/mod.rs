//! 实体存储 - redb
//!
//! - [`PosStorage`] - 数据库句柄与表操作
//! - [`CommandContext`] - 单个写事务内的实体访问
//! - [`CommandMetadata`] - 操作人与时间戳

mod context;
mod storage;

pub use context::{CommandContext, CommandMetadata, VersionConflict, check_version};
pub use storage::{PosStorage, StorageError, StorageResult};
