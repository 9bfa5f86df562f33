//! Data models
//!
//! Shared between pos-server and terminals (via API).
//! Entities are stored as JSON in redb and sent over the wire in camelCase.

pub mod order;
pub mod receipt;
pub mod report;
pub mod table;
pub mod table_group;

// Re-exports
pub use order::*;
pub use receipt::*;
pub use report::*;
pub use table::*;
pub use table_group::*;
