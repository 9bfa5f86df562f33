//! 桌台错误

use crate::store::{StorageError, VersionConflict};
use shared::error::{AppError, ErrorCode};
use shared::models::TableStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Stale(#[from] VersionConflict),

    #[error("Table not found: {0}")]
    NotFound(u64),

    #[error("Table group not found: {0}")]
    GroupNotFound(String),

    #[error("Table number {0} already exists")]
    NumberExists(u32),

    #[error("{0}")]
    InvalidInput(String),

    #[error("At least two tables are required to join, got {0}")]
    InsufficientTables(usize),

    #[error("Table {number} is {status}, not available")]
    Unavailable { number: u32, status: TableStatus },

    #[error("Table {number} already belongs to group {group_id}")]
    AlreadyGrouped { number: u32, group_id: String },

    #[error("Reservation date and time are required")]
    MissingReservationDetails,

    #[error("Cannot {action} {target} while it is {status}")]
    InvalidTransition {
        action: &'static str,
        target: String,
        status: String,
    },

    #[error("Table {0} must be available and ungrouped to delete")]
    NotDeletable(u32),

    #[error("{0} still has open orders")]
    HasActiveOrders(String),
}

pub type TableResult<T> = Result<T, TableError>;

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        let code = match &err {
            TableError::Storage(e) => {
                tracing::error!(error = %e, "Storage error in table command");
                ErrorCode::DatabaseError
            }
            TableError::Stale(conflict) => {
                return AppError::stale_state(conflict.expected, conflict.actual);
            }
            TableError::NotFound(_) => ErrorCode::TableNotFound,
            TableError::GroupNotFound(_) => ErrorCode::TableGroupNotFound,
            TableError::NumberExists(_) => ErrorCode::TableNumberExists,
            TableError::InvalidInput(_) => ErrorCode::ValidationFailed,
            TableError::InsufficientTables(_) => ErrorCode::InsufficientTables,
            TableError::Unavailable { .. } => ErrorCode::TableUnavailable,
            TableError::AlreadyGrouped { .. } => ErrorCode::TableAlreadyGrouped,
            TableError::MissingReservationDetails => ErrorCode::MissingReservationDetails,
            TableError::InvalidTransition { .. } => ErrorCode::InvalidTableTransition,
            TableError::NotDeletable(_) => ErrorCode::TableNotDeletable,
            TableError::HasActiveOrders(_) => ErrorCode::TableHasOrders,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_conflicts_map_to_409() {
        let err: AppError = TableError::AlreadyGrouped {
            number: 2,
            group_id: "g".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::TableAlreadyGrouped);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err: AppError = TableError::Stale(VersionConflict {
            expected: 1,
            actual: 2,
        })
        .into();
        assert_eq!(err.code, ErrorCode::StaleState);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: AppError = TableError::MissingReservationDetails.into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        let err: AppError = TableError::InsufficientTables(1).into();
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
    }
}
