//! 桌台状态转换
//!
//! ```text
//! available ──seat──► occupied ──free──► available
//!     │                  ▲
//!     └──reserve──► reserved ──free──► available
//!                        └──seat──┘
//! ```
//!
//! 拼桌中的桌台不能单独转换，必须先拆桌。Group 只有 available/occupied 两态。

use super::error::{TableError, TableResult};
use chrono::{NaiveDate, NaiveTime};
use shared::models::{GroupStatus, Table, TableGroup, TableStatus};

fn ensure_ungrouped(table: &Table) -> TableResult<()> {
    match &table.group_id {
        Some(group_id) => Err(TableError::AlreadyGrouped {
            number: table.number,
            group_id: group_id.clone(),
        }),
        None => Ok(()),
    }
}

fn ensure_guests(guest_count: u32) -> TableResult<()> {
    if guest_count == 0 {
        return Err(TableError::InvalidInput(
            "guest_count must be positive".to_string(),
        ));
    }
    Ok(())
}

/// Seat guests: available/reserved → occupied
pub fn seat(table: &mut Table, guest_count: u32, now: i64) -> TableResult<()> {
    ensure_guests(guest_count)?;
    ensure_ungrouped(table)?;
    if table.status == TableStatus::Occupied {
        return Err(TableError::InvalidTransition {
            action: "seat",
            target: table.label(),
            status: table.status.to_string(),
        });
    }

    table.status = TableStatus::Occupied;
    table.guest_count = Some(guest_count);
    table.reservation_date = None;
    table.reservation_time = None;
    table.touch(now);
    Ok(())
}

/// Free: occupied/reserved → available
pub fn free(table: &mut Table, now: i64) -> TableResult<()> {
    ensure_ungrouped(table)?;
    if table.status == TableStatus::Available {
        return Err(TableError::InvalidTransition {
            action: "free",
            target: table.label(),
            status: table.status.to_string(),
        });
    }

    table.reset();
    table.touch(now);
    Ok(())
}

/// Reserve: available → reserved
///
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM`.
pub fn reserve(table: &mut Table, date: &str, time: &str, now: i64) -> TableResult<()> {
    let (date, time) = (date.trim(), time.trim());
    if date.is_empty() || time.is_empty() {
        return Err(TableError::MissingReservationDetails);
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| TableError::InvalidInput(format!("Invalid reservation date: {date}")))?;
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| TableError::InvalidInput(format!("Invalid reservation time: {time}")))?;

    ensure_ungrouped(table)?;
    if table.status != TableStatus::Available {
        return Err(TableError::InvalidTransition {
            action: "reserve",
            target: table.label(),
            status: table.status.to_string(),
        });
    }

    table.status = TableStatus::Reserved;
    table.reservation_date = Some(date.to_string());
    table.reservation_time = Some(time.to_string());
    table.touch(now);
    Ok(())
}

/// Seat guests at a group: available → occupied
pub fn seat_group(group: &mut TableGroup, guest_count: u32, now: i64) -> TableResult<()> {
    ensure_guests(guest_count)?;
    if group.status != GroupStatus::Available {
        return Err(TableError::InvalidTransition {
            action: "seat",
            target: group.combined_name.clone(),
            status: "occupied".to_string(),
        });
    }

    group.status = GroupStatus::Occupied;
    group.guest_count = Some(guest_count);
    group.touch(now);
    Ok(())
}

/// Free a group: occupied → available
pub fn free_group(group: &mut TableGroup, now: i64) -> TableResult<()> {
    if group.status != GroupStatus::Occupied {
        return Err(TableError::InvalidTransition {
            action: "free",
            target: group.combined_name.clone(),
            status: "available".to_string(),
        });
    }

    group.status = GroupStatus::Available;
    group.guest_count = None;
    group.touch(now);
    Ok(())
}
