//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table status (桌台状态)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Occupied => "occupied",
            TableStatus::Reserved => "reserved",
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical dining table (桌台)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: u64,
    /// Number printed on the table, unique across the floor
    pub number: u32,
    pub capacity: u32,
    pub status: TableStatus,
    /// Present iff status is not available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_time: Option<String>,
    /// Set while the table is a member of a joined group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Bumped on every mutation
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Table {
    pub fn new(id: u64, number: u32, capacity: u32, now: i64) -> Self {
        Self {
            id,
            number,
            capacity,
            status: TableStatus::Available,
            guest_count: None,
            reservation_date: None,
            reservation_time: None,
            group_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.group_id.is_some()
    }

    /// Label shown on tickets and receipts
    pub fn label(&self) -> String {
        format!("Table {}", self.number)
    }

    /// Reset to available, clearing guests and reservation
    pub fn reset(&mut self) {
        self.status = TableStatus::Available;
        self.guest_count = None;
        self.reservation_date = None;
        self.reservation_time = None;
    }

    pub fn touch(&mut self, now: i64) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Create table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCreate {
    pub number: u32,
    pub capacity: u32,
}

/// Seat guests at a table or group
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRequest {
    pub guest_count: u32,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Free a table or group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeRequest {
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Reserve a table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_serializes_camel_case() {
        let mut table = Table::new(3, 7, 4, 1000);
        table.status = TableStatus::Occupied;
        table.guest_count = Some(2);

        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["guestCount"], 2);
        assert_eq!(json["status"], "occupied");
        assert!(json.get("groupId").is_none());
    }

    #[test]
    fn test_reset_clears_guests_and_reservation() {
        let mut table = Table::new(1, 1, 2, 0);
        table.status = TableStatus::Reserved;
        table.guest_count = Some(2);
        table.reservation_date = Some("2026-10-18".into());
        table.reservation_time = Some("19:00".into());

        table.reset();
        assert_eq!(table.status, TableStatus::Available);
        assert!(table.guest_count.is_none());
        assert!(table.reservation_date.is_none());
        assert!(table.reservation_time.is_none());
    }
}
