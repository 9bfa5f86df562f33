//! Table Group Model (拼桌)

use super::table::Table;
use serde::{Deserialize, Serialize};

/// Group-level status, tracked separately from member tables
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    #[default]
    Available,
    Occupied,
}

/// Logical serving unit made of two or more joined tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableGroup {
    pub group_id: String,
    /// Member table ids, ordered by table number
    pub member_table_ids: Vec<u64>,
    /// Member with the lowest table number
    pub primary_table_id: u64,
    pub combined_capacity: u32,
    /// e.g. "Tables 1 + 3 + 7"
    pub combined_name: String,
    pub status: GroupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_count: Option<u32>,
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TableGroup {
    /// Build a group from its members. Members must already be validated.
    pub fn from_members(group_id: String, members: &[Table], now: i64) -> Self {
        let mut sorted: Vec<&Table> = members.iter().collect();
        sorted.sort_by_key(|t| t.number);

        let numbers: Vec<String> = sorted.iter().map(|t| t.number.to_string()).collect();
        Self {
            group_id,
            member_table_ids: sorted.iter().map(|t| t.id).collect(),
            primary_table_id: sorted.first().map(|t| t.id).unwrap_or_default(),
            combined_capacity: sorted.iter().fold(0u32, |acc, t| acc.saturating_add(t.capacity)),
            combined_name: format!("Tables {}", numbers.join(" + ")),
            status: GroupStatus::Available,
            guest_count: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self, now: i64) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Join tables payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTablesRequest {
    pub table_ids: Vec<u64>,
}

/// Separate tables payload (either a group id or member table ids)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparateTablesRequest {
    #[serde(default)]
    pub table_ids: Option<Vec<u64>>,
    #[serde(default)]
    pub group_id: Option<String>,
}

/// Result of a successful join
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinTablesResponse {
    pub group_id: String,
    pub combined_name: String,
    pub total_capacity: u32,
    pub primary_table_id: u64,
    pub tables: Vec<Table>,
}

/// Result of a successful separation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparateTablesResponse {
    pub tables: Vec<Table>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_derives_from_members() {
        let members = vec![
            Table::new(9, 9, 6, 0),
            Table::new(2, 2, 4, 0),
            Table::new(5, 5, 4, 0),
        ];
        let group = TableGroup::from_members("g1".into(), &members, 10);

        assert_eq!(group.member_table_ids, vec![2, 5, 9]);
        assert_eq!(group.primary_table_id, 2);
        assert_eq!(group.combined_capacity, 14);
        assert_eq!(group.combined_name, "Tables 2 + 5 + 9");
        assert_eq!(group.status, GroupStatus::Available);
    }
}
