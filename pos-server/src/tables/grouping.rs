//! 拼桌 / 拆桌规则
//!
//! 拼桌是全有或全无的：任何一张桌子不满足条件，整个命令被拒绝。
//! 拆桌总是解散整个 group。

use super::error::{TableError, TableResult};
use shared::models::{Table, TableGroup, TableStatus};

/// Deduplicate and count join candidates
pub fn normalize_join_ids(table_ids: &[u64]) -> TableResult<Vec<u64>> {
    let mut ids = table_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() < 2 {
        return Err(TableError::InsufficientTables(ids.len()));
    }
    Ok(ids)
}

/// A table may join a new group only while ungrouped and available
pub fn ensure_joinable(table: &Table) -> TableResult<()> {
    if let Some(group_id) = &table.group_id {
        return Err(TableError::AlreadyGrouped {
            number: table.number,
            group_id: group_id.clone(),
        });
    }
    if table.status != TableStatus::Available {
        return Err(TableError::Unavailable {
            number: table.number,
            status: table.status,
        });
    }
    Ok(())
}

/// Build the group and attach every member to it
///
/// Members keep their own status (available); the group carries its own.
pub fn join(group_id: String, members: &mut [Table], now: i64) -> TableResult<TableGroup> {
    if members.len() < 2 {
        return Err(TableError::InsufficientTables(members.len()));
    }
    for table in members.iter() {
        ensure_joinable(table)?;
    }
    members
        .iter()
        .try_fold(0u32, |acc, t| acc.checked_add(t.capacity))
        .ok_or_else(|| TableError::InvalidInput("combined capacity overflows".to_string()))?;

    let group = TableGroup::from_members(group_id, members, now);
    for table in members.iter_mut() {
        table.group_id = Some(group.group_id.clone());
        table.touch(now);
    }
    members.sort_by_key(|t| t.number);
    Ok(group)
}

/// Find the single group a set of member tables belongs to
pub fn group_of(tables: &[Table]) -> TableResult<String> {
    let mut group_id: Option<&str> = None;
    for table in tables {
        let Some(id) = table.group_id.as_deref() else {
            return Err(TableError::GroupNotFound(format!(
                "table {} is not grouped",
                table.number
            )));
        };
        match group_id {
            None => group_id = Some(id),
            Some(existing) if existing != id => {
                return Err(TableError::InvalidInput(
                    "Tables belong to different groups".to_string(),
                ));
            }
            Some(_) => {}
        }
    }
    group_id
        .map(str::to_string)
        .ok_or_else(|| TableError::InvalidInput("tableIds must not be empty".to_string()))
}

/// Detach a member and restore it to a clean available state
pub fn release(table: &mut Table, now: i64) {
    table.reset();
    table.group_id = None;
    table.touch(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Vec<Table> {
        vec![
            Table::new(9, 9, 6, 0),
            Table::new(2, 2, 4, 0),
            Table::new(5, 5, 4, 0),
        ]
    }

    #[test]
    fn test_normalize_join_ids() {
        assert_eq!(normalize_join_ids(&[5, 2, 5, 9]).unwrap(), vec![2, 5, 9]);
        assert!(matches!(
            normalize_join_ids(&[3, 3]),
            Err(TableError::InsufficientTables(1))
        ));
        assert!(matches!(
            normalize_join_ids(&[]),
            Err(TableError::InsufficientTables(0))
        ));
    }

    #[test]
    fn test_join_three_tables() {
        let mut members = tables();
        let group = join("g1".into(), &mut members, 100).unwrap();

        assert_eq!(group.combined_capacity, 14);
        assert_eq!(group.primary_table_id, 2);
        assert_eq!(group.combined_name, "Tables 2 + 5 + 9");
        assert_eq!(
            members.iter().map(|t| t.number).collect::<Vec<_>>(),
            vec![2, 5, 9]
        );
        for t in &members {
            assert_eq!(t.group_id.as_deref(), Some("g1"));
            assert_eq!(t.status, TableStatus::Available);
            assert_eq!(t.version, 1);
        }
    }

    #[test]
    fn test_join_is_all_or_nothing() {
        let mut members = tables();
        members[2].status = TableStatus::Occupied;
        members[2].guest_count = Some(2);

        let err = join("g1".into(), &mut members, 100).unwrap_err();
        assert!(matches!(err, TableError::Unavailable { number: 5, .. }));
        assert!(members.iter().all(|t| t.group_id.is_none() && t.version == 0));
    }

    #[test]
    fn test_join_rejects_capacity_overflow() {
        let mut members = vec![Table::new(1, 1, u32::MAX, 0), Table::new(2, 2, 2, 0)];
        let err = join("g1".into(), &mut members, 1).unwrap_err();
        assert!(matches!(err, TableError::InvalidInput(_)));
        assert!(members.iter().all(|t| t.group_id.is_none() && t.version == 0));
    }

    #[test]
    fn test_grouped_table_cannot_join_again() {
        let mut members = tables();
        members[0].group_id = Some("other".to_string());
        assert!(matches!(
            join("g1".into(), &mut members, 1),
            Err(TableError::AlreadyGrouped { number: 9, .. })
        ));
    }

    #[test]
    fn test_group_of() {
        let mut members = tables();
        join("g1".into(), &mut members, 1).unwrap();
        assert_eq!(group_of(&members[..2]).unwrap(), "g1");

        members[1].group_id = Some("g2".to_string());
        assert!(matches!(group_of(&members), Err(TableError::InvalidInput(_))));

        let loose = vec![Table::new(1, 1, 2, 0)];
        assert!(matches!(group_of(&loose), Err(TableError::GroupNotFound(_))));
    }

    #[test]
    fn test_release_clears_membership() {
        let mut t = Table::new(1, 1, 2, 0);
        t.group_id = Some("g".to_string());
        release(&mut t, 5);
        assert!(t.group_id.is_none());
        assert_eq!(t.status, TableStatus::Available);
        assert!(t.guest_count.is_none());
    }
}
