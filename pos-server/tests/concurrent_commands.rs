//! 并发测试 - 多个终端同时操作同一批桌台
//!
//! redb 串行化写事务，前置条件在事务内重新检查：
//! 重叠的拼桌请求只能有一个成功，同一张桌不会被重复开台。

use pos_server::store::CommandMetadata;
use pos_server::tables::TableError;
use pos_server::{PosStorage, TableManager};
use shared::models::{JoinTablesRequest, SeatRequest, TableCreate, TableStatus};
use std::sync::{Arc, Barrier};
use std::thread;

const TERMINALS: usize = 8;

fn meta(terminal: usize) -> CommandMetadata {
    CommandMetadata::new(format!("terminal-{terminal}"), format!("Waiter {terminal}"))
}

fn setup(numbers: &[u32]) -> (TableManager, Vec<u64>) {
    let manager = TableManager::new(PosStorage::open_in_memory().unwrap());
    let ids = numbers
        .iter()
        .map(|&number| {
            manager
                .create_table(&TableCreate { number, capacity: 4 }, &meta(0))
                .unwrap()
                .id
        })
        .collect();
    (manager, ids)
}

#[test]
fn test_overlapping_joins_exactly_one_wins() {
    let (manager, ids) = setup(&[1, 2, 3, 4]);
    let barrier = Arc::new(Barrier::new(TERMINALS));

    // 每个终端都包含桌台 2，只能有一个拼桌成功
    let handles: Vec<_> = (0..TERMINALS)
        .map(|terminal| {
            let manager = manager.clone();
            let barrier = barrier.clone();
            let shared_table = ids[1];
            let other = ids[[0, 2, 3][terminal % 3]];
            thread::spawn(move || {
                barrier.wait();
                manager.join_tables(
                    &JoinTablesRequest {
                        table_ids: vec![shared_table, other],
                    },
                    &meta(terminal),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(
            matches!(
                err,
                TableError::AlreadyGrouped { .. } | TableError::Unavailable { .. }
            ),
            "unexpected error: {err}"
        );
    }

    let groups = manager.list_groups().unwrap();
    assert_eq!(groups.len(), 1);
    let grouped = manager
        .list_tables()
        .unwrap()
        .into_iter()
        .filter(|t| t.group_id.is_some())
        .count();
    assert_eq!(grouped, 2);
}

#[test]
fn test_concurrent_seat_single_winner() {
    let (manager, ids) = setup(&[7]);
    let table_id = ids[0];
    let barrier = Arc::new(Barrier::new(TERMINALS));

    let handles: Vec<_> = (0..TERMINALS)
        .map(|terminal| {
            let manager = manager.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                manager.seat_table(
                    table_id,
                    &SeatRequest {
                        guest_count: terminal as u32 + 1,
                        expected_version: None,
                    },
                    &meta(terminal),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

    let table = manager.get_table(table_id).unwrap();
    assert_eq!(table.status, TableStatus::Occupied);
    let winner = results.into_iter().find_map(Result::ok).unwrap();
    assert_eq!(table.guest_count, winner.guest_count);
}

#[test]
fn test_stale_version_rejected() {
    let (manager, ids) = setup(&[3]);
    let table = manager.get_table(ids[0]).unwrap();
    let observed = table.version;

    manager
        .seat_table(
            table.id,
            &SeatRequest {
                guest_count: 2,
                expected_version: Some(observed),
            },
            &meta(1),
        )
        .unwrap();

    // 另一终端仍持有旧版本
    let err = manager
        .free_table(
            table.id,
            &shared::models::FreeRequest {
                expected_version: Some(observed),
            },
            &meta(2),
        )
        .unwrap_err();
    assert!(matches!(err, TableError::Stale(_)));
    assert_eq!(manager.get_table(table.id).unwrap().status, TableStatus::Occupied);
}
