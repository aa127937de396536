//! Concurrent writers against one container

mod common;

use common::{assert_strictly_increasing, Backend, Harness};
use rstest::rstest;
use std::collections::HashSet;
use std::time::Duration;
use taskboard_ordering::{ContainerId, MoveRequest, OrderingError, Placement};

fn board() -> ContainerId {
    ContainerId::board_lists("b1")
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::sqlite(Backend::Sqlite)]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_concurrent_creates_never_collide(#[case] backend: Backend) {
    let h = Harness::slow_locks(backend);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let service = h.service.clone();
        handles.push(tokio::spawn(async move { service.create(&board()).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let listed = h.service.list(&board()).await.unwrap();
    assert_eq!(listed.len(), 32);
    assert_strictly_increasing(&listed);
    let distinct: HashSet<String> = listed.iter().map(|r| r.rank.trimmed().to_string()).collect();
    assert_eq!(distinct.len(), 32);
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::sqlite(Backend::Sqlite)]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn test_concurrent_moves_into_one_container(#[case] backend: Backend) {
    let h = Harness::slow_locks(backend);
    let sources: Vec<ContainerId> = (0..8).map(|i| ContainerId::board_lists(i)).collect();

    let mut movers = Vec::new();
    for source in &sources {
        movers.extend(h.fill(source, 3).await);
    }
    h.fill(&board(), 2).await;

    // Everyone tries to land at the front of the same container
    let mut handles = Vec::new();
    for record in movers {
        let service = h.service.clone();
        handles.push(tokio::spawn(async move {
            let first = service.list(&board()).await?[0].id.clone();
            service
                .move_record(&MoveRequest::new(
                    record.id.clone(),
                    board(),
                    Placement::preceding(first),
                ))
                .await
        }));
    }

    let mut moved = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                assert!(outcome.moved);
                moved += 1;
            }
            // The front changed between reading it and taking the lock
            Err(err @ OrderingError::InvalidPlacement { .. }) => {
                assert!(!err.is_retryable());
            }
            Err(err) => panic!("unexpected error: {}", err),
        }
    }
    assert!(moved >= 1);

    let listed = h.service.list(&board()).await.unwrap();
    assert_eq!(listed.len(), 2 + moved);
    assert_strictly_increasing(&listed);
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::sqlite(Backend::Sqlite)]
#[test_log::test(tokio::test)]
async fn test_move_rejected_while_rebalancing(#[case] backend: Backend) {
    let h = Harness::new(backend);
    let records = h.fill(&board(), 3).await;
    let other = ContainerId::board_lists("b2");
    let outsider = h.service.create(&other).await.unwrap();

    let lease = h.service.locks().acquire_rebalance(&board()).await.unwrap();

    let into = h
        .service
        .move_record(&MoveRequest::new(outsider.id.clone(), board(), Placement::end()))
        .await;
    assert!(matches!(into, Err(OrderingError::RebalanceInProgress { .. })));
    assert!(into.unwrap_err().is_retryable());

    let created = h.service.create(&board()).await;
    assert!(matches!(created, Err(OrderingError::RebalanceInProgress { .. })));

    let second = h.service.rebalance(&board()).await;
    assert!(matches!(second, Err(OrderingError::RebalanceInProgress { .. })));

    // Other containers keep working
    assert!(h.service.create(&other).await.is_ok());

    drop(lease);
    let outcome = h
        .service
        .move_record(&MoveRequest::new(
            outsider.id.clone(),
            board(),
            Placement::following(records[2].id.clone()),
        ))
        .await
        .unwrap();
    assert!(outcome.moved);
}

#[rstest]
#[case::memory(Backend::Memory)]
#[case::sqlite(Backend::Sqlite)]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_rebalance_waits_for_inflight_writer(#[case] backend: Backend) {
    let h = Harness::slow_locks(backend);
    h.fill(&board(), 5).await;

    let writer = h.service.locks().acquire_move(&[&board()]).await.unwrap();
    let service = h.service.clone();
    let rebalance = tokio::spawn(async move { service.rebalance(&board()).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.service.locks().is_rebalancing(&board()).unwrap());
    assert!(!rebalance.is_finished());

    drop(writer);
    let rebalanced = rebalance.await.unwrap().unwrap();
    assert_eq!(rebalanced.len(), 5);
    assert!(!h.service.locks().is_rebalancing(&board()).unwrap());
}
