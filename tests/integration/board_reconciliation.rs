//! Integration tests for board reconciliation.
//!
//! Drives `BoardState`, `DragSession`, `OptimisticMutator`, and `BoardView`
//! together against an in-memory store: optimistic moves, rollback on
//! failure or timeout, same-column reorders, and search filtering.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::similar_names,
    clippy::redundant_clone
)]

use std::time::Duration;

use eventboard::board::{
    ApplyOutcome, Board, BoardState, BoardView, ColumnIndex, CommitOutcome, DragSession, Move,
    OptimisticMutator, SettleOutcome, TargetId,
};
use eventboard::remote::StoreError;
use eventboard::remote::memory::MemoryStore;
use eventboard_proto::record::{Record, RecordId, WorkflowStatus};

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

const TIMEOUT: Duration = Duration::from_secs(5);

fn rid(id: u64) -> RecordId {
    RecordId::new(id)
}

fn ids(board: &BoardState, status: WorkflowStatus) -> Vec<u64> {
    board.column(status).iter().map(|r| r.id.get()).collect()
}

/// Pending [1, 7, 2], In Progress [3], Completed [5, 6, 4].
fn sample_records() -> Vec<Record> {
    vec![
        Record::new(1, "Marketing Conference", WorkflowStatus::Pending).with_organizer("Maria Silva"),
        Record::new(7, "Supplier Onboarding Day", WorkflowStatus::Pending)
            .with_organizer("Carlos Lima"),
        Record::new(2, "Advanced React Training", WorkflowStatus::Pending)
            .with_organizer("Pedro Costa"),
        Record::new(3, "Leadership Workshop", WorkflowStatus::InProgress)
            .with_organizer("Ana Oliveira"),
        Record::new(5, "Sales Kickoff", WorkflowStatus::Completed).with_organizer("Rafael Souza"),
        Record::new(6, "Quarterly Review", WorkflowStatus::Completed).with_organizer("Juliana Reis"),
        Record::new(4, "Product Launch", WorkflowStatus::Completed).with_organizer("Bruno Alves"),
    ]
}

fn sample_board() -> BoardState {
    BoardState::from_records(sample_records())
}

fn move_to(id: u64, from: WorkflowStatus, to: WorkflowStatus) -> Move {
    Move {
        record_id: rid(id),
        from,
        to,
        insert_before: None,
    }
}

// ---------------------------------------------------------------------------
// Optimistic move, success and rollback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_move_stays_applied() {
    let store = MemoryStore::new(sample_records());
    let mut board = sample_board();
    let mut mutator = OptimisticMutator::new();

    let outcome = mutator
        .commit(
            &mut board,
            &move_to(7, WorkflowStatus::Pending, WorkflowStatus::InProgress),
            &store,
            TIMEOUT,
        )
        .await;

    assert_eq!(outcome, CommitOutcome::Settled(SettleOutcome::Confirmed));
    assert!(!ids(&board, WorkflowStatus::Pending).contains(&7));
    assert!(ids(&board, WorkflowStatus::InProgress).contains(&7));
    assert_eq!(
        board.get(rid(7)).map(|r| r.status),
        Some(WorkflowStatus::InProgress)
    );
    assert_eq!(store.status_of(rid(7)), Some(WorkflowStatus::InProgress));
    assert_eq!(mutator.in_flight_count(), 0);
    assert!(board.is_consistent());
}

#[tokio::test]
async fn failed_move_is_rolled_back_to_original_index() {
    let store = MemoryStore::new(sample_records());
    store.set_fail_updates(true);
    let mut board = sample_board();
    let before = board.clone();
    let mut mutator = OptimisticMutator::new();

    let outcome = mutator
        .commit(
            &mut board,
            &move_to(7, WorkflowStatus::Pending, WorkflowStatus::InProgress),
            &store,
            TIMEOUT,
        )
        .await;

    assert!(matches!(
        outcome,
        CommitOutcome::Settled(SettleOutcome::Compensated {
            restored_index: 1,
            ..
        })
    ));
    assert_eq!(ids(&board, WorkflowStatus::Pending), vec![1, 7, 2]);
    assert!(!ids(&board, WorkflowStatus::InProgress).contains(&7));
    assert_eq!(board, before);
    assert_eq!(store.status_of(rid(7)), Some(WorkflowStatus::Pending));
}

#[tokio::test]
async fn board_shows_move_before_store_answers() {
    let store = MemoryStore::new(sample_records());
    store.set_fail_updates(true);
    let mut board = sample_board();
    let mut mutator = OptimisticMutator::new();

    let ApplyOutcome::Pending(ticket) = mutator.apply(
        &mut board,
        &move_to(2, WorkflowStatus::Pending, WorkflowStatus::Completed),
    ) else {
        panic!("expected a pending ticket");
    };

    // Applied before persistence is even attempted.
    assert_eq!(ids(&board, WorkflowStatus::Completed), vec![5, 6, 4, 2]);
    assert!(mutator.is_in_flight(rid(2)));

    let result = OptimisticMutator::persist(&store, &ticket, TIMEOUT).await;
    assert!(matches!(result, Err(StoreError::Rejected(_))));
    mutator.settle(&mut board, &ticket, result);

    assert_eq!(ids(&board, WorkflowStatus::Pending), vec![1, 7, 2]);
    assert_eq!(ids(&board, WorkflowStatus::Completed), vec![5, 6, 4]);
}

#[tokio::test]
async fn timeout_counts_as_failure() {
    let store = MemoryStore::new(sample_records());
    store.set_latency(Duration::from_millis(300));
    let mut board = sample_board();
    let before = board.clone();
    let mut mutator = OptimisticMutator::new();

    let outcome = mutator
        .commit(
            &mut board,
            &move_to(3, WorkflowStatus::InProgress, WorkflowStatus::Completed),
            &store,
            Duration::from_millis(20),
        )
        .await;

    assert_eq!(
        outcome,
        CommitOutcome::Settled(SettleOutcome::Compensated {
            error: StoreError::Timeout,
            restored_index: 0,
        })
    );
    assert_eq!(board, before);
}

#[tokio::test]
async fn rollback_preserves_order_of_other_records() {
    let mut board = sample_board();
    let mut mutator = OptimisticMutator::new();

    let ApplyOutcome::Pending(ticket) = mutator.apply(
        &mut board,
        &Move {
            record_id: rid(7),
            from: WorkflowStatus::Pending,
            to: WorkflowStatus::Completed,
            insert_before: Some(rid(6)),
        },
    ) else {
        panic!("expected a pending ticket");
    };
    assert_eq!(ids(&board, WorkflowStatus::Completed), vec![5, 7, 6, 4]);

    // Meanwhile the user reorders the destination column.
    mutator.apply(
        &mut board,
        &Move {
            record_id: rid(4),
            from: WorkflowStatus::Completed,
            to: WorkflowStatus::Completed,
            insert_before: Some(rid(5)),
        },
    );
    assert_eq!(ids(&board, WorkflowStatus::Completed), vec![4, 5, 7, 6]);

    mutator.settle(&mut board, &ticket, Err(StoreError::ConnectionClosed));
    assert_eq!(ids(&board, WorkflowStatus::Completed), vec![4, 5, 6]);
    assert_eq!(ids(&board, WorkflowStatus::Pending), vec![1, 7, 2]);
    assert!(board.is_consistent());
}

// ---------------------------------------------------------------------------
// Same-column reorder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_updates_order_without_store_call() {
    let store = MemoryStore::new(sample_records());
    let mut board = sample_board();
    let mut mutator = OptimisticMutator::new();
    assert_eq!(board.position(rid(4)), Some((WorkflowStatus::Completed, 2)));

    let outcome = mutator
        .commit(
            &mut board,
            &Move {
                record_id: rid(4),
                from: WorkflowStatus::Completed,
                to: WorkflowStatus::Completed,
                insert_before: Some(rid(5)),
            },
            &store,
            TIMEOUT,
        )
        .await;

    assert_eq!(outcome, CommitOutcome::Reordered);
    assert_eq!(ids(&board, WorkflowStatus::Completed), vec![4, 5, 6]);
    assert_eq!(store.update_calls(), 0);
}

// ---------------------------------------------------------------------------
// Drag gesture through to the board
// ---------------------------------------------------------------------------

#[test]
fn gesture_onto_empty_column_uses_column_target() {
    let mut board = Board::new(BoardState::from_records(vec![
        Record::new(1, "only", WorkflowStatus::Pending),
    ]));

    assert!(board.start_drag(rid(1)));
    board.hover(Some(TargetId::Column(WorkflowStatus::Completed)));
    assert_eq!(
        board.session().hover_column(),
        Some(WorkflowStatus::Completed)
    );

    let outcome = board.drop_on(Some(TargetId::Column(WorkflowStatus::Completed)));
    assert!(matches!(outcome, ApplyOutcome::Pending(_)));
    assert_eq!(ids(board.state(), WorkflowStatus::Completed), vec![1]);
    assert!(board.state().column(WorkflowStatus::Pending).is_empty());
}

#[test]
fn cancelled_gesture_changes_nothing() {
    let mut board = Board::new(sample_board());
    let before = board.state().clone();

    assert!(board.start_drag(rid(3)));
    board.hover(Some(TargetId::Record(rid(1))));
    assert_eq!(board.drop_on(None), ApplyOutcome::Unchanged);
    assert_eq!(board.state(), &before);
    assert_eq!(board.in_flight_count(), 0);
}

#[test]
fn drop_resolves_source_from_board() {
    let board = sample_board();
    let mut session = DragSession::new();
    session.start(rid(3), &board);
    let mv = session
        .drop(Some(TargetId::Record(rid(4))), &board)
        .unwrap();
    assert_eq!(mv.from, WorkflowStatus::InProgress);
    assert_eq!(mv.to, WorkflowStatus::Completed);
    assert_eq!(mv.insert_before, Some(rid(4)));
}

#[test]
fn applying_same_move_twice_does_not_duplicate() {
    let mut board = sample_board();
    let mut mutator = OptimisticMutator::new();
    let mv = move_to(1, WorkflowStatus::Pending, WorkflowStatus::InProgress);

    assert!(matches!(mutator.apply(&mut board, &mv), ApplyOutcome::Pending(_)));
    assert_eq!(mutator.apply(&mut board, &mv), ApplyOutcome::Unchanged);
    assert_eq!(ids(&board, WorkflowStatus::InProgress), vec![3, 1]);
    assert_eq!(board.len(), 7);
    assert!(board.is_consistent());
}

#[test]
fn unknown_record_move_is_ignored() {
    let mut board = sample_board();
    let before = board.clone();
    let mut mutator = OptimisticMutator::new();
    let outcome = mutator.apply(
        &mut board,
        &move_to(99, WorkflowStatus::Pending, WorkflowStatus::Completed),
    );
    assert_eq!(outcome, ApplyOutcome::Unchanged);
    assert_eq!(board, before);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_finds_single_organizer_match() {
    let board = sample_board();
    let view = BoardView::project(&board, "maria");

    assert_eq!(view.ids(WorkflowStatus::Pending), vec![rid(1)]);
    assert_eq!(view.count(WorkflowStatus::Pending), 1);
    assert_eq!(view.count(WorkflowStatus::InProgress), 0);
    assert_eq!(view.count(WorkflowStatus::Completed), 0);
    assert_eq!(view.total(), 1);
    // Filtering never touches the board.
    assert_eq!(board.len(), 7);
}

#[test]
fn search_follows_record_after_move() {
    let mut board = sample_board();
    let mut mutator = OptimisticMutator::new();
    mutator.apply(
        &mut board,
        &move_to(1, WorkflowStatus::Pending, WorkflowStatus::Completed),
    );
    let view = BoardView::project(&board, "MARIA");
    assert_eq!(view.count(WorkflowStatus::Pending), 0);
    assert_eq!(view.ids(WorkflowStatus::Completed), vec![rid(1)]);
}

#[test]
fn demo_seed_has_one_maria_match() {
    let board = BoardState::from_records(eventboard_proto::seed::demo_records());
    assert_eq!(BoardView::project(&board, "maria").total(), 1);
}
