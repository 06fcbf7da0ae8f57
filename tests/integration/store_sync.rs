//! Integration tests for store synchronization.
//!
//! Runs the record store server in-process and drives it through
//! `WsStore`, the sync worker, and the `App` event handling, the same path
//! the TUI uses.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eventboard::app::{App, DEFAULT_NOTICE_TTL, LoadState, NoticeLevel};
use eventboard::board::{BoardState, CommitOutcome, Move, OptimisticMutator, SettleOutcome};
use eventboard::remote::ws::{DEFAULT_CONNECT_TIMEOUT, WsStore};
use eventboard::remote::{RecordStore, StoreError};
use eventboard::sync::{SyncCommand, SyncConfig, SyncEvent, spawn_sync};
use eventboard_proto::record::{RecordId, WorkflowStatus};
use eventboard_store::records::RecordTable;
use eventboard_store::server::{StoreState, UpdatePolicy, start_server_with_state};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Start a store server with the demo records and the given policy.
async fn start_store(policy: UpdatePolicy) -> (String, Arc<StoreState>) {
    let state = Arc::new(StoreState::with_policy(
        RecordTable::new(eventboard_proto::seed::demo_records()),
        policy,
    ));
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::clone(&state))
        .await
        .expect("failed to start test store");
    (format!("ws://{addr}/ws"), state)
}

fn rejecting() -> UpdatePolicy {
    UpdatePolicy {
        reject_rate: 1.0,
        latency: Duration::ZERO,
    }
}

async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for sync event")
        .expect("sync worker exited")
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ids(app: &App, status: WorkflowStatus) -> Vec<u64> {
    app.board
        .state()
        .column(status)
        .iter()
        .map(|r| r.id.get())
        .collect()
}

// ---------------------------------------------------------------------------
// WsStore + mutator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn committed_move_reaches_remote_store() {
    let (url, state) = start_store(UpdatePolicy::default()).await;
    let store = WsStore::connect(&url, DEFAULT_CONNECT_TIMEOUT).await.unwrap();
    let mut board = BoardState::from_records(store.fetch_records().await.unwrap());
    let mut mutator = OptimisticMutator::new();

    let outcome = mutator
        .commit(
            &mut board,
            &Move {
                record_id: RecordId::new(7),
                from: WorkflowStatus::Pending,
                to: WorkflowStatus::InProgress,
                insert_before: None,
            },
            &store,
            Duration::from_secs(5),
        )
        .await;

    assert_eq!(outcome, CommitOutcome::Settled(SettleOutcome::Confirmed));
    assert_eq!(
        state.records.status_of(RecordId::new(7)).await,
        Some(WorkflowStatus::InProgress)
    );
}

#[tokio::test]
async fn rejected_move_rolls_back_and_store_is_unchanged() {
    let (url, state) = start_store(rejecting()).await;
    let store = WsStore::new(&url, DEFAULT_CONNECT_TIMEOUT);
    let mut board = BoardState::from_records(store.fetch_records().await.unwrap());
    let before = board.clone();
    let mut mutator = OptimisticMutator::new();

    let outcome = mutator
        .commit(
            &mut board,
            &Move {
                record_id: RecordId::new(1),
                from: WorkflowStatus::Pending,
                to: WorkflowStatus::Completed,
                insert_before: None,
            },
            &store,
            Duration::from_secs(5),
        )
        .await;

    assert!(matches!(
        outcome,
        CommitOutcome::Settled(SettleOutcome::Compensated {
            error: StoreError::Rejected(_),
            ..
        })
    ));
    assert_eq!(board, before);
    assert_eq!(
        state.records.status_of(RecordId::new(1)).await,
        Some(WorkflowStatus::Pending)
    );
}

#[tokio::test]
async fn slow_store_times_out_and_ends_in_agreement() {
    let latency = Duration::from_millis(300);
    let (url, state) = start_store(UpdatePolicy {
        reject_rate: 0.0,
        latency,
    })
    .await;
    let store = WsStore::new(&url, DEFAULT_CONNECT_TIMEOUT);
    let mut board = BoardState::from_records(store.fetch_records().await.unwrap());
    let before = board.clone();
    let mut mutator = OptimisticMutator::new();

    let outcome = mutator
        .commit(
            &mut board,
            &Move {
                record_id: RecordId::new(3),
                from: WorkflowStatus::InProgress,
                to: WorkflowStatus::Completed,
                insert_before: None,
            },
            &store,
            Duration::from_millis(50),
        )
        .await;

    assert!(matches!(
        outcome,
        CommitOutcome::Settled(SettleOutcome::Compensated {
            error: StoreError::Timeout,
            ..
        })
    ));
    assert_eq!(board, before);

    // The late update and the revert queued behind it both land.
    tokio::time::sleep(latency * 2 + Duration::from_millis(300)).await;
    let stored = state.records.status_of(RecordId::new(3)).await;
    assert_eq!(stored, Some(WorkflowStatus::InProgress));
    assert_eq!(stored, board.get(RecordId::new(3)).map(|r| r.status));
}

// ---------------------------------------------------------------------------
// Sync worker + App
// ---------------------------------------------------------------------------

#[tokio::test]
async fn app_loads_moves_and_persists_through_worker() {
    let (url, state) = start_store(UpdatePolicy::default()).await;
    let store = Arc::new(WsStore::new(&url, DEFAULT_CONNECT_TIMEOUT));
    let (cmd_tx, mut evt_rx) = spawn_sync(store, SyncConfig::default());
    let mut app = App::new("Remote", DEFAULT_NOTICE_TTL);

    cmd_tx.send(SyncCommand::Load).await.unwrap();
    app.handle_sync_event(next_event(&mut evt_rx).await);
    assert_eq!(app.load_state, LoadState::Ready);
    assert!(app.is_connected);

    // Pick up the first Pending card, drop it in front of the first In Progress card.
    app.handle_key_event(key(KeyCode::Char(' ')));
    app.handle_key_event(key(KeyCode::Right));
    let cmd = app.handle_key_event(key(KeyCode::Enter)).expect("persist command");
    assert!(matches!(cmd, SyncCommand::Persist(_)));
    cmd_tx.send(cmd).await.unwrap();

    let event = next_event(&mut evt_rx).await;
    assert!(matches!(event, SyncEvent::Persisted(_)));
    app.handle_sync_event(event);

    assert_eq!(ids(&app, WorkflowStatus::InProgress), vec![1, 3, 5]);
    assert_eq!(app.board.in_flight_count(), 0);
    assert_eq!(
        state.records.status_of(RecordId::new(1)).await,
        Some(WorkflowStatus::InProgress)
    );
}

#[tokio::test]
async fn app_rolls_back_rejected_move_and_shows_notice() {
    let (url, _state) = start_store(rejecting()).await;
    let store = Arc::new(WsStore::new(&url, DEFAULT_CONNECT_TIMEOUT));
    let (cmd_tx, mut evt_rx) = spawn_sync(store, SyncConfig::default());
    let mut app = App::new("Remote", DEFAULT_NOTICE_TTL);

    cmd_tx.send(SyncCommand::Load).await.unwrap();
    app.handle_sync_event(next_event(&mut evt_rx).await);
    let before = app.board.state().clone();

    app.handle_key_event(key(KeyCode::Char(' ')));
    app.handle_key_event(key(KeyCode::Right));
    app.handle_key_event(key(KeyCode::Right));
    let cmd = app.handle_key_event(key(KeyCode::Enter)).expect("persist command");
    assert_ne!(app.board.state(), &before);
    cmd_tx.send(cmd).await.unwrap();

    let event = next_event(&mut evt_rx).await;
    assert!(matches!(event, SyncEvent::PersistFailed { .. }));
    app.handle_sync_event(event);

    assert_eq!(app.board.state(), &before);
    let notice = app.notice.as_ref().expect("failure notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("Moved back to Pending"));
}

#[tokio::test]
async fn unreachable_store_fails_load_and_offers_retry() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = Arc::new(WsStore::new(
        format!("ws://{addr}/ws"),
        Duration::from_secs(2),
    ));
    let (cmd_tx, mut evt_rx) = spawn_sync(store, SyncConfig::default());
    let mut app = App::new("Remote", DEFAULT_NOTICE_TTL);

    cmd_tx.send(SyncCommand::Load).await.unwrap();
    let event = next_event(&mut evt_rx).await;
    assert!(matches!(event, SyncEvent::LoadFailed(_)));
    app.handle_sync_event(event);
    assert!(matches!(app.load_state, LoadState::Failed(_)));

    let retry = app.handle_key_event(key(KeyCode::Char('r')));
    assert!(matches!(retry, Some(SyncCommand::Load)));
    assert_eq!(app.load_state, LoadState::Loading);
}
