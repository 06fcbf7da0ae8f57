//! Store synchronization worker for wiring the TUI to the record store.
//!
//! This module bridges the synchronous TUI event loop (crossterm poll-based)
//! with the async [`RecordStore`]. It spawns a background tokio task and
//! communicates with the main thread via [`SyncCommand`] / [`SyncEvent`]
//! channels.
//!
//! # Architecture
//!
//! ```text
//! TUI (main thread)  ←── SyncEvent ───  tokio background tasks
//!                     ─── SyncCommand →
//! ```
//!
//! The board itself stays on the main thread. The worker only ever sees
//! [`PendingPersist`] tickets and hands them back inside events, so the TUI
//! settles each move against its own board.

use std::sync::Arc;
use std::time::Duration;

use eventboard_proto::record::Record;
use tokio::sync::mpsc;

use crate::board::mutator::{DEFAULT_PERSIST_TIMEOUT, OptimisticMutator, PendingPersist};
use crate::remote::{RecordStore, StoreError};

/// Commands sent from the TUI main loop to the sync worker.
#[derive(Debug)]
pub enum SyncCommand {
    /// Fetch every record from the store.
    Load,
    /// Persist the status change described by the ticket.
    Persist(PendingPersist),
    /// Gracefully shut down the worker.
    Shutdown,
}

/// Events sent from the sync worker to the TUI main loop.
#[derive(Debug)]
pub enum SyncEvent {
    /// The initial (or retried) fetch succeeded.
    Loaded(Vec<Record>),
    /// The fetch failed; the board should show an error state.
    LoadFailed(StoreError),
    /// The store accepted the status change.
    Persisted(PendingPersist),
    /// The store did not accept the status change; the move must be undone.
    PersistFailed {
        /// The move that failed.
        ticket: PendingPersist,
        /// Why it failed.
        error: StoreError,
    },
}

/// Configuration for the sync worker.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Deadline for a fetch or a single status update.
    pub request_timeout: Duration,
    /// Channel capacity for command/event mpsc channels.
    pub channel_capacity: usize,
}

/// Default channel capacity for commands and events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_PERSIST_TIMEOUT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Spawn the sync worker and return channel handles.
///
/// Every command runs on its own task, so a slow status update never holds
/// up a fetch or another update. Events arrive in completion order, not
/// command order.
///
/// Must be called from within a tokio runtime.
pub fn spawn_sync<S>(
    store: Arc<S>,
    config: SyncConfig,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>)
where
    S: RecordStore + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(config.channel_capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(config.channel_capacity);

    tokio::spawn(async move {
        command_handler(store, cmd_rx, evt_tx, config.request_timeout).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: handle commands from the TUI main loop.
async fn command_handler<S>(
    store: Arc<S>,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
    timeout: Duration,
) where
    S: RecordStore + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SyncCommand::Load => {
                let store = Arc::clone(&store);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    let event = load(&*store, timeout).await;
                    // TUI dropped; nothing left to tell.
                    let _ = evt_tx.send(event).await;
                });
            }
            SyncCommand::Persist(ticket) => {
                let store = Arc::clone(&store);
                let evt_tx = evt_tx.clone();
                tokio::spawn(async move {
                    let event = match OptimisticMutator::persist(&*store, &ticket, timeout).await {
                        Ok(()) => SyncEvent::Persisted(ticket),
                        Err(error) => SyncEvent::PersistFailed { ticket, error },
                    };
                    let _ = evt_tx.send(event).await;
                });
            }
            SyncCommand::Shutdown => {
                tracing::info!("sync command handler shutting down");
                break;
            }
        }
    }
}

async fn load<S: RecordStore>(store: &S, timeout: Duration) -> SyncEvent {
    let result = tokio::time::timeout(timeout, store.fetch_records())
        .await
        .unwrap_or(Err(StoreError::Timeout));
    match result {
        Ok(records) => {
            tracing::info!(count = records.len(), store = %store.kind(), "records loaded");
            SyncEvent::Loaded(records)
        }
        Err(error) => {
            tracing::warn!(error = %error, store = %store.kind(), "record fetch failed");
            SyncEvent::LoadFailed(error)
        }
    }
}
