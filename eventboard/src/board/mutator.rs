//! Optimistic mutation with compensation.
//!
//! A cross-column [`Move`] is applied to the [`BoardState`] immediately,
//! then persisted as a status update. Persistence is split into three steps
//! so the board never has to be borrowed across an `.await`:
//!
//! 1. [`OptimisticMutator::apply`] moves the card and returns a
//!    [`PendingPersist`] ticket.
//! 2. [`OptimisticMutator::persist`] sends the update (no board access).
//! 3. [`OptimisticMutator::settle`] keeps the move or puts the card back.
//!
//! [`OptimisticMutator::commit`] runs all three in sequence for callers that
//! own the board exclusively.

use std::collections::HashSet;
use std::time::Duration;

use eventboard_proto::record::{RecordId, WorkflowStatus};

use super::drag::Move;
use super::index::ColumnIndex;
use super::state::BoardState;
use crate::remote::{RecordStore, StoreError};

/// Default deadline for one status update.
pub const DEFAULT_PERSIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Receipt for a cross-column move awaiting persistence.
///
/// Carries everything needed to undo the move if the store refuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPersist {
    /// The moved record.
    pub record_id: RecordId,
    /// Column the record left.
    pub from: WorkflowStatus,
    /// Column the record entered; the status sent to the store.
    pub to: WorkflowStatus,
    /// Index the record held in `from` before the move.
    pub original_index: usize,
}

/// What [`OptimisticMutator::apply`] did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing changed.
    Unchanged,
    /// Order changed within one column. Not persisted.
    Reordered {
        /// The reordered record.
        record_id: RecordId,
        /// Column the reorder happened in.
        column: WorkflowStatus,
        /// Index the record now holds.
        to_index: usize,
    },
    /// The record changed column and must be persisted.
    Pending(PendingPersist),
}

/// How a persistence result was folded back into the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettleOutcome {
    /// The store accepted the update; the board already shows it.
    Confirmed,
    /// The store refused; the record was put back in its old column.
    Compensated {
        /// Why the update was not persisted.
        error: StoreError,
        /// Index the record was restored to.
        restored_index: usize,
    },
    /// The store refused, but the record is no longer where the move put
    /// it, so nothing was restored.
    Stale {
        /// Why the update was not persisted.
        error: StoreError,
    },
}

/// Result of [`OptimisticMutator::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The move did not change the board.
    Unchanged,
    /// A same-column reorder; nothing was sent to the store.
    Reordered,
    /// A cross-column move that was sent to the store and settled.
    Settled(SettleOutcome),
}

/// Applies moves to a board and tracks which records await persistence.
#[derive(Debug, Default)]
pub struct OptimisticMutator {
    in_flight: HashSet<RecordId>,
}

impl OptimisticMutator {
    /// Creates a mutator with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a status update for `id` has not settled yet.
    #[must_use]
    pub fn is_in_flight(&self, id: RecordId) -> bool {
        self.in_flight.contains(&id)
    }

    /// Number of updates that have not settled yet.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Applies `mv` to the board.
    ///
    /// Same-column moves follow array-move semantics: the record is removed
    /// and reinserted at the index `insert_before` held, or at the end of
    /// the column when there is no `insert_before`. Cross-column moves
    /// insert in front of `insert_before` (or at the end if it is not in the
    /// target column), rewrite the record's status, and return a ticket.
    ///
    /// Returns [`ApplyOutcome::Unchanged`] if the record is not in `mv.from`,
    /// if `insert_before` is the record itself, or if the record already
    /// has an update in flight and `mv` would change its column again.
    pub fn apply(&mut self, board: &mut BoardState, mv: &Move) -> ApplyOutcome {
        let Some((column, from_index)) = board.position(mv.record_id) else {
            tracing::debug!(record_id = %mv.record_id, "move of unknown record ignored");
            return ApplyOutcome::Unchanged;
        };
        if column != mv.from {
            tracing::debug!(
                record_id = %mv.record_id,
                expected = %mv.from,
                actual = %column,
                "move source does not match board, ignoring"
            );
            return ApplyOutcome::Unchanged;
        }
        if mv.insert_before == Some(mv.record_id) {
            return ApplyOutcome::Unchanged;
        }

        if mv.is_reorder() {
            Self::reorder(board, mv, from_index)
        } else {
            self.relocate(board, mv, from_index)
        }
    }

    fn reorder(board: &mut BoardState, mv: &Move, from_index: usize) -> ApplyOutcome {
        let to_index = match mv.insert_before {
            Some(anchor) => match board.position(anchor) {
                Some((column, index)) if column == mv.to => index,
                _ => {
                    tracing::debug!(record_id = %mv.record_id, %anchor, "reorder anchor not in column");
                    return ApplyOutcome::Unchanged;
                }
            },
            None => board.column(mv.to).len().saturating_sub(1),
        };
        if to_index == from_index {
            return ApplyOutcome::Unchanged;
        }
        let Some(record) = board.take(mv.from, from_index) else {
            return ApplyOutcome::Unchanged;
        };
        let to_index = board.put(mv.to, to_index, record);
        tracing::debug!(record_id = %mv.record_id, column = %mv.to, from_index, to_index, "reordered");
        ApplyOutcome::Reordered {
            record_id: mv.record_id,
            column: mv.to,
            to_index,
        }
    }

    fn relocate(&mut self, board: &mut BoardState, mv: &Move, from_index: usize) -> ApplyOutcome {
        if self.is_in_flight(mv.record_id) {
            tracing::debug!(record_id = %mv.record_id, "status update already in flight, ignoring move");
            return ApplyOutcome::Unchanged;
        }

        let insert_at = mv
            .insert_before
            .and_then(|anchor| board.position(anchor))
            .filter(|(column, _)| *column == mv.to)
            .map_or_else(|| board.column(mv.to).len(), |(_, index)| index);

        let Some(record) = board.take(mv.from, from_index) else {
            return ApplyOutcome::Unchanged;
        };
        let to_index = board.put(mv.to, insert_at, record);
        self.in_flight.insert(mv.record_id);

        tracing::info!(
            record_id = %mv.record_id,
            from = %mv.from,
            to = %mv.to,
            to_index,
            "moved optimistically"
        );
        ApplyOutcome::Pending(PendingPersist {
            record_id: mv.record_id,
            from: mv.from,
            to: mv.to,
            original_index: from_index,
        })
    }

    /// Sends the status update for `ticket`, giving up after `timeout`.
    ///
    /// `Ok` means the store holds `ticket.to`; `Err` means it holds
    /// `ticket.from` and the move must be undone.
    ///
    /// A timeout leaves the outcome unknown: the update may still land.
    /// The store is then asked to put the record back in `ticket.from`.
    /// It applies one client's updates in order, so a revert that was sent
    /// lands after the original even if its reply is late. Only when the
    /// revert definitely failed does the record's stored status decide.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or [`StoreError::Timeout`] when the update
    /// timed out and the store holds (or will hold) `ticket.from`.
    pub async fn persist<S: RecordStore>(
        store: &S,
        ticket: &PendingPersist,
        timeout: Duration,
    ) -> Result<(), StoreError> {
        let Ok(result) =
            tokio::time::timeout(timeout, store.update_status(ticket.record_id, ticket.to)).await
        else {
            tracing::warn!(record_id = %ticket.record_id, ?timeout, "status update timed out, reverting");
            return Self::resolve_timeout(store, ticket, timeout).await;
        };
        result
    }

    async fn resolve_timeout<S: RecordStore>(
        store: &S,
        ticket: &PendingPersist,
        timeout: Duration,
    ) -> Result<(), StoreError> {
        let revert_error =
            match tokio::time::timeout(timeout, store.update_status(ticket.record_id, ticket.from)).await {
                Ok(Ok(())) => {
                    tracing::info!(record_id = %ticket.record_id, status = %ticket.from, "timed-out update reverted");
                    return Err(StoreError::Timeout);
                }
                Err(_) => {
                    tracing::info!(record_id = %ticket.record_id, "revert sent, reply still pending");
                    return Err(StoreError::Timeout);
                }
                Ok(Err(error)) => error,
            };

        tracing::warn!(record_id = %ticket.record_id, error = %revert_error, "revert failed, checking stored status");
        let stored = tokio::time::timeout(timeout, store.fetch_records())
            .await
            .ok()
            .and_then(Result::ok)
            .and_then(|records| {
                records
                    .into_iter()
                    .find(|r| r.id == ticket.record_id)
                    .map(|r| r.status)
            });
        match stored {
            Some(status) if status == ticket.to => {
                tracing::info!(record_id = %ticket.record_id, %status, "timed-out update was applied");
                Ok(())
            }
            Some(status) => {
                tracing::info!(record_id = %ticket.record_id, %status, "timed-out update not applied");
                Err(StoreError::Timeout)
            }
            None => {
                tracing::error!(
                    record_id = %ticket.record_id,
                    "could not confirm stored status after timeout; reload to resync"
                );
                Err(StoreError::Timeout)
            }
        }
    }

    /// Folds a persistence result back into the board.
    ///
    /// On failure the record is moved from `ticket.to` back into
    /// `ticket.from` at its original index (clamped to the column length)
    /// and its status restored. Other records' relative order is untouched.
    pub fn settle(
        &mut self,
        board: &mut BoardState,
        ticket: &PendingPersist,
        result: Result<(), StoreError>,
    ) -> SettleOutcome {
        self.in_flight.remove(&ticket.record_id);

        let error = match result {
            Ok(()) => {
                tracing::info!(record_id = %ticket.record_id, status = %ticket.to, "status persisted");
                return SettleOutcome::Confirmed;
            }
            Err(error) => error,
        };

        tracing::warn!(
            record_id = %ticket.record_id,
            from = %ticket.from,
            to = %ticket.to,
            error = %error,
            "status update failed, rolling back"
        );

        let current = board
            .position(ticket.record_id)
            .filter(|(column, _)| *column == ticket.to);
        let Some(record) = current.and_then(|(column, index)| board.take(column, index)) else {
            tracing::warn!(record_id = %ticket.record_id, "record moved since update was sent, not restoring");
            return SettleOutcome::Stale { error };
        };
        let restored_index = board.put(ticket.from, ticket.original_index, record);
        SettleOutcome::Compensated {
            error,
            restored_index,
        }
    }

    /// Applies, persists, and settles `mv` in one call.
    pub async fn commit<S: RecordStore>(
        &mut self,
        board: &mut BoardState,
        mv: &Move,
        store: &S,
        timeout: Duration,
    ) -> CommitOutcome {
        match self.apply(board, mv) {
            ApplyOutcome::Unchanged => CommitOutcome::Unchanged,
            ApplyOutcome::Reordered { .. } => CommitOutcome::Reordered,
            ApplyOutcome::Pending(ticket) => {
                let result = Self::persist(store, &ticket, timeout).await;
                CommitOutcome::Settled(self.settle(board, &ticket, result))
            }
        }
    }
}
