//! Remote record store abstraction for `EventBoard`.
//!
//! Defines the [`RecordStore`] trait that every backing store must satisfy.
//! Concrete implementations:
//! - [`memory::MemoryStore`]: in-process store with fault injection, for
//!   offline mode and tests
//! - [`ws::WsStore`]: WebSocket client for `eventboard-store`

pub mod memory;
pub mod ws;

use std::fmt;

use eventboard_proto::record::{Record, RecordId, WorkflowStatus};

/// Describes which kind of store is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Remote store reached over WebSocket.
    Remote,
    /// In-process memory store.
    Memory,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => write!(f, "Remote"),
            Self::Memory => write!(f, "Memory"),
        }
    }
}

/// Errors that can occur during store operations.
///
/// Every variant carries owned text only, so errors can be cloned into
/// events and shown to the user after the request that caused them is gone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The connection to the store has been closed.
    #[error("connection closed")]
    ConnectionClosed,

    /// The operation did not complete within its deadline.
    #[error("store operation timed out")]
    Timeout,

    /// The store could not be reached at all.
    #[error("store {0} is unreachable")]
    Unreachable(String),

    /// The store answered but refused the request.
    #[error("store rejected request: {0}")]
    Rejected(String),

    /// The store sent something this client does not understand.
    #[error("store protocol error: {0}")]
    Protocol(String),
}

impl StoreError {
    /// Whether the error means the store is no longer reachable, as opposed
    /// to having refused one request.
    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::ConnectionClosed | Self::Unreachable(_))
    }
}

/// Async interface to the system of record.
///
/// # Invariant
///
/// `update_status` returning `Ok(())` means the store durably holds the
/// new status, and an error means it does not. A call abandoned by the
/// caller (a timeout) proves neither. Updates from one client are applied
/// in the order they were sent.
pub trait RecordStore: Send + Sync {
    /// Fetch every record, in store order.
    fn fetch_records(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Record>, StoreError>> + Send;

    /// Persist a new workflow status for one record.
    fn update_status(
        &self,
        id: RecordId,
        status: WorkflowStatus,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Return the kind of this store.
    fn kind(&self) -> StoreKind;
}
