//! Store wire protocol between board clients and the record store server.
//!
//! [`StoreMessage`] values are postcard-encoded (see [`crate::codec`]) and
//! carried in WebSocket binary frames. Every request carries a
//! [`RequestId`] that the server echoes in its response so a client can
//! have several requests in flight on one connection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::{Record, RecordId, WorkflowStatus};

/// Correlates a response with the request that caused it (UUID v7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages exchanged between board clients and the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StoreMessage {
    /// Client asks for every record on the board.
    FetchRecords {
        /// Echoed in [`StoreMessage::Records`].
        request_id: RequestId,
    },

    /// Server answers a fetch.
    Records {
        /// The fetch this answers.
        request_id: RequestId,
        /// All records, in store order.
        records: Vec<Record>,
    },

    /// Client asks to persist a new workflow status for one record.
    UpdateStatus {
        /// Echoed in the response.
        request_id: RequestId,
        /// Record to update.
        record_id: RecordId,
        /// New status.
        status: WorkflowStatus,
    },

    /// Server confirms a status update.
    StatusUpdated {
        /// The update this answers.
        request_id: RequestId,
        /// Record that was updated.
        record_id: RecordId,
        /// Status now stored.
        status: WorkflowStatus,
    },

    /// Server refused a request.
    Rejected {
        /// The request that was refused.
        request_id: RequestId,
        /// Human-readable reason.
        reason: String,
    },

    /// Server reports an error not tied to a request (e.g. undecodable frame).
    Error {
        /// Human-readable error description.
        reason: String,
    },
}

impl StoreMessage {
    /// The request id this message carries, if any.
    #[must_use]
    pub const fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::FetchRecords { request_id }
            | Self::Records { request_id, .. }
            | Self::UpdateStatus { request_id, .. }
            | Self::StatusUpdated { request_id, .. }
            | Self::Rejected { request_id, .. } => Some(*request_id),
            Self::Error { .. } => None,
        }
    }
}
