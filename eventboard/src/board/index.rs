//! Column lookup: which workflow column holds a record or drop target.
//!
//! [`ColumnIndex`] is the single "which list owns this id" contract. The
//! default implementation on [`BoardState`] scans the three columns; a
//! cached implementation can replace it without touching callers.

use eventboard_proto::record::{RecordId, WorkflowStatus};

use super::state::BoardState;

/// Something a dragged card can be released over: a card or a bare column.
///
/// Dropping on a bare column is how a card reaches an empty column, which
/// has no cards to hit-test against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetId {
    /// The column area itself (placeholder or empty space below the cards).
    Column(WorkflowStatus),
    /// A specific card.
    Record(RecordId),
}

impl From<RecordId> for TargetId {
    fn from(id: RecordId) -> Self {
        Self::Record(id)
    }
}

impl From<WorkflowStatus> for TargetId {
    fn from(status: WorkflowStatus) -> Self {
        Self::Column(status)
    }
}

/// Read-only lookup of record placement on the board.
pub trait ColumnIndex {
    /// Column and index of a record, or `None` if the board does not know it.
    fn position(&self, id: RecordId) -> Option<(WorkflowStatus, usize)>;

    /// Resolves a target to the column containing it.
    ///
    /// A column target resolves to itself regardless of board contents.
    /// A record target resolves to its containing column, or `None` if
    /// the record is unknown.
    fn locate(&self, target: TargetId) -> Option<WorkflowStatus> {
        match target {
            TargetId::Column(status) => Some(status),
            TargetId::Record(id) => self.position(id).map(|(status, _)| status),
        }
    }
}

impl ColumnIndex for BoardState {
    fn position(&self, id: RecordId) -> Option<(WorkflowStatus, usize)> {
        WorkflowStatus::ALL.into_iter().find_map(|status| {
            self.column(status)
                .iter()
                .position(|r| r.id == id)
                .map(|index| (status, index))
        })
    }
}
