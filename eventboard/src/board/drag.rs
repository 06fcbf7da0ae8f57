//! Drag gesture state machine.
//!
//! A [`DragSession`] tracks one gesture at a time:
//!
//! ```text
//! Idle ──start──▶ Dragging ──hover──▶ Dragging
//!                    │
//!                    ├──drop(target)──▶ Dropped ──▶ Idle   (yields a Move)
//!                    └──drop(None) / cancel ──────▶ Idle   (no Move)
//! ```
//!
//! The session never touches the board; it only reads it through
//! [`ColumnIndex`] to resolve columns.

use eventboard_proto::record::{RecordId, WorkflowStatus};

use super::index::{ColumnIndex, TargetId};

/// Where the gesture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A card is picked up and follows the pointer.
    Dragging,
    /// The card was released; the move is being resolved.
    Dropped,
}

/// A completed gesture, ready for the mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// The record being moved.
    pub record_id: RecordId,
    /// Column the record occupies when the gesture ends.
    pub from: WorkflowStatus,
    /// Column the record was released over.
    pub to: WorkflowStatus,
    /// Card the record lands in front of; `None` means the end of `to`.
    pub insert_before: Option<RecordId>,
}

impl Move {
    /// Whether the move stays within one column.
    #[must_use]
    pub fn is_reorder(&self) -> bool {
        self.from == self.to
    }
}

/// State of the current drag gesture.
#[derive(Debug, Default)]
pub struct DragSession {
    phase: DragPhase,
    active_id: Option<RecordId>,
    source_column: Option<WorkflowStatus>,
    hover_column: Option<WorkflowStatus>,
    hover_target: Option<TargetId>,
}

impl DragSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up a card.
    ///
    /// Returns `false` without changing state if a gesture is already in
    /// progress or the record is not on the board.
    pub fn start(&mut self, id: RecordId, index: &impl ColumnIndex) -> bool {
        if self.phase != DragPhase::Idle {
            tracing::debug!(record_id = %id, active = ?self.active_id, "drag already in progress");
            return false;
        }
        let Some(source) = index.locate(TargetId::Record(id)) else {
            tracing::debug!(record_id = %id, "drag start on unknown record ignored");
            return false;
        };

        self.phase = DragPhase::Dragging;
        self.active_id = Some(id);
        self.source_column = Some(source);
        self.hover_column = None;
        self.hover_target = None;
        tracing::debug!(record_id = %id, column = %source, "drag started");
        true
    }

    /// Updates what the card is over. Has no effect outside a gesture.
    ///
    /// A target that does not resolve to a column clears the hover.
    pub fn hover(&mut self, over: Option<TargetId>, index: &impl ColumnIndex) {
        if self.phase != DragPhase::Dragging {
            return;
        }
        let column = over.and_then(|t| index.locate(t));
        self.hover_target = over.filter(|_| column.is_some());
        self.hover_column = column;
    }

    /// Releases the card over `over` and returns to idle.
    ///
    /// Yields a [`Move`] only when the target resolves to a column and is not
    /// the dragged card itself. Releasing outside any target cancels.
    pub fn drop(&mut self, over: Option<TargetId>, index: &impl ColumnIndex) -> Option<Move> {
        if self.phase != DragPhase::Dragging {
            return None;
        }
        self.phase = DragPhase::Dropped;
        let resolved = self.resolve(over, index);
        match &resolved {
            Some(mv) => tracing::debug!(
                record_id = %mv.record_id,
                from = %mv.from,
                to = %mv.to,
                insert_before = ?mv.insert_before,
                "drag dropped"
            ),
            None => tracing::debug!(record_id = ?self.active_id, "drag ended without a move"),
        }
        self.reset();
        resolved
    }

    /// Abandons the gesture. The board is left untouched.
    pub fn cancel(&mut self) {
        if self.phase != DragPhase::Idle {
            tracing::debug!(record_id = ?self.active_id, "drag cancelled");
        }
        self.reset();
    }

    fn resolve(&self, over: Option<TargetId>, index: &impl ColumnIndex) -> Option<Move> {
        let record_id = self.active_id?;
        let over = over?;
        if over == TargetId::Record(record_id) {
            return None;
        }
        let from = index.locate(TargetId::Record(record_id))?;
        let to = index.locate(over)?;
        let insert_before = match over {
            TargetId::Record(id) => Some(id),
            TargetId::Column(_) => None,
        };
        Some(Move {
            record_id,
            from,
            to,
            insert_before,
        })
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Whether a card is currently picked up.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// The card being dragged.
    #[must_use]
    pub const fn active_id(&self) -> Option<RecordId> {
        self.active_id
    }

    /// Column the card was picked up from.
    #[must_use]
    pub const fn source_column(&self) -> Option<WorkflowStatus> {
        self.source_column
    }

    /// Column currently under the card.
    #[must_use]
    pub const fn hover_column(&self) -> Option<WorkflowStatus> {
        self.hover_column
    }

    /// Target currently under the card.
    #[must_use]
    pub const fn hover_target(&self) -> Option<TargetId> {
        self.hover_target
    }
}
