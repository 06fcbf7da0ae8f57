//! Board reconciliation core.
//!
//! - [`state::BoardState`]: the three ordered columns
//! - [`index::ColumnIndex`]: which column owns an id
//! - [`drag::DragSession`]: the pick-up / hover / drop gesture
//! - [`mutator::OptimisticMutator`]: apply, persist, and compensate moves
//! - [`filter::BoardView`]: search projection for display
//!
//! [`Board`] bundles the first four so a caller holding one value can drive
//! a whole gesture.

pub mod drag;
pub mod filter;
pub mod index;
pub mod mutator;
pub mod state;

use eventboard_proto::record::RecordId;

pub use drag::{DragPhase, DragSession, Move};
pub use filter::{BoardView, matches};
pub use index::{ColumnIndex, TargetId};
pub use mutator::{ApplyOutcome, CommitOutcome, OptimisticMutator, PendingPersist, SettleOutcome};
pub use state::BoardState;

use crate::remote::StoreError;

/// A board together with its drag session and pending updates.
#[derive(Debug, Default)]
pub struct Board {
    state: BoardState,
    session: DragSession,
    mutator: OptimisticMutator,
}

impl Board {
    /// Wraps a freshly loaded board.
    #[must_use]
    pub fn new(state: BoardState) -> Self {
        Self {
            state,
            session: DragSession::new(),
            mutator: OptimisticMutator::new(),
        }
    }

    /// Current placement of every record.
    #[must_use]
    pub const fn state(&self) -> &BoardState {
        &self.state
    }

    /// Current drag gesture.
    #[must_use]
    pub const fn session(&self) -> &DragSession {
        &self.session
    }

    /// Whether a status update for `id` has not settled yet.
    #[must_use]
    pub fn is_in_flight(&self, id: RecordId) -> bool {
        self.mutator.is_in_flight(id)
    }

    /// Number of status updates that have not settled yet.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.mutator.in_flight_count()
    }

    /// Picks up a card. Refused while its previous move is still persisting.
    pub fn start_drag(&mut self, id: RecordId) -> bool {
        if self.mutator.is_in_flight(id) {
            tracing::debug!(record_id = %id, "record has an update in flight, not draggable");
            return false;
        }
        self.session.start(id, &self.state)
    }

    /// Updates what the dragged card is over.
    pub fn hover(&mut self, over: Option<TargetId>) {
        self.session.hover(over, &self.state);
    }

    /// Releases the dragged card and applies the resulting move, if any.
    ///
    /// A returned [`ApplyOutcome::Pending`] ticket must be persisted and
    /// then passed to [`Board::settle`].
    pub fn drop_on(&mut self, over: Option<TargetId>) -> ApplyOutcome {
        match self.session.drop(over, &self.state) {
            Some(mv) => self.mutator.apply(&mut self.state, &mv),
            None => ApplyOutcome::Unchanged,
        }
    }

    /// Abandons the current gesture.
    pub fn cancel_drag(&mut self) {
        self.session.cancel();
    }

    /// Folds the result of persisting `ticket` back into the board.
    pub fn settle(&mut self, ticket: &PendingPersist, result: Result<(), StoreError>) -> SettleOutcome {
        self.mutator.settle(&mut self.state, ticket, result)
    }

    /// The board filtered by `query`.
    #[must_use]
    pub fn view(&self, query: &str) -> BoardView<'_> {
        BoardView::project(&self.state, query)
    }
}
