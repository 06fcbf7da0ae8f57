//! Property-based tests for board reconciliation.
//!
//! Uses proptest to verify, for arbitrary boards and move sequences:
//! 1. Every id stays in exactly one column, with a matching status.
//! 2. A failed cross-column move is undone exactly.
//! 3. Search partitions each column into matches and non-matches without
//!    reordering.

#![allow(clippy::unwrap_used)]

use eventboard::board::{
    ApplyOutcome, BoardState, BoardView, ColumnIndex, Move, OptimisticMutator, matches,
};
use eventboard::remote::StoreError;
use eventboard_proto::record::{Record, RecordId, WorkflowStatus};
use proptest::prelude::*;

const TITLES: [&str; 6] = [
    "Marketing Conference",
    "React Training",
    "Sales Kickoff",
    "Quarterly Review",
    "Product Launch",
    "Team Retro",
];

fn arb_status() -> impl Strategy<Value = WorkflowStatus> {
    (0usize..3).prop_map(|i| WorkflowStatus::ALL[i])
}

/// Up to 16 records with ids drawn from a small range, so duplicates occur.
fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((0u64..12, 0usize..TITLES.len(), arb_status()), 0..16).prop_map(
        |rows| {
            rows.into_iter()
                .map(|(id, title, status)| Record::new(id, TITLES[title], status))
                .collect()
        },
    )
}

/// (record id, target column, anchor id, whether the store accepts).
fn arb_ops() -> impl Strategy<Value = Vec<(u64, WorkflowStatus, Option<u64>, bool)>> {
    prop::collection::vec(
        (0u64..12, arb_status(), prop::option::of(0u64..12), any::<bool>()),
        0..32,
    )
}

fn sorted_ids(board: &BoardState) -> Vec<RecordId> {
    let mut ids: Vec<RecordId> = board.records().map(|r| r.id).collect();
    ids.sort();
    ids
}

/// Builds a move from the record's current column, if it is on the board.
fn make_move(board: &BoardState, id: u64, to: WorkflowStatus, anchor: Option<u64>) -> Option<Move> {
    let record_id = RecordId::new(id);
    let (from, _) = board.position(record_id)?;
    Some(Move {
        record_id,
        from,
        to,
        insert_before: anchor.map(RecordId::new),
    })
}

proptest! {
    /// Moves and settlements never lose, duplicate, or mislabel a record.
    #[test]
    fn moves_preserve_membership(records in arb_records(), ops in arb_ops()) {
        let mut board = BoardState::from_records(records);
        let expected = sorted_ids(&board);
        let mut mutator = OptimisticMutator::new();

        for (id, to, anchor, accepted) in ops {
            let Some(mv) = make_move(&board, id, to, anchor) else {
                continue;
            };
            if let ApplyOutcome::Pending(ticket) = mutator.apply(&mut board, &mv) {
                let result = if accepted { Ok(()) } else { Err(StoreError::Timeout) };
                mutator.settle(&mut board, &ticket, result);
            }
            prop_assert!(board.is_consistent());
            prop_assert_eq!(sorted_ids(&board), expected.clone());
        }
        prop_assert_eq!(mutator.in_flight_count(), 0);
    }

    /// Applying a cross-column move and then failing it restores the board.
    #[test]
    fn failed_move_is_exact_inverse(
        records in arb_records(),
        id in 0u64..12,
        to in arb_status(),
        anchor in prop::option::of(0u64..12),
    ) {
        let mut board = BoardState::from_records(records);
        let before = board.clone();
        let mut mutator = OptimisticMutator::new();

        let Some(mv) = make_move(&board, id, to, anchor) else {
            return Ok(());
        };
        if let ApplyOutcome::Pending(ticket) = mutator.apply(&mut board, &mv) {
            prop_assert_eq!(board.locate(mv.record_id.into()), Some(to));
            mutator.settle(&mut board, &ticket, Err(StoreError::ConnectionClosed));
            prop_assert_eq!(board, before);
        }
    }

    /// Same-column moves never create a ticket.
    #[test]
    fn reorders_are_never_pending(records in arb_records(), id in 0u64..12, anchor in prop::option::of(0u64..12)) {
        let mut board = BoardState::from_records(records);
        let mut mutator = OptimisticMutator::new();
        let Some((column, _)) = board.position(RecordId::new(id)) else {
            return Ok(());
        };
        let mv = make_move(&board, id, column, anchor).unwrap();
        let outcome = mutator.apply(&mut board, &mv);
        prop_assert!(!matches!(outcome, ApplyOutcome::Pending(_)));
        prop_assert_eq!(mutator.in_flight_count(), 0);
        prop_assert!(board.is_consistent());
    }

    /// The filtered view is exactly the matching records, in board order.
    #[test]
    fn view_is_ordered_subset(records in arb_records(), query in "[a-zA-Z ]{0,6}") {
        let board = BoardState::from_records(records);
        let view = BoardView::project(&board, &query);

        for status in WorkflowStatus::ALL {
            let expected: Vec<RecordId> = board
                .column(status)
                .iter()
                .filter(|r| matches(r, &query))
                .map(|r| r.id)
                .collect();
            prop_assert_eq!(view.ids(status), expected);
        }
        prop_assert!(view.total() <= board.len());
    }
}
