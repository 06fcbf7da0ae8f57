//! Property-based wire format tests.
//!
//! Uses proptest to verify:
//! 1. Any `StoreMessage` survives encode → decode.
//! 2. Random bytes never cause a panic in `decode` (returns `Err` gracefully).

#![allow(clippy::expect_used)]

use chrono::NaiveDate;
use eventboard_proto::codec;
use eventboard_proto::record::{Priority, Record, RecordId, WorkflowStatus};
use eventboard_proto::store::{RequestId, StoreMessage};
use proptest::prelude::*;
use uuid::Uuid;

// --- Strategies for protocol types ---

fn arb_request_id() -> impl Strategy<Value = RequestId> {
    any::<u128>().prop_map(|n| RequestId::from_uuid(Uuid::from_u128(n)))
}

fn arb_status() -> impl Strategy<Value = WorkflowStatus> {
    prop_oneof![
        Just(WorkflowStatus::Pending),
        Just(WorkflowStatus::InProgress),
        Just(WorkflowStatus::Completed),
    ]
}

fn arb_priority() -> impl Strategy<Value = Option<Priority>> {
    prop::option::of(prop_oneof![
        Just(Priority::High),
        Just(Priority::Medium),
        Just(Priority::Low),
    ])
}

fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    prop::option::of((2000i32..2100, 1u32..=12, 1u32..=28))
        .prop_map(|d| d.and_then(|(y, m, day)| NaiveDate::from_ymd_opt(y, m, day)))
}

/// Records with a realistic mix of filled and empty optional fields.
fn arb_record() -> impl Strategy<Value = Record> {
    (
        any::<u64>(),
        ".{0,64}",
        "[a-zA-Z ]{0,32}",
        arb_status(),
        arb_priority(),
        (arb_date(), arb_date()),
        prop::option::of(any::<u32>()),
        prop::option::of(any::<u64>()),
    )
        .prop_map(
            |(id, title, organizer, status, priority, (start, end), attendees, budget)| Record {
                priority,
                start_date: start,
                end_date: end,
                estimated_attendees: attendees,
                estimated_budget: budget,
                ..Record::new(id, title, status).with_organizer(organizer)
            },
        )
}

fn arb_store_message() -> impl Strategy<Value = StoreMessage> {
    prop_oneof![
        arb_request_id().prop_map(|request_id| StoreMessage::FetchRecords { request_id }),
        (arb_request_id(), prop::collection::vec(arb_record(), 0..8)).prop_map(
            |(request_id, records)| StoreMessage::Records {
                request_id,
                records,
            }
        ),
        (arb_request_id(), any::<u64>(), arb_status()).prop_map(|(request_id, id, status)| {
            StoreMessage::UpdateStatus {
                request_id,
                record_id: RecordId::new(id),
                status,
            }
        }),
        (arb_request_id(), any::<u64>(), arb_status()).prop_map(|(request_id, id, status)| {
            StoreMessage::StatusUpdated {
                request_id,
                record_id: RecordId::new(id),
                status,
            }
        }),
        (arb_request_id(), ".*").prop_map(|(request_id, reason)| StoreMessage::Rejected {
            request_id,
            reason,
        }),
        ".*".prop_map(|reason| StoreMessage::Error { reason }),
    ]
}

// --- Property tests ---

proptest! {
    /// Any StoreMessage survives an encode → decode round-trip.
    #[test]
    fn store_message_round_trip(msg in arb_store_message()) {
        let bytes = codec::encode(&msg).expect("encode should succeed");
        let decoded = codec::decode(&bytes).expect("decode should succeed");
        prop_assert_eq!(msg, decoded);
    }

    /// Random bytes never cause a panic when decoded; they return Err gracefully.
    #[test]
    fn random_bytes_decode_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = codec::decode(&bytes);
    }
}
