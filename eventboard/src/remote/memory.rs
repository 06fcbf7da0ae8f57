//! In-process record store.
//!
//! [`MemoryStore`] keeps records behind a [`parking_lot::Mutex`] and lets
//! tests and offline mode inject latency and failures. It also counts
//! `update_status` calls, so callers can check what reached the store.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use eventboard_proto::record::{Record, RecordId, WorkflowStatus};
use parking_lot::Mutex;

use super::{RecordStore, StoreError, StoreKind};

/// Record store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
    fail_fetch: AtomicBool,
    fail_updates: AtomicBool,
    latency_ms: AtomicU64,
    update_calls: AtomicUsize,
}

impl MemoryStore {
    /// Creates a store holding `records`.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    /// Creates a store holding the built-in demo records.
    #[must_use]
    pub fn demo() -> Self {
        Self::new(eventboard_proto::seed::demo_records())
    }

    /// Makes every subsequent fetch fail (or succeed again).
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent status update fail (or succeed again).
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Delays every subsequent operation by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        let ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(ms, Ordering::SeqCst);
    }

    /// Number of `update_status` calls received so far.
    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Stored status of one record.
    #[must_use]
    pub fn status_of(&self, id: RecordId) -> Option<WorkflowStatus> {
        self.records
            .lock()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
    }

    async fn delay(&self) {
        let ms = self.latency_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

impl RecordStore for MemoryStore {
    async fn fetch_records(&self) -> Result<Vec<Record>, StoreError> {
        self.delay().await;
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Unreachable("memory".to_string()));
        }
        Ok(self.records.lock().clone())
    }

    async fn update_status(&self, id: RecordId, status: WorkflowStatus) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("update rejected by store".to_string()));
        }

        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::Rejected(format!("record not found: {id}")))?;
        record.status = status;
        drop(records);
        tracing::debug!(record_id = %id, %status, "memory store updated");
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }
}
