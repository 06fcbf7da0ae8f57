//! Board state: three ordered columns of records, one per workflow status.
//!
//! A record lives in exactly one column and its `status` always names that
//! column. Mutation is crate-private; callers go through
//! [`OptimisticMutator`](super::mutator::OptimisticMutator).

use std::collections::HashSet;

use eventboard_proto::record::{Record, RecordId, WorkflowStatus};

/// Authoritative client-side placement of every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    columns: [Vec<Record>; 3],
}

impl BoardState {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitions fetched records into columns by status, keeping fetch
    /// order within each column.
    ///
    /// The first occurrence of a duplicated id wins; later ones are dropped
    /// with a warning.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut board = Self::new();
        let mut seen = HashSet::new();
        for record in records {
            if !seen.insert(record.id) {
                tracing::warn!(record_id = %record.id, "duplicate record id in fetch, dropping");
                continue;
            }
            board.columns[record.status.index()].push(record);
        }
        tracing::debug!(
            pending = board.column(WorkflowStatus::Pending).len(),
            in_progress = board.column(WorkflowStatus::InProgress).len(),
            completed = board.column(WorkflowStatus::Completed).len(),
            "board partitioned"
        );
        board
    }

    /// Records in one column, top to bottom.
    #[must_use]
    pub fn column(&self, status: WorkflowStatus) -> &[Record] {
        &self.columns[status.index()]
    }

    /// Ids in one column, top to bottom.
    #[must_use]
    pub fn ids(&self, status: WorkflowStatus) -> Vec<RecordId> {
        self.column(status).iter().map(|r| r.id).collect()
    }

    /// Looks up a record anywhere on the board.
    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records().find(|r| r.id == id)
    }

    /// Whether a record with this id is on the board.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// All records, column by column.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.columns.iter().flatten()
    }

    /// Total number of records on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Whether the board holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Whether every id is unique and every record's status names the
    /// column holding it.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let mut seen = HashSet::new();
        WorkflowStatus::ALL.into_iter().all(|status| {
            self.column(status)
                .iter()
                .all(|r| r.status == status && seen.insert(r.id))
        })
    }

    /// Removes and returns the record at `index` in `status`.
    pub(crate) fn take(&mut self, status: WorkflowStatus, index: usize) -> Option<Record> {
        let column = &mut self.columns[status.index()];
        (index < column.len()).then(|| column.remove(index))
    }

    /// Inserts `record` into `status` at `index`, clamped to the column
    /// length, and rewrites its status to match. Returns the index used.
    pub(crate) fn put(&mut self, status: WorkflowStatus, index: usize, mut record: Record) -> usize {
        let column = &mut self.columns[status.index()];
        let index = index.min(column.len());
        record.status = status;
        column.insert(index, record);
        index
    }
}
