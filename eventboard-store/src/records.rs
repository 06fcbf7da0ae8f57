//! In-memory record table backing the store server.
//!
//! The [`RecordTable`] holds every record in insertion order behind an async
//! [`RwLock`]. Fetches clone the whole table; status updates touch one row.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use eventboard_proto::record::{MAX_RECORD_TITLE_LENGTH, Record, RecordId, WorkflowStatus};
use tokio::sync::RwLock;

/// Errors raised by record table operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    /// No record with the given id exists.
    #[error("record not found: {0}")]
    UnknownRecord(RecordId),
}

/// Errors raised while loading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// Failed to read the seed file.
    #[error("failed to read seed file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Seed file is not a JSON array of records.
    #[error("failed to parse seed file: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// A record's title exceeds [`MAX_RECORD_TITLE_LENGTH`].
    #[error("record {id} title is {len} characters (max {MAX_RECORD_TITLE_LENGTH})")]
    TitleTooLong {
        /// The offending record.
        id: RecordId,
        /// Title length in characters.
        len: usize,
    },
}

/// Ordered, id-unique table of records.
pub struct RecordTable {
    rows: RwLock<Vec<Record>>,
}

impl RecordTable {
    /// Creates a table from `records`, keeping the first row for any
    /// duplicated id.
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let rows = records
            .into_iter()
            .filter(|r| {
                let fresh = seen.insert(r.id);
                if !fresh {
                    tracing::warn!(record_id = %r.id, "duplicate record id in seed, dropping");
                }
                fresh
            })
            .collect();
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Loads a table from a JSON seed file (an array of records).
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] if the file cannot be read or parsed, or if a
    /// title is longer than [`MAX_RECORD_TITLE_LENGTH`] characters.
    pub fn from_seed_file(path: &Path) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path).map_err(|e| SeedError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let records: Vec<Record> = serde_json::from_str(&contents)?;
        if let Some(r) = records
            .iter()
            .find(|r| r.title.chars().count() > MAX_RECORD_TITLE_LENGTH)
        {
            return Err(SeedError::TitleTooLong {
                id: r.id,
                len: r.title.chars().count(),
            });
        }
        Ok(Self::new(records))
    }

    /// Returns a snapshot of every record in table order.
    pub async fn all(&self) -> Vec<Record> {
        self.rows.read().await.clone()
    }

    /// Returns the current status of a record.
    pub async fn status_of(&self, id: RecordId) -> Option<WorkflowStatus> {
        self.rows
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.status)
    }

    /// Stores a new workflow status for one record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownRecord`] if no record has that id.
    pub async fn set_status(&self, id: RecordId, status: WorkflowStatus) -> Result<(), RecordError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RecordError::UnknownRecord(id))?;
        row.status = status;
        drop(rows);
        Ok(())
    }

    /// Number of records in the table.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    /// Whether the table has no records.
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}
