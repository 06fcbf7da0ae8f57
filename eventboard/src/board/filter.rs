//! Search filtering and the filtered view of the board.
//!
//! Filtering is display-only. A [`BoardView`] borrows from [`BoardState`]
//! and never changes it, so hidden records keep their place and status.

use eventboard_proto::record::{Record, RecordId, WorkflowStatus, format_date};

use super::state::BoardState;

/// Whether `record` matches a free-text query.
///
/// The match is a case-insensitive substring test over the record's text
/// fields (title, description, organizer, requester, responsible,
/// location, cost center, event type, event format, priority label) and
/// its start and end dates rendered as `dd/mm/yyyy`. An empty query
/// matches everything.
#[must_use]
pub fn matches(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    let text_fields = [
        record.title.as_str(),
        record.description.as_str(),
        record.organizer.as_str(),
        record.requester.as_str(),
        record.responsible.as_str(),
        record.location.as_str(),
        record.cost_center.as_str(),
        record.event_type.as_str(),
        record.event_format.as_str(),
        record.priority.map_or("", |p| p.label()),
    ];
    if text_fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    {
        return true;
    }

    [record.start_date, record.end_date]
        .into_iter()
        .flatten()
        .any(|date| format_date(date).contains(&needle))
}

/// A query applied to every column.
#[derive(Debug, Clone)]
pub struct BoardView<'a> {
    columns: [Vec<&'a Record>; 3],
}

impl<'a> BoardView<'a> {
    /// Filters each column of `board` by `query`, preserving order.
    #[must_use]
    pub fn project(board: &'a BoardState, query: &str) -> Self {
        let columns = WorkflowStatus::ALL.map(|status| {
            board
                .column(status)
                .iter()
                .filter(|record| matches(record, query))
                .collect()
        });
        Self { columns }
    }

    /// Visible records in one column, top to bottom.
    #[must_use]
    pub fn column(&self, status: WorkflowStatus) -> &[&'a Record] {
        &self.columns[status.index()]
    }

    /// Visible ids in one column, top to bottom.
    #[must_use]
    pub fn ids(&self, status: WorkflowStatus) -> Vec<RecordId> {
        self.column(status).iter().map(|r| r.id).collect()
    }

    /// Number of visible records in one column.
    #[must_use]
    pub fn count(&self, status: WorkflowStatus) -> usize {
        self.column(status).len()
    }

    /// Number of visible records on the whole board.
    #[must_use]
    pub fn total(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}
