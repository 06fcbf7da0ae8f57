//! Event-request record model shared by the board client and the store.
//!
//! A [`Record`] is a single event request. Only [`Record::id`] and
//! [`Record::status`] matter to board reconciliation; every other field is
//! descriptive and is only read by the search filter and the card renderer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum allowed record title length in characters.
pub const MAX_RECORD_TITLE_LENGTH: usize = 256;

/// Stable identifier for a record, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Creates a `RecordId` from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Workflow status of a record. Each status is also a board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Request received, not started.
    Pending,
    /// Request is being organized.
    InProgress,
    /// Event took place or request closed.
    Completed,
}

impl WorkflowStatus {
    /// All statuses in board (left-to-right) order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Position of this status on the board, `0..3`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }

    /// Status at a board position, if in range.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Pending),
            1 => Some(Self::InProgress),
            2 => Some(Self::Completed),
            _ => None,
        }
    }

    /// Label the remote store uses for this status.
    #[must_use]
    pub const fn remote_label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
        }
    }

    /// Parses a remote status label.
    #[must_use]
    pub fn from_remote_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.remote_label() == label)
    }

    /// Column heading shown on the board.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// The column to the left, if any.
    #[must_use]
    pub const fn prev(self) -> Option<Self> {
        match self {
            Self::Pending => None,
            Self::InProgress => Some(Self::Pending),
            Self::Completed => Some(Self::InProgress),
        }
    }

    /// The column to the right, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::InProgress),
            Self::InProgress => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.remote_label())
    }
}

/// Priority of an event request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// Needs attention first.
    High,
    /// Default priority.
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// An event request tracked on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Stable store-assigned identifier.
    pub id: RecordId,
    /// Event title.
    pub title: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Person organizing the event.
    #[serde(default)]
    pub organizer: String,
    /// Person or team that requested the event.
    #[serde(default)]
    pub requester: String,
    /// Staff member accountable for delivering the event.
    #[serde(default)]
    pub responsible: String,
    /// Venue.
    #[serde(default)]
    pub location: String,
    /// Cost center the budget is charged to.
    #[serde(default)]
    pub cost_center: String,
    /// Kind of event (talk, training, meeting...).
    #[serde(default)]
    pub event_type: String,
    /// Delivery format (on-site, remote, hybrid).
    #[serde(default)]
    pub event_format: String,
    /// Request priority.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// First day of the event.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day of the event.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Expected headcount.
    #[serde(default)]
    pub estimated_attendees: Option<u32>,
    /// Expected budget in whole currency units.
    #[serde(default)]
    pub estimated_budget: Option<u64>,
    /// Internal notes.
    #[serde(default)]
    pub notes: String,
    /// Workflow status; decides the board column.
    pub status: WorkflowStatus,
}

impl Record {
    /// Creates a record with only the fields reconciliation cares about.
    #[must_use]
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>, status: WorkflowStatus) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            organizer: String::new(),
            requester: String::new(),
            responsible: String::new(),
            location: String::new(),
            cost_center: String::new(),
            event_type: String::new(),
            event_format: String::new(),
            priority: None,
            start_date: None,
            end_date: None,
            estimated_attendees: None,
            estimated_budget: None,
            notes: String::new(),
            status,
        }
    }

    /// Sets the organizer.
    #[must_use]
    pub fn with_organizer(mut self, organizer: impl Into<String>) -> Self {
        self.organizer = organizer.into();
        self
    }

    /// Sets the responsible staff member.
    #[must_use]
    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = responsible.into();
        self
    }

    /// Sets the start and end dates.
    #[must_use]
    pub const fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Formats a date the way cards and the search filter show it (`dd/mm/yyyy`).
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats a date range for a card, short-year form.
///
/// Returns `"N/A"` when both ends are missing, and the single known end
/// when only one is present.
#[must_use]
pub fn format_date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let short = |d: NaiveDate| d.format("%d/%m/%y").to_string();
    match (start, end) {
        (None, None) => "N/A".to_string(),
        (Some(s), None) => short(s),
        (None, Some(e)) => short(e),
        (Some(s), Some(e)) => format!("{} - {}", short(s), short(e)),
    }
}
