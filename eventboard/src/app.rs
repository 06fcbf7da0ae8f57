//! Application state and event handling.
//!
//! [`App`] owns the [`Board`] on the main thread. Key presses drive the drag
//! gesture and may produce a [`SyncCommand`] for the background worker;
//! [`SyncEvent`]s coming back are folded into the board and the notice line.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eventboard_proto::record::{Record, RecordId, WorkflowStatus};

use crate::board::{ApplyOutcome, Board, BoardState, BoardView, ColumnIndex, SettleOutcome, TargetId};
use crate::sync::{SyncCommand, SyncEvent};

/// Default lifetime of a notice on the status line.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(6);

/// Which part of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// The board (default).
    Board,
    /// The search box.
    Search,
}

/// Whether the initial fetch has completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Waiting for the store.
    Loading,
    /// Records are on the board.
    Ready,
    /// The fetch failed with this message.
    Failed(String),
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the user asked for did not happen.
    Error,
}

/// A transient message shown on the status line.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Message text.
    pub text: String,
    /// Severity.
    pub level: NoticeLevel,
    /// When the notice disappears.
    pub expires_at: Instant,
}

/// A row in one column of the filtered view.
///
/// While dragging, `row == count` addresses the empty space below the last
/// visible card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Column.
    pub column: WorkflowStatus,
    /// Row within the filtered column.
    pub row: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            column: WorkflowStatus::Pending,
            row: 0,
        }
    }
}

/// Main application state.
pub struct App {
    /// Records, drag gesture, and in-flight updates.
    pub board: Board,
    /// Whether records have been loaded.
    pub load_state: LoadState,
    /// Current search query.
    pub query: String,
    /// Which part of the screen is focused.
    pub focus: PanelFocus,
    /// Selected card.
    pub cursor: Cursor,
    /// Where the dragged card would land.
    pub drop_cursor: Cursor,
    /// Notice on the status line, if any.
    pub notice: Option<Notice>,
    /// How long notices stay visible.
    pub notice_ttl: Duration,
    /// Whether the last store interaction reached the store.
    pub is_connected: bool,
    /// Human-readable store description.
    pub connection_info: String,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App {
    /// Create a new application waiting for its first fetch.
    #[must_use]
    pub fn new(connection_info: impl Into<String>, notice_ttl: Duration) -> Self {
        Self {
            board: Board::default(),
            load_state: LoadState::Loading,
            query: String::new(),
            focus: PanelFocus::Board,
            cursor: Cursor::default(),
            drop_cursor: Cursor::default(),
            notice: None,
            notice_ttl,
            is_connected: false,
            connection_info: connection_info.into(),
            should_quit: false,
        }
    }

    /// The board filtered by the current query.
    #[must_use]
    pub fn view(&self) -> BoardView<'_> {
        self.board.view(&self.query)
    }

    /// The card under the cursor.
    #[must_use]
    pub fn selected_record(&self) -> Option<&Record> {
        self.view()
            .column(self.cursor.column)
            .get(self.cursor.row)
            .copied()
    }

    /// What the dragged card is currently over.
    ///
    /// The preview is drawn in front of the card at `drop_cursor.row`. A
    /// reorder lands the card after an anchor that sits below it, so below
    /// the dragged card in its own column the anchor is the card one row up.
    #[must_use]
    pub fn drop_target(&self) -> TargetId {
        let view = self.view();
        let cards = view.column(self.drop_cursor.column);
        let mut row = self.drop_cursor.row;
        if let Some(active) = self.board.session().active_id()
            && let Some(source_row) = cards.iter().position(|r| r.id == active)
            && source_row < row
            && row < cards.len()
        {
            row -= 1;
        }
        cards
            .get(row)
            .map_or(TargetId::Column(self.drop_cursor.column), |r| {
                TargetId::Record(r.id)
            })
    }

    /// Handle a key event, returning a command for the sync worker if the
    /// key requires one.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return None;
        }

        match self.focus {
            PanelFocus::Search => {
                self.handle_search_key(key);
                None
            }
            PanelFocus::Board if self.board.session().is_dragging() => self.handle_drag_key(key),
            PanelFocus::Board => self.handle_board_key(key),
        }
    }

    /// Handle key event when the search box is focused.
    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => self.query.push(c),
            KeyCode::Backspace => {
                self.query.pop();
            }
            KeyCode::Esc => {
                self.query.clear();
                self.focus = PanelFocus::Board;
            }
            KeyCode::Enter | KeyCode::Tab | KeyCode::Down => self.focus = PanelFocus::Board,
            _ => {}
        }
        self.clamp_cursor();
    }

    /// Handle key event when the board is focused and nothing is picked up.
    fn handle_board_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('/') => self.focus = PanelFocus::Search,
            KeyCode::Char('r') if matches!(self.load_state, LoadState::Failed(_)) => {
                self.load_state = LoadState::Loading;
                return Some(SyncCommand::Load);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.cursor = self.shifted_column(self.cursor, WorkflowStatus::prev, false);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.cursor = self.shifted_column(self.cursor, WorkflowStatus::next, false);
            }
            KeyCode::Up | KeyCode::Char('k') => self.cursor.row = self.cursor.row.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor.row + 1 < self.view().count(self.cursor.column) {
                    self.cursor.row += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => self.pick_up(),
            _ => {}
        }
        None
    }

    /// Handle key event while a card is picked up.
    fn handle_drag_key(&mut self, key: KeyEvent) -> Option<SyncCommand> {
        match key.code {
            KeyCode::Esc => {
                self.board.cancel_drag();
                return None;
            }
            KeyCode::Char(' ') | KeyCode::Enter => return self.put_down(),
            KeyCode::Left | KeyCode::Char('h') => {
                self.drop_cursor = self.shifted_column(self.drop_cursor, WorkflowStatus::prev, true);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.drop_cursor = self.shifted_column(self.drop_cursor, WorkflowStatus::next, true);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.drop_cursor.row = self.drop_cursor.row.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.drop_cursor.row < self.view().count(self.drop_cursor.column) {
                    self.drop_cursor.row += 1;
                }
            }
            _ => return None,
        }
        let target = self.drop_target();
        self.board.hover(Some(target));
        None
    }

    fn pick_up(&mut self) {
        let Some(id) = self.selected_record().map(|r| r.id) else {
            return;
        };
        if self.board.start_drag(id) {
            self.drop_cursor = self.cursor;
            let target = self.drop_target();
            self.board.hover(Some(target));
        } else if self.board.is_in_flight(id) {
            self.set_notice(NoticeLevel::Info, "Still saving the last move of this card");
        }
    }

    fn put_down(&mut self) -> Option<SyncCommand> {
        let target = self.drop_target();
        match self.board.drop_on(Some(target)) {
            ApplyOutcome::Unchanged => None,
            ApplyOutcome::Reordered { record_id, .. } => {
                self.follow(record_id);
                None
            }
            ApplyOutcome::Pending(ticket) => {
                self.follow(ticket.record_id);
                Some(SyncCommand::Persist(ticket))
            }
        }
    }

    /// Handle an event from the sync worker.
    pub fn handle_sync_event(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Loaded(records) => {
                self.board = Board::new(BoardState::from_records(records));
                self.load_state = LoadState::Ready;
                self.is_connected = true;
            }
            SyncEvent::LoadFailed(error) => {
                self.is_connected = !error.is_disconnect();
                self.set_notice(NoticeLevel::Error, format!("Could not load records: {error}"));
                self.load_state = LoadState::Failed(error.to_string());
            }
            SyncEvent::Persisted(ticket) => {
                self.board.settle(&ticket, Ok(()));
                self.is_connected = true;
            }
            SyncEvent::PersistFailed { ticket, error } => {
                let title = self
                    .board
                    .state()
                    .get(ticket.record_id)
                    .map_or_else(|| ticket.record_id.to_string(), |r| r.title.clone());
                if error.is_disconnect() {
                    self.is_connected = false;
                }
                let text = match self.board.settle(&ticket, Err(error.clone())) {
                    SettleOutcome::Compensated { .. } => format!(
                        "Could not move \"{title}\" to {}: {error}. Moved back to {}.",
                        ticket.to.title(),
                        ticket.from.title()
                    ),
                    _ => format!("Could not move \"{title}\" to {}: {error}.", ticket.to.title()),
                };
                self.set_notice(NoticeLevel::Error, text);
            }
        }
        self.clamp_cursor();
    }

    /// Expire the notice if its time is up.
    pub fn tick(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
    }

    fn set_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            level,
            expires_at: Instant::now() + self.notice_ttl,
        });
    }

    /// Move `cursor` one column over, keeping its row in range.
    fn shifted_column(
        &self,
        cursor: Cursor,
        step: fn(WorkflowStatus) -> Option<WorkflowStatus>,
        allow_end: bool,
    ) -> Cursor {
        let Some(column) = step(cursor.column) else {
            return cursor;
        };
        let count = self.view().count(column);
        let max_row = if allow_end {
            count
        } else {
            count.saturating_sub(1)
        };
        Cursor {
            column,
            row: cursor.row.min(max_row),
        }
    }

    /// Put the cursor on `id`, clearing the query if it hides the card.
    fn follow(&mut self, id: RecordId) {
        let position = {
            let view = self.view();
            WorkflowStatus::ALL.into_iter().find_map(|column| {
                view.ids(column)
                    .iter()
                    .position(|r| *r == id)
                    .map(|row| Cursor { column, row })
            })
        };
        if let Some(cursor) = position {
            self.cursor = cursor;
        } else if let Some((column, _)) = self.board.state().position(id) {
            self.cursor = Cursor { column, row: 0 };
        }
    }

    fn clamp_cursor(&mut self) {
        let count = self.view().count(self.cursor.column);
        self.cursor.row = self.cursor.row.min(count.saturating_sub(1));
    }
}
