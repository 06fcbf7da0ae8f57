//! Board rendering: three workflow columns of cards.
//!
//! While a card is picked up, its original slot is drawn as a placeholder
//! and a preview line marks where it would land. The board itself does not
//! change until the card is dropped.

use eventboard_proto::record::{Record, WorkflowStatus, format_date_range};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use super::theme;
use crate::app::{App, Cursor, LoadState, PanelFocus};
use crate::board::BoardView;

/// Render the board, or the loading/error placeholder.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    match &app.load_state {
        LoadState::Loading => render_message(frame, area, "Loading records...", theme::dimmed()),
        LoadState::Failed(reason) => render_message(
            frame,
            area,
            &format!("Could not load records: {reason}\n\nPress r to retry."),
            theme::notice(crate::app::NoticeLevel::Error),
        ),
        LoadState::Ready => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                ])
                .split(area);

            let view = app.view();
            for (status, chunk) in WorkflowStatus::ALL.into_iter().zip(chunks.iter()) {
                render_column(frame, *chunk, app, &view, status);
            }
        }
    }
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, style: ratatui::style::Style) {
    let block = Block::default().title("Board").borders(Borders::ALL);
    let paragraph = Paragraph::new(text.to_string())
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Render one column with its cards.
fn render_column(frame: &mut Frame, area: Rect, app: &App, view: &BoardView<'_>, status: WorkflowStatus) {
    let session = app.board.session();
    let dragging = session.is_dragging();
    let active_cursor = if dragging { app.drop_cursor } else { app.cursor };
    let is_focused = app.focus == PanelFocus::Board && active_cursor.column == status;

    let dragged = session
        .active_id()
        .and_then(|id| app.board.state().get(id));

    let cards = view.column(status);
    let mut items: Vec<ListItem> = Vec::with_capacity(cards.len() + 1);

    for (row, record) in cards.iter().enumerate() {
        let here = Cursor { column: status, row };
        if let Some(dragged) = dragged
            && app.drop_cursor == here
        {
            items.push(drop_preview(dragged));
        }

        let style = if dragged.is_some_and(|d| d.id == record.id) {
            theme::drag_placeholder()
        } else if !dragging && app.focus == PanelFocus::Board && app.cursor == here {
            theme::selected()
        } else if app.board.is_in_flight(record.id) {
            theme::saving()
        } else {
            theme::normal()
        };
        items.push(card(record, style, app.board.is_in_flight(record.id)));
    }

    if let Some(dragged) = dragged
        && app.drop_cursor
            == (Cursor {
                column: status,
                row: cards.len(),
            })
    {
        items.push(drop_preview(dragged));
    }

    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "Drop cards here",
            theme::dimmed(),
        ))));
    }

    let title = Line::from(vec![
        Span::styled(status.title(), theme::panel_title(theme::column_color(status))),
        Span::styled(format!(" ({})", view.count(status)), theme::dimmed()),
    ]);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    frame.render_widget(List::new(items).block(block), area);
}

/// A card: priority dot and title, then organizer and dates.
fn card(record: &Record, style: ratatui::style::Style, saving: bool) -> ListItem<'static> {
    let mut title = vec![];
    if let Some(priority) = record.priority {
        title.push(Span::styled("● ", theme::normal().fg(theme::priority_color(priority))));
    }
    title.push(Span::styled(record.title.clone(), style));
    if saving {
        title.push(Span::styled(" (saving…)", theme::saving()));
    }

    let organizer = if record.organizer.is_empty() {
        "N/A"
    } else {
        record.organizer.as_str()
    };
    let details = Line::from(Span::styled(
        format!(
            "  {organizer} | {}",
            format_date_range(record.start_date, record.end_date)
        ),
        theme::dimmed(),
    ));

    ListItem::new(vec![Line::from(title), details, Line::raw("")])
}

fn drop_preview(record: &Record) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        format!("▶ {}", record.title),
        theme::drop_preview(),
    )))
}
