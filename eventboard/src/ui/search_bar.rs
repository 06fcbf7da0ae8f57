//! Search box rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::app::{App, PanelFocus};

/// Render the search box with match counts.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus == PanelFocus::Search;

    let mut spans = Vec::new();
    if app.query.is_empty() && !is_focused {
        spans.push(Span::styled(
            "Press / to search by title, organizer, location or date (dd/mm/yyyy)",
            theme::dimmed(),
        ));
    } else {
        spans.push(Span::styled(app.query.as_str(), theme::normal()));
        if is_focused {
            spans.push(Span::styled("█", theme::input_cursor()));
        }
    }

    let title = if app.query.is_empty() {
        "Search".to_string()
    } else {
        format!(
            "Search ({} of {})",
            app.view().total(),
            app.board.state().len()
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_focused {
            theme::highlighted()
        } else {
            theme::normal()
        });

    let paragraph = Paragraph::new(Line::from(spans)).block(block);

    frame.render_widget(paragraph, area);
}
