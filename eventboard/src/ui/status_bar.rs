//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, LoadState, PanelFocus};

/// Render the status bar at the bottom of the screen.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.focus {
        PanelFocus::Search => "Enter: done | Esc: clear search",
        PanelFocus::Board if app.board.session().is_dragging() => {
            "←→↑↓: choose spot | Enter/Space: drop | Esc: cancel"
        }
        PanelFocus::Board if matches!(app.load_state, LoadState::Failed(_)) => {
            "r: retry | q: quit"
        }
        PanelFocus::Board => "←→↑↓/hjkl: select | Space: pick up | /: search | q: quit",
    };

    let (dot_color, status_text) = if app.is_connected {
        (theme::SUCCESS, format!("Connected via {}", app.connection_info))
    } else if app.load_state == LoadState::Loading {
        (theme::WARNING, "Connecting...".to_string())
    } else {
        (theme::OFFLINE, "Disconnected".to_string())
    };

    let mut spans = vec![
        Span::styled("EventBoard v0.1.0", theme::bold()),
        Span::raw(" | "),
        Span::styled("●", theme::normal().fg(dot_color)),
        Span::raw(format!(" {status_text}")),
    ];

    let saving = app.board.in_flight_count();
    if saving > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(format!("saving {saving}"), theme::saving()));
    }

    spans.push(Span::raw(" | "));
    match &app.notice {
        Some(notice) => spans.push(Span::styled(notice.text.as_str(), theme::notice(notice.level))),
        None => spans.push(Span::styled(help_text, theme::dimmed())),
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
