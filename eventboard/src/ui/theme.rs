//! Theme and styling constants for the TUI.

use eventboard_proto::record::{Priority, WorkflowStatus};
use ratatui::style::{Color, Modifier, Style};

use crate::app::NoticeLevel;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success/online indicator color.
pub const SUCCESS: Color = Color::Green;

/// Warning indicator color.
pub const WARNING: Color = Color::Yellow;

/// Error indicator color.
pub const ERROR: Color = Color::Red;

/// Offline indicator color.
pub const OFFLINE: Color = Color::DarkGray;

/// Panel title color per workflow column.
#[must_use]
pub const fn column_color(status: WorkflowStatus) -> Color {
    match status {
        WorkflowStatus::Pending => Color::Yellow,
        WorkflowStatus::InProgress => Color::Blue,
        WorkflowStatus::Completed => Color::Green,
    }
}

/// Badge color for a priority.
#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (card metadata, placeholders).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused panel borders).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected card style.
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Style for the slot a dragged card was lifted from.
#[must_use]
pub fn drag_placeholder() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::CROSSED_OUT)
}

/// Style for the preview of where a dragged card would land.
#[must_use]
pub fn drop_preview() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightMagenta)
        .add_modifier(Modifier::BOLD)
}

/// Style for cards whose move is still being saved.
#[must_use]
pub fn saving() -> Style {
    Style::default()
        .fg(Color::Rgb(180, 180, 120))
        .add_modifier(Modifier::ITALIC)
}

/// Style for the input cursor (bright white, bold).
#[must_use]
pub fn input_cursor() -> Style {
    Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Style for a status-line notice.
#[must_use]
pub fn notice(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Info => Style::default().fg(WARNING),
        NoticeLevel::Error => Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
    }
}
