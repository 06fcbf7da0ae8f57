//! Terminal UI rendering.

pub mod board_panel;
pub mod search_bar;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::App;

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    // Search box on top, board in the middle, status bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    search_bar::render(frame, main_chunks[0], app);
    board_panel::render(frame, main_chunks[1], app);
    status_bar::render(frame, main_chunks[2], app);
}
