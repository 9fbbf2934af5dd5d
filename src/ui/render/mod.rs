//! UI rendering with ratatui.
//!
//! Muted chrome around the diff pane; a single accent color marks focus.

mod bars;
mod diff;
mod overlays;
mod sidebar;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame,
};

use super::app::{App, Mode};

/// Sidebar width in columns, borders included.
pub const SIDEBAR_WIDTH: u16 = 32;

/// Main render function.
pub fn render(frame: &mut Frame, app: &mut App) {
    let _timer = crate::metrics::Timer::start("render_frame");

    let bg_block = Block::default().style(Style::default().bg(app.theme.bg));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Top bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Bottom bar
        ])
        .split(frame.area());

    bars::render_top_bar(frame, app, chunks[0]);
    render_main(frame, app, chunks[1]);
    bars::render_bottom_bar(frame, app, chunks[2]);

    match app.ui.mode {
        Mode::Help => overlays::render_help_overlay(frame, app),
        Mode::AiMenu => overlays::render_ai_menu(frame, app),
        Mode::AiResult => overlays::render_ai_result(frame, app),
        Mode::Normal | Mode::FilterFiles => {}
    }
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);

    sidebar::render_sidebar(frame, app, chunks[0]);
    diff::render_diff(frame, app, chunks[1]);
}
