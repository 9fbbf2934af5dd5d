//! Sidebar file list rendering.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::FileStatus;
use crate::ui::app::{App, Focus};

/// Columns left for the path after indicator, badge and counts.
const PATH_WIDTH: usize = 22;

/// Render the file list sidebar.
pub fn render_sidebar(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Sidebar;

    let border_color = if is_focused {
        app.theme.border_active
    } else {
        app.theme.border
    };
    let title_style = if is_focused {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.text_muted)
    };

    let visible_indices = app.visible_files();
    let title = match &app.sidebar.filtered_indices {
        None => format!(" Files ({}) ", app.files.len()),
        Some(indices) => format!(" Files ({}) [filter: {}] ", indices.len(), app.sidebar.filter),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, title_style))
        .style(Style::default().bg(app.theme.bg_surface));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let height = inner.height as usize;
    if height == 0 {
        return;
    }

    if visible_indices.is_empty() {
        let msg = if app.files.is_empty() {
            "No files"
        } else {
            "No matches"
        };
        let para = Paragraph::new(msg).style(
            Style::default()
                .fg(app.theme.text_muted)
                .bg(app.theme.bg_surface),
        );
        frame.render_widget(para, inner);
        return;
    }

    let selected_pos = visible_indices
        .iter()
        .position(|&idx| idx == app.sidebar.selected_idx)
        .unwrap_or(0);

    // Keep selection visible
    let max_scroll = visible_indices.len().saturating_sub(height);
    app.sidebar.scroll = app.sidebar.scroll.min(max_scroll);
    if selected_pos < app.sidebar.scroll {
        app.sidebar.scroll = selected_pos;
    } else if selected_pos >= app.sidebar.scroll + height {
        app.sidebar.scroll = selected_pos + 1 - height;
    }

    let mut lines: Vec<Line> = Vec::with_capacity(height);
    for &idx in visible_indices.iter().skip(app.sidebar.scroll).take(height) {
        let file = &app.files[idx];
        let is_selected = idx == app.sidebar.selected_idx;

        let row_bg = if is_selected {
            app.theme.bg_selected
        } else {
            app.theme.bg_surface
        };

        let select_indicator = if is_selected { "▌" } else { " " };
        let select_style = Style::default()
            .fg(if is_selected { app.theme.accent } else { row_bg })
            .bg(row_bg);

        let status = file.status();
        let badge_color = match status {
            FileStatus::New => app.theme.success,
            FileStatus::Modified => app.theme.warning,
            FileStatus::Deleted => app.theme.error,
            FileStatus::Renamed => app.theme.accent,
        };

        let text_color = if is_selected {
            app.theme.text_bright
        } else {
            app.theme.text_normal
        };

        lines.push(Line::from(vec![
            Span::styled(select_indicator, select_style),
            Span::styled(status.badge(), Style::default().fg(badge_color).bg(row_bg)),
            Span::styled(" ", Style::default().bg(row_bg)),
            Span::styled(
                truncate_path(&file.new_path, PATH_WIDTH),
                Style::default().fg(text_color).bg(row_bg),
            ),
        ]));
    }

    let para = Paragraph::new(lines).style(Style::default().bg(app.theme.bg_surface));
    frame.render_widget(para, inner);
}

/// Keep the tail of `path`, marking a cut with a leading `…`.
fn truncate_path(path: &str, width: usize) -> String {
    let char_count = path.chars().count();
    if char_count <= width {
        return path.to_string();
    }
    let skip = char_count - width + 1;
    let tail: String = path.chars().skip(skip).collect();
    format!("…{tail}")
}
