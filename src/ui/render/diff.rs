//! Diff pane rendering.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::app::{App, Focus};
use crate::ui::paint::{FilePainter, PaintOptions};

/// Narrowest split column inside the diff pane.
const MIN_PANE_COLUMN: usize = 20;

/// Render the diff view.
pub fn render_diff(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focus == Focus::Diff;
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

    let title = format!(" Diff ({}) ", app.viewer.layout.label());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, title_style))
        .style(Style::default().bg(app.theme.bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    app.viewer.viewport_height = inner.height as usize;

    if let Some(err) = &app.ui.error {
        let msg = Paragraph::new(err.as_str())
            .style(Style::default().fg(app.theme.error))
            .wrap(Wrap { trim: false });
        frame.render_widget(msg, inner);
        return;
    }

    let Some(file) = app.selected_file() else {
        let msg = Paragraph::new("No changes to display")
            .style(Style::default().fg(app.theme.text_muted));
        frame.render_widget(msg, inner);
        return;
    };

    let painter = FilePainter::new(
        file,
        app.selected_highlights(),
        &app.theme,
        PaintOptions {
            layout: app.viewer.layout,
            width: inner.width as usize,
            min_column: MIN_PANE_COLUMN,
            color: true,
            clip: true,
        },
    );

    let lines: Vec<Line> = app
        .viewer
        .rows
        .iter()
        .skip(app.viewer.scroll_y)
        .take(inner.height as usize)
        .map(|row| painter.paint(row))
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}
