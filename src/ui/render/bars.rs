//! Top and bottom bar rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::ui::app::{App, Focus, Mode};
use crate::ui::paint::display_width;

/// Render the top bar: mode, selected file, totals and hunk position.
pub fn render_top_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bar = Style::default().bg(app.theme.bg_surface);

    let mut spans = vec![
        Span::styled(" ", bar),
        Span::styled(
            format!(" {} ", app.mode.label()),
            Style::default()
                .fg(app.theme.bg)
                .bg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ", bar),
    ];

    match app.selected_file() {
        Some(file) => {
            spans.push(Span::styled(
                file.new_path.clone(),
                bar.fg(app.theme.text_bright).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!("  +{}", file.additions()),
                bar.fg(app.theme.success),
            ));
            spans.push(Span::styled(
                format!(" -{}", file.deletions()),
                bar.fg(app.theme.error),
            ));
        }
        None => spans.push(Span::styled("No files", bar.fg(app.theme.text_muted))),
    }

    let (added, deleted) = app.totals();
    let mut right_text = format!("{} files +{added} -{deleted}  ", app.files.len());
    if let Some((cur, tot)) = app.current_hunk_info() {
        right_text = format!("hunk {cur}/{tot}  {right_text}");
    }

    let left_len: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let padding_len = (area.width as usize)
        .saturating_sub(left_len)
        .saturating_sub(display_width(&right_text));
    spans.push(Span::styled(" ".repeat(padding_len), bar));
    spans.push(Span::styled(right_text, bar.fg(app.theme.text_muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
}

/// Render the bottom bar with mode-specific hints.
pub fn render_bottom_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bar = Style::default().bg(app.theme.bg_surface);

    if app.ui.mode == Mode::FilterFiles {
        let match_count = app.visible_files().len();
        let line = Line::from(vec![
            Span::styled(" Filter: ", bar.fg(app.theme.accent)),
            Span::styled(app.sidebar.filter.as_str(), bar.fg(app.theme.text_bright)),
            Span::styled("█", bar.fg(app.theme.accent)),
            Span::styled(
                format!(" ({}/{})", match_count, app.files.len()),
                bar.fg(app.theme.text_muted),
            ),
            Span::styled("  Enter: apply  Esc: clear", bar.fg(app.theme.text_muted)),
        ]);
        frame.render_widget(Paragraph::new(line).style(bar), area);
        return;
    }

    if let Some(err) = &app.ui.error {
        let line = Line::from(vec![
            Span::styled(" ✗ ", bar.fg(app.theme.error)),
            Span::styled(err.as_str(), bar.fg(app.theme.error)),
        ]);
        frame.render_widget(Paragraph::new(line).style(bar), area);
        return;
    }

    if let Some((task, _)) = &app.ai_state.pending {
        let line = Line::from(vec![
            Span::styled(" ⋯ ", bar.fg(app.theme.accent)),
            Span::styled(
                format!("{}: waiting for AI", task.title()),
                bar.fg(app.theme.text_muted),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).style(bar), area);
        return;
    }

    if let Some(msg) = &app.ui.status {
        let line = Line::from(vec![
            Span::styled(" ✓ ", bar.fg(app.theme.success)),
            Span::styled(msg.as_str(), bar.fg(app.theme.success)),
        ]);
        frame.render_widget(Paragraph::new(line).style(bar), area);
        return;
    }

    let focus_hints: &[(&str, &str)] = match app.focus {
        Focus::Sidebar => &[("j/k", "files"), ("↵", "open")],
        Focus::Diff => &[("j/k", "scroll"), ("{/}", "hunks")],
    };
    let common_hints: &[(&str, &str)] = &[
        ("/", "filter"),
        ("f", "mode"),
        ("u", "layout"),
        ("[/]", "file"),
        ("⇥", "switch"),
        ("?", "help"),
        ("q", "quit"),
    ];

    let mut spans = vec![Span::styled(" ", bar)];
    for (i, (key, desc)) in focus_hints.iter().chain(common_hints).enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", bar));
        }
        spans.push(Span::styled(*key, bar.fg(app.theme.accent)));
        spans.push(Span::styled(format!(" {desc}"), bar.fg(app.theme.text_muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
}
