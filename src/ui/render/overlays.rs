//! Overlay rendering.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::AiTask;
use crate::ui::app::App;

/// Centered box of at most `width` by `height`, kept inside the frame.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2).max(1));
    let height = height.min(area.height.saturating_sub(2).max(1));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn overlay_block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent))
        .title(Span::styled(
            title,
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(app.theme.bg_surface))
}

const HELP_ENTRIES: [(&str, &str); 15] = [
    ("j/k or ↑/↓", "Navigate files / scroll diff"),
    ("PgUp / PgDn", "Scroll one page"),
    ("g / G", "Jump to top / bottom"),
    ("{ / }", "Previous / next hunk"),
    ("[ / ]", "Previous / next file"),
    ("Tab", "Switch focus between sidebar/diff"),
    ("h / l", "Focus sidebar / diff"),
    ("u", "Toggle split / unified view"),
    ("f", "Cycle All / Staged / Unstaged"),
    ("/", "Fuzzy filter files"),
    ("a", "AI actions (needs OPENAI_API_KEY)"),
    ("A", "Show last AI reply"),
    ("Esc", "Clear filter"),
    ("?", "Close this help overlay"),
    ("q or Ctrl+C", "Quit critica"),
];

/// Render the help overlay.
pub fn render_help_overlay(frame: &mut Frame, app: &App) {
    let overlay_area = centered(frame.area(), 60, HELP_ENTRIES.len() as u16 + 5);
    frame.render_widget(Clear, overlay_area);

    let bg = Style::default().bg(app.theme.bg_surface);
    let block = overlay_block(app, " Help ".to_string());

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "Press ? again, Esc, or q to close.",
            bg.fg(app.theme.text_muted),
        )),
        Line::from(Span::styled("", bg)),
    ];

    for (key, desc) in HELP_ENTRIES {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<16}", key), bg.fg(app.theme.accent)),
            Span::styled(desc, bg.fg(app.theme.text_normal)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).style(bg), inner);
}

/// Render the AI action menu.
pub fn render_ai_menu(frame: &mut Frame, app: &App) {
    let overlay_area = centered(frame.area(), 40, AiTask::ALL.len() as u16 + 4);
    frame.render_widget(Clear, overlay_area);

    let bg = Style::default().bg(app.theme.bg_surface);
    let block = overlay_block(app, " AI ".to_string());
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = AiTask::ALL
        .iter()
        .map(|task| {
            Line::from(vec![
                Span::styled(format!("{:<4}", task.key()), bg.fg(app.theme.accent)),
                Span::styled(task.title(), bg.fg(app.theme.text_normal)),
            ])
        })
        .collect();
    lines.push(Line::from(Span::styled("", bg)));
    lines.push(Line::from(Span::styled(
        "Esc to cancel",
        bg.fg(app.theme.text_muted),
    )));

    frame.render_widget(Paragraph::new(lines).style(bg), inner);
}

/// Render the last AI reply, wrapped and scrollable.
pub fn render_ai_result(frame: &mut Frame, app: &App) {
    let Some((task, text)) = &app.ai_state.output else {
        return;
    };
    let area = frame.area();
    let overlay_area = centered(area, area.width * 4 / 5, area.height * 4 / 5);
    frame.render_widget(Clear, overlay_area);

    let bg = Style::default().bg(app.theme.bg_surface);
    let block = overlay_block(app, format!(" {} ", task.title()));
    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let scroll = u16::try_from(app.ai_state.scroll).unwrap_or(u16::MAX);
    let body = Paragraph::new(text.as_str())
        .style(bg.fg(app.theme.text_normal))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(body, inner);
}
