//! Input handling.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::app::{App, Focus, Mode};
use crate::core::AiTask;

/// Handle a crossterm event.
/// Returns true if the event was handled.
pub fn handle_input(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Resize(_, _) => {
            app.mark_dirty();
            true
        }
        _ => false,
    }
}

/// Handle a key event.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return true;
    }

    match app.ui.mode {
        Mode::FilterFiles => return handle_filter_key(app, key),
        Mode::Help => return handle_help_key(app, key),
        Mode::AiMenu => return handle_ai_menu_key(app, key),
        Mode::AiResult => return handle_ai_result_key(app, key),
        Mode::Normal => app.ui.status = None,
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return true;
        }
        KeyCode::Tab => {
            app.toggle_focus();
            return true;
        }
        KeyCode::Char('?') => {
            app.open_help();
            return true;
        }
        KeyCode::Char('/') => {
            app.set_focus(Focus::Sidebar);
            app.start_filter();
            return true;
        }
        KeyCode::Char('f') => {
            app.cycle_mode();
            return true;
        }
        KeyCode::Char('u') => {
            app.toggle_layout();
            return true;
        }
        KeyCode::Char('{') => {
            app.prev_hunk();
            return true;
        }
        KeyCode::Char('}') => {
            app.next_hunk();
            return true;
        }
        KeyCode::Char('[') => {
            app.select_prev();
            return true;
        }
        KeyCode::Char(']') => {
            app.select_next();
            return true;
        }
        KeyCode::Char('a') => {
            app.open_ai_menu();
            return true;
        }
        KeyCode::Char('A') => {
            app.show_ai_result();
            return true;
        }
        KeyCode::PageDown => {
            app.page_down();
            return true;
        }
        KeyCode::PageUp => {
            app.page_up();
            return true;
        }
        KeyCode::Char('g') => {
            app.scroll_top();
            return true;
        }
        KeyCode::Char('G') => {
            app.scroll_bottom();
            return true;
        }
        KeyCode::Esc if app.sidebar.filtered_indices.is_some() => {
            app.cancel_filter();
            return true;
        }
        _ => {}
    }

    // Focus-specific keys
    match app.focus {
        Focus::Sidebar => handle_sidebar_key(app, key),
        Focus::Diff => handle_diff_key(app, key),
    }
}

/// Handle keys when sidebar is focused.
fn handle_sidebar_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.select_next();
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.select_prev();
            true
        }
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
            app.set_focus(Focus::Diff);
            true
        }
        _ => false,
    }
}

/// Handle keys when diff view is focused.
fn handle_diff_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_diff(1);
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_diff(-1);
            true
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.set_focus(Focus::Sidebar);
            true
        }
        _ => false,
    }
}

/// Handle keys while typing a filter query.
fn handle_filter_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.cancel_filter();
            true
        }
        KeyCode::Enter => {
            app.apply_filter();
            true
        }
        KeyCode::Backspace => {
            app.pop_filter_char();
            true
        }
        KeyCode::Down => {
            app.select_next();
            true
        }
        KeyCode::Up => {
            app.select_prev();
            true
        }
        KeyCode::Char(c) => {
            app.push_filter_char(c);
            true
        }
        _ => false,
    }
}

/// Any of `?`, Esc or `q` closes the help overlay.
fn handle_help_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            app.close_help();
            true
        }
        _ => false,
    }
}

fn handle_ai_menu_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.close_ai_overlay();
            true
        }
        KeyCode::Char(c) => match AiTask::from_key(c) {
            Some(task) => {
                app.start_ai_task(task);
                true
            }
            None => false,
        },
        _ => false,
    }
}

fn handle_ai_result_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
            app.close_ai_overlay();
            true
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_ai_result(1);
            true
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_ai_result(-1);
            true
        }
        _ => false,
    }
}
