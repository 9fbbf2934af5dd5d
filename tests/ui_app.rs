//! Interactive app driven against a real git repository.

use std::path::Path;
use std::process::Command;

use critica::core::{diff_for_mode, parse_diff, DiffMode};
use critica::theme::Theme;
use critica::ui::{handle_input, App, GitLoader, Mode, ViewLayout};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tempfile::TempDir;

const FILE_ALPHA: &str = "alpha.txt";
const FILE_RUST: &str = "src/lib.rs";
const FILE_NOTES: &str = "docs/notes.md";

fn git(dir: &Path, args: &[&str]) {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(out.status.success(), "git {:?} failed", args);
}

/// Repo with a staged change in alpha.txt, an unstaged change in
/// src/lib.rs and an untracked docs/notes.md.
fn setup_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path();

    git(path, &["init", "-q"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    std::fs::create_dir_all(path.join("src")).unwrap();
    std::fs::create_dir_all(path.join("docs")).unwrap();
    std::fs::write(path.join(FILE_ALPHA), "alpha\n").unwrap();
    let rust: String = (1..=30).map(|i| format!("fn f{i}() {{}}\n")).collect();
    std::fs::write(path.join(FILE_RUST), rust).unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-q", "-m", "initial"]);

    std::fs::write(path.join(FILE_ALPHA), "alpha changed\n").unwrap();
    git(path, &["add", FILE_ALPHA]);

    let rust: String = (1..=30)
        .map(|i| match i {
            2 => "fn second() {}\n".to_string(),
            25 => "fn twenty_fifth() {}\n".to_string(),
            _ => format!("fn f{i}() {{}}\n"),
        })
        .collect();
    std::fs::write(path.join(FILE_RUST), rust).unwrap();
    std::fs::write(path.join(FILE_NOTES), "# Notes\n").unwrap();

    dir
}

fn open_app(dir: &TempDir) -> App {
    let text = diff_for_mode(dir.path(), DiffMode::All).unwrap();
    let files = parse_diff(&text).unwrap();
    App::new(
        Box::new(GitLoader::new(dir.path())),
        DiffMode::All,
        files,
        Theme::builtin_default(),
        ViewLayout::Split,
    )
}

fn press(app: &mut App, code: KeyCode) {
    handle_input(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));
}

fn paths(app: &App) -> Vec<&str> {
    app.files.iter().map(|f| f.new_path.as_str()).collect()
}

#[test]
fn all_mode_lists_every_change() {
    let dir = setup_repo();
    let app = open_app(&dir);
    assert_eq!(paths(&app), vec![FILE_ALPHA, FILE_RUST, FILE_NOTES]);
}

#[test]
fn cycling_modes_reloads_from_git() {
    let dir = setup_repo();
    let mut app = open_app(&dir);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.mode, DiffMode::Staged);
    assert_eq!(paths(&app), vec![FILE_ALPHA]);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.mode, DiffMode::Unstaged);
    assert_eq!(paths(&app), vec![FILE_RUST, FILE_NOTES]);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.mode, DiffMode::All);
    assert_eq!(paths(&app).len(), 3);
}

#[test]
fn selection_survives_mode_change() {
    let dir = setup_repo();
    let mut app = open_app(&dir);

    press(&mut app, KeyCode::Char('j'));
    assert_eq!(app.selected_file().unwrap().new_path, FILE_RUST);

    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.selected_file().unwrap().new_path, FILE_ALPHA);

    press(&mut app, KeyCode::Char('f'));
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Char('f'));
    assert_eq!(app.mode, DiffMode::All);
    assert_eq!(app.selected_file().unwrap().new_path, FILE_NOTES);
}

#[test]
fn hunk_navigation_in_rust_file() {
    let dir = setup_repo();
    let mut app = open_app(&dir);
    press(&mut app, KeyCode::Char('j'));
    press(&mut app, KeyCode::Tab);

    assert_eq!(app.viewer.hunk_starts.len(), 2);
    press(&mut app, KeyCode::Char('}'));
    press(&mut app, KeyCode::Char('}'));
    assert_eq!(app.current_hunk_info(), Some((2, 2)));
    press(&mut app, KeyCode::Char('{'));
    assert_eq!(app.current_hunk_info(), Some((1, 2)));
}

#[test]
fn fuzzy_filter_narrows_sidebar() {
    let dir = setup_repo();
    let mut app = open_app(&dir);

    press(&mut app, KeyCode::Char('/'));
    assert_eq!(app.ui.mode, Mode::FilterFiles);
    for c in "notes".chars() {
        press(&mut app, KeyCode::Char(c));
    }
    press(&mut app, KeyCode::Enter);

    assert_eq!(app.visible_files(), vec![2]);
    assert_eq!(app.selected_file().unwrap().new_path, FILE_NOTES);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.visible_files().len(), 3);
}
