//! Application state and lifecycle.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::{diff_for_mode, AiService, DiffMode, FileDiff, GitError, PathFilter};
use crate::highlight::{FileHighlights, HighlighterCache};
use crate::theme::Theme;

use super::paint::ViewLayout;

mod ai;
mod diff;
mod filter;
mod navigation;
mod state;

pub use state::{AiState, Focus, Mode, SidebarState, UiState, ViewerState};

/// Source of raw diff text for a mode.
pub trait DiffLoader {
    /// Produce `git diff`-style text for `mode`.
    fn load(&self, mode: DiffMode) -> Result<String, GitError>;
}

/// Loads diffs by running git against a path.
#[derive(Debug, Clone)]
pub struct GitLoader {
    path: PathBuf,
}

impl GitLoader {
    /// Loader for the repository containing `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiffLoader for GitLoader {
    fn load(&self, mode: DiffMode) -> Result<String, GitError> {
        diff_for_mode(&self.path, mode)
    }
}

/// Application state.
pub struct App {
    loader: Box<dyn DiffLoader>,
    /// Which changes are shown.
    pub mode: DiffMode,
    /// Parsed files for the current mode.
    pub files: Vec<FileDiff>,
    /// Sidebar state.
    pub sidebar: SidebarState,
    /// Current focus.
    pub focus: Focus,
    /// Diff pane state.
    pub viewer: ViewerState,
    /// UI state (mode, messages).
    pub ui: UiState,
    /// Current color theme.
    pub theme: Theme,
    /// Should the app quit?
    pub should_quit: bool,
    /// AI request state.
    pub ai_state: AiState,

    ai: Option<Arc<AiService>>,
    highlighter: HighlighterCache,
    highlights: Option<FileHighlights>,
    path_filter: PathFilter,
}

impl App {
    /// Create an app showing `files`, already loaded for `mode`.
    pub fn new(
        loader: Box<dyn DiffLoader>,
        mode: DiffMode,
        files: Vec<FileDiff>,
        theme: Theme,
        layout: ViewLayout,
    ) -> Self {
        let mut app = Self {
            loader,
            mode,
            files,
            sidebar: SidebarState::default(),
            focus: Focus::Sidebar,
            viewer: ViewerState {
                layout,
                ..Default::default()
            },
            ui: UiState {
                dirty: true,
                ..Default::default()
            },
            theme,
            should_quit: false,
            ai_state: AiState::default(),
            ai: None,
            highlighter: HighlighterCache::new(),
            highlights: None,
            path_filter: PathFilter::new(),
        };
        app.select_file(0);
        app
    }

    /// Get the currently selected file.
    pub fn selected_file(&self) -> Option<&FileDiff> {
        self.files.get(self.sidebar.selected_idx)
    }

    /// Syntax spans for the selected file, when computed.
    pub fn selected_highlights(&self) -> Option<&FileHighlights> {
        self.highlights.as_ref()
    }

    /// Added and deleted line totals across all files.
    pub fn totals(&self) -> (usize, usize) {
        self.files
            .iter()
            .fold((0, 0), |(a, d), f| (a + f.additions(), d + f.deletions()))
    }

    /// `(current, total)` hunk position of the viewport in the selected file.
    pub fn current_hunk_info(&self) -> Option<(usize, usize)> {
        let starts = &self.viewer.hunk_starts;
        if starts.is_empty() {
            return None;
        }
        let current = starts
            .iter()
            .rposition(|&row| row <= self.viewer.scroll_y)
            .map_or(1, |i| i + 1);
        Some((current, starts.len()))
    }

    /// Open the in-app help overlay.
    pub fn open_help(&mut self) {
        self.ui.mode = Mode::Help;
        self.ui.dirty = true;
    }

    /// Close the help overlay.
    pub fn close_help(&mut self) {
        if self.ui.mode == Mode::Help {
            self.ui.mode = Mode::Normal;
            self.ui.dirty = true;
        }
    }

    /// Mark dirty for redraw.
    pub fn mark_dirty(&mut self) {
        self.ui.dirty = true;
    }

    /// Clear dirty flag after drawing.
    pub fn clear_dirty(&mut self) {
        self.ui.dirty = false;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::parse_diff;
    use crate::ui::rows::DiffRow;

    pub(crate) struct FixedLoader {
        pub all: &'static str,
        pub staged: &'static str,
        pub unstaged: &'static str,
    }

    impl DiffLoader for FixedLoader {
        fn load(&self, mode: DiffMode) -> Result<String, GitError> {
            Ok(match mode {
                DiffMode::All => self.all,
                DiffMode::Staged => self.staged,
                DiffMode::Unstaged => self.unstaged,
            }
            .to_string())
        }
    }

    pub(crate) const TWO_FILES: &str = "diff --git a/src/lib.rs b/src/lib.rs
@@ -1,2 +1,2 @@
 fn a() {}
-fn b() {}
+fn c() {}
@@ -30,2 +30,2 @@
-x
+y
diff --git a/README.md b/README.md
@@ -1 +1 @@
-old
+new
";

    pub(crate) fn app_with(all: &'static str, staged: &'static str, unstaged: &'static str) -> App {
        let loader = FixedLoader { all, staged, unstaged };
        let files = parse_diff(all).unwrap();
        App::new(
            Box::new(loader),
            DiffMode::All,
            files,
            Theme::builtin_default(),
            ViewLayout::Split,
        )
    }

    #[test]
    fn starts_on_first_file() {
        let app = app_with(TWO_FILES, "", "");
        assert_eq!(app.selected_file().unwrap().new_path, "src/lib.rs");
        assert_eq!(app.viewer.rows[0], DiffRow::FileHeader { file: 0 });
        assert_eq!(app.viewer.hunk_starts, vec![2, 7]);
        assert_eq!(app.totals(), (3, 3));
        assert!(app.ui.dirty);
    }

    #[test]
    fn hunk_info_follows_scroll() {
        let mut app = app_with(TWO_FILES, "", "");
        assert_eq!(app.current_hunk_info(), Some((1, 2)));
        app.viewer.scroll_y = 7;
        assert_eq!(app.current_hunk_info(), Some((2, 2)));
    }

    #[test]
    fn empty_diff_has_no_selection() {
        let app = app_with("", "", "");
        assert!(app.selected_file().is_none());
        assert!(app.viewer.rows.is_empty());
        assert_eq!(app.current_hunk_info(), None);
    }

    #[test]
    fn help_toggles() {
        let mut app = app_with(TWO_FILES, "", "");
        app.open_help();
        assert_eq!(app.ui.mode, Mode::Help);
        app.close_help();
        assert_eq!(app.ui.mode, Mode::Normal);
    }
}
