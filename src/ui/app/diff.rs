use super::App;
use crate::core::parse_diff;
use crate::highlight::FileHighlights;
use crate::ui::rows::{hunk_starts, push_file_rows};

impl App {
    /// Select file `idx` and rebuild its rows and syntax spans.
    pub fn select_file(&mut self, idx: usize) {
        self.viewer.rows.clear();
        self.viewer.hunk_starts.clear();
        self.viewer.scroll_y = 0;
        self.highlights = None;

        let Some(file) = self.files.get(idx) else {
            self.sidebar.selected_idx = 0;
            self.ui.dirty = true;
            return;
        };
        self.sidebar.selected_idx = idx;

        push_file_rows(&mut self.viewer.rows, idx, file);
        self.viewer.hunk_starts = hunk_starts(&self.viewer.rows);

        let _timer = crate::metrics::Timer::start("highlight_file");
        self.highlights = Some(FileHighlights::compute(&self.highlighter, file));
        self.ui.dirty = true;
    }

    /// Reload the diff for the current mode.
    ///
    /// Keeps the selected path when it is still present, otherwise selects the
    /// first visible file. On failure the file list is emptied and the error
    /// is shown in the status bar.
    pub fn reload(&mut self) {
        let previous = self.selected_file().map(|f| f.new_path.clone());

        let loaded = {
            let _timer = crate::metrics::Timer::start("load_diff");
            self.loader.load(self.mode)
        };
        self.ui.error = None;
        self.files = match loaded {
            Ok(text) => match parse_diff(&text) {
                Ok(files) => files,
                Err(e) => {
                    self.ui.error = Some(format!("failed to parse diff: {e}"));
                    Vec::new()
                }
            },
            Err(e) => {
                self.ui.error = Some(format!("git diff failed: {e}"));
                Vec::new()
            }
        };

        self.recompute_filter();
        let idx = previous
            .and_then(|path| self.files.iter().position(|f| f.new_path == path))
            .filter(|&idx| self.is_file_visible(idx))
            .or_else(|| self.visible_files().first().copied())
            .unwrap_or(0);
        self.select_file(idx);
    }

    /// Switch to the next diff mode (All, Staged, Unstaged) and reload.
    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
        self.reload();
        if self.ui.error.is_none() {
            self.ui.status = Some(format!("Showing {}", self.mode.label()));
        }
    }
}
