use super::{App, Mode};

impl App {
    /// Start filtering files in sidebar.
    pub fn start_filter(&mut self) {
        self.ui.mode = Mode::FilterFiles;
        self.sidebar.filter.clear();
        self.recompute_filter();
        self.ui.dirty = true;
    }

    /// Append a typed character to the query.
    pub fn push_filter_char(&mut self, c: char) {
        self.sidebar.filter.push(c);
        self.update_filter_live();
    }

    /// Remove the last query character.
    pub fn pop_filter_char(&mut self) {
        self.sidebar.filter.pop();
        self.update_filter_live();
    }

    /// Keep the current query and return to normal mode.
    pub fn apply_filter(&mut self) {
        self.recompute_filter();
        self.ui.mode = Mode::Normal;
        self.ui.dirty = true;
    }

    /// Cancel filter and restore full list.
    pub fn cancel_filter(&mut self) {
        self.ui.mode = Mode::Normal;
        self.sidebar.filter.clear();
        self.sidebar.filtered_indices = None;
        self.ui.dirty = true;
    }

    fn update_filter_live(&mut self) {
        self.recompute_filter();
        self.ui.dirty = true;
    }

    pub(super) fn recompute_filter(&mut self) {
        let query = self.sidebar.filter.trim();
        if query.is_empty() {
            self.sidebar.filtered_indices = None;
            return;
        }

        let paths: Vec<&str> = self.files.iter().map(|f| f.new_path.as_str()).collect();
        let ranked = self.path_filter.rank(query, &paths);

        if let Some(&first) = ranked.first() {
            if !ranked.contains(&self.sidebar.selected_idx) {
                self.sidebar.filtered_indices = Some(ranked);
                self.select_file(first);
                return;
            }
        }
        self.sidebar.filtered_indices = Some(ranked);
    }

    /// Indices of files shown in the sidebar, in display order.
    pub fn visible_files(&self) -> Vec<usize> {
        match &self.sidebar.filtered_indices {
            Some(indices) => indices.clone(),
            None => (0..self.files.len()).collect(),
        }
    }

    /// Check if a file index is visible (passes filter).
    pub fn is_file_visible(&self, idx: usize) -> bool {
        match &self.sidebar.filtered_indices {
            Some(indices) => indices.contains(&idx),
            None => idx < self.files.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ui::app::tests::{app_with, TWO_FILES};
    use crate::ui::app::Mode;

    #[test]
    fn typing_narrows_and_selects_match() {
        let mut app = app_with(TWO_FILES, "", "");
        app.start_filter();
        assert_eq!(app.ui.mode, Mode::FilterFiles);
        for c in "readme".chars() {
            app.push_filter_char(c);
        }
        assert_eq!(app.visible_files(), vec![1]);
        assert_eq!(app.sidebar.selected_idx, 1);

        app.apply_filter();
        assert_eq!(app.ui.mode, Mode::Normal);
        assert_eq!(app.visible_files(), vec![1]);
    }

    #[test]
    fn escape_clears_query() {
        let mut app = app_with(TWO_FILES, "", "");
        app.start_filter();
        app.push_filter_char('z');
        app.push_filter_char('z');
        assert!(app.visible_files().is_empty());
        app.cancel_filter();
        assert_eq!(app.visible_files(), vec![0, 1]);
        assert!(app.sidebar.filter.is_empty());
    }

    #[test]
    fn backspace_widens() {
        let mut app = app_with(TWO_FILES, "", "");
        app.start_filter();
        app.push_filter_char('q');
        assert!(app.visible_files().is_empty());
        app.pop_filter_char();
        assert_eq!(app.visible_files(), vec![0, 1]);
    }
}
