use super::{App, Focus};

impl App {
    /// Move selection up in the sidebar list.
    pub fn select_prev(&mut self) {
        let visible = self.visible_files();
        if let Some(pos) = visible.iter().position(|&i| i == self.sidebar.selected_idx) {
            if pos > 0 {
                self.select_file(visible[pos - 1]);
            }
        }
    }

    /// Move selection down in the sidebar list.
    pub fn select_next(&mut self) {
        let visible = self.visible_files();
        match visible.iter().position(|&i| i == self.sidebar.selected_idx) {
            Some(pos) if pos + 1 < visible.len() => self.select_file(visible[pos + 1]),
            None if !visible.is_empty() => self.select_file(visible[0]),
            _ => {}
        }
    }

    /// Scroll the diff pane by `delta` rows, clamped to the content.
    pub fn scroll_diff(&mut self, delta: isize) {
        let target = self.viewer.scroll_y.saturating_add_signed(delta);
        let clamped = target.min(self.viewer.max_scroll());
        if clamped != self.viewer.scroll_y {
            self.viewer.scroll_y = clamped;
            self.ui.dirty = true;
        }
    }

    /// Scroll by one viewport height.
    pub fn page_down(&mut self) {
        let page = self.page_size();
        self.scroll_diff(page);
    }

    /// Scroll back by one viewport height.
    pub fn page_up(&mut self) {
        let page = self.page_size();
        self.scroll_diff(-page);
    }

    fn page_size(&self) -> isize {
        isize::try_from(self.viewer.viewport_height.max(1)).unwrap_or(isize::MAX)
    }

    /// Jump to the first row.
    pub fn scroll_top(&mut self) {
        self.viewer.scroll_y = 0;
        self.ui.dirty = true;
    }

    /// Jump to the last row.
    pub fn scroll_bottom(&mut self) {
        self.viewer.scroll_y = self.viewer.max_scroll();
        self.ui.dirty = true;
    }

    /// Scroll to the next hunk below the viewport top.
    pub fn next_hunk(&mut self) {
        let scroll = self.viewer.scroll_y;
        if let Some(&row) = self.viewer.hunk_starts.iter().find(|&&row| row > scroll) {
            self.viewer.scroll_y = row;
            self.ui.dirty = true;
        }
    }

    /// Scroll to the previous hunk above the viewport top.
    pub fn prev_hunk(&mut self) {
        let scroll = self.viewer.scroll_y;
        if let Some(&row) = self.viewer.hunk_starts.iter().rev().find(|&&row| row < scroll) {
            self.viewer.scroll_y = row;
            self.ui.dirty = true;
        }
    }

    /// Switch between split and unified layouts.
    pub fn toggle_layout(&mut self) {
        self.viewer.layout = self.viewer.layout.toggled();
        self.ui.status = Some(format!("{} view", self.viewer.layout.label()));
        self.ui.dirty = true;
    }

    /// Switch focus between sidebar and diff view.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Diff,
            Focus::Diff => Focus::Sidebar,
        };
        self.ui.dirty = true;
    }

    /// Explicitly set the UI focus.
    pub fn set_focus(&mut self, focus: Focus) {
        if self.focus != focus {
            self.focus = focus;
            self.ui.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ui::app::tests::{app_with, TWO_FILES};
    use crate::ui::app::Focus;
    use crate::ui::paint::ViewLayout;

    #[test]
    fn selection_stays_in_bounds() {
        let mut app = app_with(TWO_FILES, "", "");
        app.select_prev();
        assert_eq!(app.sidebar.selected_idx, 0);
        app.select_next();
        app.select_next();
        assert_eq!(app.sidebar.selected_idx, 1);
        app.select_prev();
        assert_eq!(app.sidebar.selected_idx, 0);
    }

    #[test]
    fn selecting_resets_scroll() {
        let mut app = app_with(TWO_FILES, "", "");
        app.scroll_diff(5);
        assert_eq!(app.viewer.scroll_y, 5);
        app.select_next();
        assert_eq!(app.viewer.scroll_y, 0);
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut app = app_with(TWO_FILES, "", "");
        app.scroll_diff(-3);
        assert_eq!(app.viewer.scroll_y, 0);
        app.scroll_diff(1000);
        assert_eq!(app.viewer.scroll_y, app.viewer.rows.len() - 1);
        app.scroll_top();
        app.viewer.viewport_height = 4;
        app.page_down();
        assert_eq!(app.viewer.scroll_y, 4);
        app.page_up();
        assert_eq!(app.viewer.scroll_y, 0);
        app.scroll_bottom();
        assert_eq!(app.viewer.scroll_y, 9);
    }

    #[test]
    fn hunk_jumps() {
        let mut app = app_with(TWO_FILES, "", "");
        app.next_hunk();
        assert_eq!(app.viewer.scroll_y, 2);
        app.next_hunk();
        assert_eq!(app.viewer.scroll_y, 7);
        app.next_hunk();
        assert_eq!(app.viewer.scroll_y, 7);
        app.prev_hunk();
        assert_eq!(app.viewer.scroll_y, 2);
        app.prev_hunk();
        assert_eq!(app.viewer.scroll_y, 2);
    }

    #[test]
    fn toggles() {
        let mut app = app_with(TWO_FILES, "", "");
        app.toggle_layout();
        assert_eq!(app.viewer.layout, ViewLayout::Unified);
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Diff);
        app.set_focus(Focus::Sidebar);
        assert_eq!(app.focus, Focus::Sidebar);
    }
}
