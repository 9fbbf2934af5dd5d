use std::sync::mpsc::Receiver;

use crate::core::AiTask;
use crate::ui::paint::ViewLayout;
use crate::ui::rows::DiffRow;

/// Focus state for the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// File list.
    #[default]
    Sidebar,
    /// Diff pane.
    Diff,
}

/// UI mode (normal vs input modes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Normal navigation mode.
    #[default]
    Normal,
    /// Typing a fuzzy path query.
    FilterFiles,
    /// Viewing help overlay.
    Help,
    /// Choosing an AI action.
    AiMenu,
    /// Reading an AI reply.
    AiResult,
}

/// Sidebar navigation and filter state.
#[derive(Debug, Default)]
pub struct SidebarState {
    /// Currently selected file index.
    pub selected_idx: usize,
    /// Scroll offset (first visible file).
    pub scroll: usize,
    /// Filter query string.
    pub filter: String,
    /// Ranked file indices while a filter is active; `None` shows all.
    pub filtered_indices: Option<Vec<usize>>,
}

/// Diff pane viewport state.
#[derive(Debug, Default)]
pub struct ViewerState {
    /// Vertical scroll offset in rows.
    pub scroll_y: usize,
    /// Split or unified.
    pub layout: ViewLayout,
    /// Rows of the selected file.
    pub rows: Vec<DiffRow>,
    /// Row index of each hunk's first line.
    pub hunk_starts: Vec<usize>,
    /// Height of the diff pane at the last draw.
    pub viewport_height: usize,
}

impl ViewerState {
    /// Largest useful scroll offset.
    pub fn max_scroll(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// UI mode and message state.
#[derive(Debug, Default)]
pub struct UiState {
    /// Current mode.
    pub mode: Mode,
    /// Error message.
    pub error: Option<String>,
    /// Status message.
    pub status: Option<String>,
    /// Dirty flag for redraw.
    pub dirty: bool,
}

/// Outstanding AI request and the last reply.
#[derive(Debug, Default)]
pub struct AiState {
    /// Task in flight and the channel its reply arrives on.
    pub pending: Option<(AiTask, Receiver<Result<String, String>>)>,
    /// Task and text of the last reply.
    pub output: Option<(AiTask, String)>,
    /// Scroll offset in the reply overlay.
    pub scroll: usize,
}
