//! Turns [`DiffRow`]s into styled ratatui lines.
//!
//! Shared by the static printer and the interactive diff pane. Output is
//! always exactly the requested width for line rows so backgrounds extend to
//! the edge.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::core::{compute_pairs, segment, trim_cr, FileDiff, LineKind, LinePairs};
use crate::highlight::{FileHighlights, Side, StyleId, StyledSpan};
use crate::theme::Theme;

use super::rows::{gap_label, header_label, DiffRow};

/// Columns reserved for a line number.
pub const LINE_NUMBER_WIDTH: usize = 4;

/// Tab stop width.
pub const TAB_WIDTH: usize = 8;

/// Narrowest split column used by the static printer.
pub const MIN_SPLIT_COLUMN: usize = 40;

const SPLIT_SEPARATOR: &str = "│";

/// Side-by-side or single-column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewLayout {
    /// Old on the left, new on the right.
    #[default]
    Split,
    /// One column with `-`/`+` prefixes.
    Unified,
}

impl ViewLayout {
    /// The other layout.
    pub fn toggled(self) -> Self {
        match self {
            Self::Split => Self::Unified,
            Self::Unified => Self::Split,
        }
    }

    /// Short label for status bars.
    pub fn label(self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Unified => "unified",
        }
    }
}

/// Painting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintOptions {
    /// Layout to draw.
    pub layout: ViewLayout,
    /// Total width in terminal columns.
    pub width: usize,
    /// Lower bound on each split column.
    pub min_column: usize,
    /// Emit colors; when false every span is unstyled.
    pub color: bool,
    /// Cut unified content at `width`. When false, long unified lines run
    /// past the width and only shorter ones are padded. Split columns are
    /// always fitted.
    pub clip: bool,
}

impl PaintOptions {
    /// Options for the static printer.
    pub fn printer(layout: ViewLayout, width: usize, color: bool) -> Self {
        Self {
            layout,
            width,
            min_column: MIN_SPLIT_COLUMN,
            color,
            clip: false,
        }
    }
}

/// Width of each split column: `max((width - 3) / 2, min_column)`.
pub fn split_column_width(width: usize, min_column: usize) -> usize {
    (width.saturating_sub(3) / 2).max(min_column)
}

/// Paints the rows of one file.
pub struct FilePainter<'a> {
    file: &'a FileDiff,
    pairs: Vec<LinePairs<'a>>,
    stripes: Vec<Vec<bool>>,
    highlights: Option<&'a FileHighlights>,
    theme: &'a Theme,
    opts: PaintOptions,
}

impl<'a> FilePainter<'a> {
    /// Prepare painting for `file`. Line pairs are computed once per hunk.
    pub fn new(
        file: &'a FileDiff,
        highlights: Option<&'a FileHighlights>,
        theme: &'a Theme,
        opts: PaintOptions,
    ) -> Self {
        let pairs = file.hunks.iter().map(|h| compute_pairs(&h.lines)).collect();
        let stripes = file
            .hunks
            .iter()
            .map(|hunk| {
                let mut unchanged = 0usize;
                hunk.lines
                    .iter()
                    .map(|line| {
                        if matches!(line.kind, LineKind::Unchanged | LineKind::Context) {
                            unchanged += 1;
                            unchanged % 2 == 0
                        } else {
                            false
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            file,
            pairs,
            stripes,
            highlights,
            theme,
            opts,
        }
    }

    /// Styled line for `row`. Rows of other files paint as blank.
    pub fn paint(&self, row: &DiffRow) -> Line<'static> {
        let line = match *row {
            DiffRow::FileHeader { .. } => self.header(),
            DiffRow::HunkGap { skipped, .. } => self.gap(skipped),
            DiffRow::Line { hunk, line, .. } => self.diff_line(hunk, line),
            DiffRow::Spacer => Line::default(),
        };
        if self.opts.color {
            line
        } else {
            strip_styles(line)
        }
    }

    fn header(&self) -> Line<'static> {
        Line::from(Span::styled(
            header_label(self.file),
            Style::default()
                .fg(self.theme.file_header_fg)
                .bg(self.theme.file_header_bg)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn gap(&self, skipped: i64) -> Line<'static> {
        let label = gap_label(skipped);
        let label_width = display_width(&label);
        let width = self.opts.width.max(label_width);
        let left = (width - label_width) / 2;
        let right = width - label_width - left;
        let style = Style::default().fg(self.theme.separator);

        Line::from(vec![
            Span::raw(" ".repeat(left)),
            Span::styled(label, style),
            Span::raw(" ".repeat(right)),
        ])
    }

    fn diff_line(&self, hunk_idx: usize, line_idx: usize) -> Line<'static> {
        let Some(line) = self
            .file
            .hunks
            .get(hunk_idx)
            .and_then(|h| h.lines.get(line_idx))
        else {
            return Line::default();
        };
        let counterpart = self
            .pairs
            .get(hunk_idx)
            .and_then(|p| p.get(&line_idx))
            .copied()
            .map(trim_cr)
            .unwrap_or("");
        let cell = CellRef {
            hunk: hunk_idx,
            line: line_idx,
            kind: line.kind,
            content: line.display_content(),
            counterpart,
            striped: self.stripes[hunk_idx][line_idx],
        };

        match self.opts.layout {
            ViewLayout::Split => {
                let col = split_column_width(self.opts.width, self.opts.min_column);
                let mut spans = Vec::new();
                let (left, right) = match line.kind {
                    LineKind::Deleted => (line.old_line_number.map(|n| (n, Side::Old)), None),
                    LineKind::Added => (None, line.new_line_number.map(|n| (n, Side::New))),
                    LineKind::Unchanged | LineKind::Context => (
                        Some((line.old_line_number.unwrap_or(0), Side::Old)),
                        Some((line.new_line_number.unwrap_or(0), Side::New)),
                    ),
                };
                self.push_cell(&mut spans, &cell, left, col);
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    SPLIT_SEPARATOR,
                    Style::default().fg(self.theme.separator),
                ));
                spans.push(Span::raw(" "));
                self.push_cell(&mut spans, &cell, right, col);
                Line::from(spans)
            }
            ViewLayout::Unified => {
                let (number, prefix, side) = match line.kind {
                    LineKind::Deleted => (line.old_line_number, "-", Side::Old),
                    LineKind::Added => (line.new_line_number, "+", Side::New),
                    LineKind::Unchanged | LineKind::Context => (line.new_line_number, " ", Side::New),
                };
                let base = self.line_style(&cell);
                let mut spans = vec![
                    Span::styled(number_label(number), self.number_style(&cell)),
                    Span::styled(format!(" {prefix} "), base),
                ];
                let mut content_width = self.opts.width.saturating_sub(LINE_NUMBER_WIDTH + 3);
                if !self.opts.clip {
                    content_width = content_width.max(expanded_width(cell.content));
                }
                spans.extend(self.content(&cell, side, content_width));
                Line::from(spans)
            }
        }
    }

    /// One split column: number, space, content. `None` paints a blank cell.
    fn push_cell(
        &self,
        spans: &mut Vec<Span<'static>>,
        cell: &CellRef<'_>,
        side: Option<(u32, Side)>,
        width: usize,
    ) {
        let Some((number, side)) = side else {
            spans.push(Span::raw(" ".repeat(width)));
            return;
        };
        spans.push(Span::styled(
            number_label((number > 0).then_some(number)),
            self.number_style(cell),
        ));
        spans.push(Span::styled(" ", self.line_style(cell)));
        spans.extend(self.content(cell, side, width.saturating_sub(LINE_NUMBER_WIDTH + 1)));
    }

    /// Content spans padded to exactly `width` columns.
    fn content(&self, cell: &CellRef<'_>, side: Side, width: usize) -> Vec<Span<'static>> {
        let base = self.line_style(cell);
        let inline = self.inline_style(cell.kind);

        let changed = changed_ranges(cell.content, cell.counterpart);
        let syntax = self
            .highlights
            .and_then(|h| h.hunk(cell.hunk))
            .map(|h| h.spans(cell.line, side))
            .unwrap_or(&[]);

        let mut builder = SpanBuilder::default();
        let mut col = 0usize;
        let mut syntax_iter = SyntaxCursor::new(syntax);

        for (offset, ch) in cell.content.char_indices() {
            let style = if changed.iter().any(|r| r.contains(&offset)) {
                inline
            } else {
                match self.theme.syntax_color(syntax_iter.style_at(offset)) {
                    Some(fg) => base.fg(fg),
                    None => base,
                }
            };
            if !push_fitted(&mut builder, ch, style, &mut col, width) {
                break;
            }
        }
        builder.push_spaces(width.saturating_sub(col), base);
        builder.finish()
    }

    fn line_style(&self, cell: &CellRef<'_>) -> Style {
        let t = self.theme;
        match cell.kind {
            LineKind::Deleted => Style::default()
                .fg(t.deleted_fg)
                .bg(t.deleted_bg)
                .add_modifier(Modifier::BOLD),
            LineKind::Added => Style::default()
                .fg(t.added_fg)
                .bg(t.added_bg)
                .add_modifier(Modifier::BOLD),
            LineKind::Unchanged | LineKind::Context => {
                let bg = if cell.striped { t.stripe_bg } else { t.unchanged_bg };
                Style::default().fg(t.unchanged_fg).bg(bg)
            }
        }
    }

    fn inline_style(&self, kind: LineKind) -> Style {
        let t = self.theme;
        let (fg, bg) = match kind {
            LineKind::Added => (t.inline_added_fg, t.inline_added_bg),
            _ => (t.inline_deleted_fg, t.inline_deleted_bg),
        };
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD)
    }

    fn number_style(&self, cell: &CellRef<'_>) -> Style {
        let t = self.theme;
        let fg = match cell.kind {
            LineKind::Deleted => t.line_num_deleted,
            LineKind::Added => t.line_num_added,
            LineKind::Unchanged | LineKind::Context => t.line_num_unchanged,
        };
        Style::default().fg(fg).bg(self.line_style(cell).bg.unwrap_or_default())
    }
}

/// The line being painted plus its pairing context.
struct CellRef<'a> {
    hunk: usize,
    line: usize,
    kind: LineKind,
    content: &'a str,
    counterpart: &'a str,
    striped: bool,
}

/// Byte ranges of `text` marked changed against `counterpart`.
fn changed_ranges(text: &str, counterpart: &str) -> Vec<std::ops::Range<usize>> {
    let mut ranges = Vec::new();
    let mut offset = 0;
    for seg in segment(text, counterpart) {
        let end = offset + seg.text.len();
        if seg.changed {
            ranges.push(offset..end);
        }
        offset = end;
    }
    ranges
}

/// Forward-only lookup of the syntax class at a byte offset.
struct SyntaxCursor<'a> {
    spans: &'a [StyledSpan],
    idx: usize,
}

impl<'a> SyntaxCursor<'a> {
    fn new(spans: &'a [StyledSpan]) -> Self {
        Self { spans, idx: 0 }
    }

    fn style_at(&mut self, offset: usize) -> StyleId {
        while let Some(span) = self.spans.get(self.idx) {
            if offset < span.end {
                return if offset >= span.start {
                    span.style_id
                } else {
                    StyleId::Default
                };
            }
            self.idx += 1;
        }
        StyleId::Default
    }
}

fn number_label(number: Option<u32>) -> String {
    match number {
        Some(n) => format!("{:>width$}", n, width = LINE_NUMBER_WIDTH),
        None => " ".repeat(LINE_NUMBER_WIDTH),
    }
}

/// Replace control characters with U+FFFD.
pub fn sanitize_char(c: char) -> char {
    match c {
        '\x00'..='\x1f' | '\x7f' => '\u{FFFD}',
        _ => c,
    }
}

/// Display width of `s` in terminal columns.
pub fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| UnicodeWidthChar::width(sanitize_char(c)).unwrap_or(0))
        .sum()
}

/// Columns `s` occupies once tabs are expanded.
fn expanded_width(s: &str) -> usize {
    s.chars().fold(0, |col, ch| {
        if ch == '\t' {
            col + TAB_WIDTH - col % TAB_WIDTH
        } else {
            col + UnicodeWidthChar::width(sanitize_char(ch)).unwrap_or(0)
        }
    })
}

/// Push one char, expanding tabs to the next stop. Returns false once the
/// char no longer fits in `max` columns.
fn push_fitted(builder: &mut SpanBuilder, ch: char, style: Style, col: &mut usize, max: usize) -> bool {
    if ch == '\t' {
        let stop = TAB_WIDTH - (*col % TAB_WIDTH);
        let take = stop.min(max.saturating_sub(*col));
        builder.push_spaces(take, style);
        *col += take;
        return take == stop;
    }

    let ch = sanitize_char(ch);
    let w = UnicodeWidthChar::width(ch).unwrap_or(0);
    if *col + w > max {
        return false;
    }
    builder.push_char(ch, style);
    *col += w;
    true
}

/// Merges consecutive chars with equal style into one span.
#[derive(Default)]
pub struct SpanBuilder {
    spans: Vec<Span<'static>>,
    style: Option<Style>,
    text: String,
}

impl SpanBuilder {
    /// Append a char.
    pub fn push_char(&mut self, ch: char, style: Style) {
        self.switch(style);
        self.text.push(ch);
    }

    /// Append `count` spaces.
    pub fn push_spaces(&mut self, count: usize, style: Style) {
        if count == 0 {
            return;
        }
        self.switch(style);
        self.text.extend(std::iter::repeat(' ').take(count));
    }

    fn switch(&mut self, style: Style) {
        if self.style != Some(style) {
            self.flush();
            self.style = Some(style);
        }
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let style = self.style.unwrap_or_default();
            self.spans.push(Span::styled(std::mem::take(&mut self.text), style));
        }
    }

    /// Finished spans.
    pub fn finish(mut self) -> Vec<Span<'static>> {
        self.flush();
        self.spans
    }
}

fn strip_styles(line: Line<'static>) -> Line<'static> {
    Line::from(
        line.spans
            .into_iter()
            .map(|s| Span::raw(s.content))
            .collect::<Vec<_>>(),
    )
}

/// Concatenated text of a line.
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}
