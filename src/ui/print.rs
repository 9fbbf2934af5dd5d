//! Non-interactive output: the whole diff written once to a terminal or pipe.

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use ratatui::style::{Color, Modifier};
use ratatui::text::Line;

use crate::core::FileDiff;
use crate::highlight::{FileHighlights, HighlighterCache};
use crate::theme::Theme;

use super::paint::{FilePainter, PaintOptions, ViewLayout};
use super::rows::{push_file_rows, DiffRow};

/// Width used when the terminal size cannot be queried.
pub const DEFAULT_WIDTH: usize = 120;

/// Static printing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Split or unified.
    pub layout: ViewLayout,
    /// Output width in columns.
    pub width: usize,
    /// Emit ANSI colors and syntax highlighting.
    pub color: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            layout: ViewLayout::Split,
            width: DEFAULT_WIDTH,
            color: true,
        }
    }
}

/// Current terminal width, or [`DEFAULT_WIDTH`].
pub fn terminal_width() -> usize {
    match crossterm::terminal::size() {
        Ok((w, _)) if w > 0 => usize::from(w),
        _ => DEFAULT_WIDTH,
    }
}

/// Write every file of the diff to `out`.
pub fn print_diff<W: Write>(
    out: &mut W,
    files: &[FileDiff],
    theme: &Theme,
    opts: PrintOptions,
) -> io::Result<()> {
    let _timer = crate::metrics::Timer::start("print_diff");
    let paint_opts = PaintOptions::printer(opts.layout, opts.width, opts.color);
    let cache = HighlighterCache::new();
    let mut rows = Vec::new();

    for (idx, file) in files.iter().enumerate() {
        if idx > 0 {
            write_line(out, &Line::default(), opts.color)?;
        }

        let highlights = opts.color.then(|| FileHighlights::compute(&cache, file));
        let painter = FilePainter::new(file, highlights.as_ref(), theme, paint_opts);

        rows.clear();
        push_file_rows(&mut rows, idx, file);
        for row in &rows {
            let line = match row {
                DiffRow::Spacer => Line::default(),
                row => painter.paint(row),
            };
            write_line(out, &line, opts.color)?;
        }
    }

    out.flush()
}

fn write_line<W: Write>(out: &mut W, line: &Line<'_>, color: bool) -> io::Result<()> {
    for span in &line.spans {
        if !color {
            queue!(out, Print(&span.content))?;
            continue;
        }

        if let Some(fg) = span.style.fg {
            queue!(out, SetForegroundColor(to_crossterm(fg)))?;
        }
        if let Some(bg) = span.style.bg {
            queue!(out, SetBackgroundColor(to_crossterm(bg)))?;
        }
        if span.style.add_modifier.contains(Modifier::BOLD) {
            queue!(out, SetAttribute(Attribute::Bold))?;
        }
        queue!(out, Print(&span.content), SetAttribute(Attribute::Reset), ResetColor)?;
    }
    queue!(out, Print("\n"))
}

fn to_crossterm(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_diff;

    const DIFF: &str = "diff --git a/a.txt b/a.txt
@@ -1,2 +1,2 @@
 same
-old
+new
diff --git a/b.txt b/b.txt
new file mode 100644
--- /dev/null
+++ b/b.txt
@@ -0,0 +1 @@
+hello
";

    fn render(opts: PrintOptions) -> String {
        let files = parse_diff(DIFF).unwrap();
        let mut out = Vec::new();
        print_diff(&mut out, &files, &Theme::builtin_default(), opts).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plain_unified_output() {
        let text = render(PrintOptions {
            layout: ViewLayout::Unified,
            width: 16,
            color: false,
        });
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
        assert_eq!(
            lines,
            vec![
                " modified: a.txt",
                "",
                "   1   same",
                "   2 - old",
                "   2 + new",
                "",
                "",
                " new file: b.txt",
                "",
                "   1 + hello",
                "",
            ]
        );
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn plain_split_output_uses_minimum_column() {
        let text = render(PrintOptions {
            layout: ViewLayout::Split,
            width: 20,
            color: false,
        });
        let row = text.lines().nth(2).unwrap();
        assert_eq!(row.chars().count(), 40 * 2 + 3);
        assert!(row.contains(" │ "));
    }

    #[test]
    fn colored_output_has_escapes() {
        let text = render(PrintOptions::default());
        assert!(text.contains("\x1b["));
        assert!(text.contains("hello"));
    }

    #[test]
    fn color_conversion() {
        assert_eq!(to_crossterm(Color::Rgb(1, 2, 3)), TermColor::Rgb { r: 1, g: 2, b: 3 });
        assert_eq!(to_crossterm(Color::Indexed(240)), TermColor::AnsiValue(240));
        assert_eq!(to_crossterm(Color::Reset), TermColor::Reset);
    }
}
