//! Syntax highlighting of hunk lines using Tree-sitter.
//!
//! Each side of a hunk is highlighted as one block so multi-line constructs
//! (strings, comments) keep their color, then split back into per-line spans
//! with byte offsets relative to each line's content.

use std::cell::RefCell;
use std::collections::HashMap;

use parking_lot::Mutex;
use tree_sitter_highlight::{HighlightConfiguration, HighlightEvent, Highlighter as TsHighlighter};

use crate::core::{FileDiff, Hunk, LineKind};

/// Language identifier for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    /// Rust source files.
    #[cfg(feature = "lang-rust")]
    Rust,
    /// TypeScript and JavaScript.
    #[cfg(feature = "lang-typescript")]
    TypeScript,
    /// TSX and JSX.
    #[cfg(feature = "lang-typescript")]
    Tsx,
    /// Go source files.
    #[cfg(feature = "lang-go")]
    Go,
    /// Python source files.
    #[cfg(feature = "lang-python")]
    Python,
    /// JSON files.
    #[cfg(feature = "lang-json")]
    Json,
    /// YAML files.
    #[cfg(feature = "lang-yaml")]
    Yaml,
    /// Shell scripts.
    #[cfg(feature = "lang-bash")]
    Bash,
    /// No highlighting.
    Plain,
}

impl LanguageId {
    /// Language for a file extension given without the dot.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            #[cfg(feature = "lang-rust")]
            "rs" => Self::Rust,
            #[cfg(feature = "lang-typescript")]
            "ts" | "mts" | "cts" | "js" | "mjs" | "cjs" => Self::TypeScript,
            #[cfg(feature = "lang-typescript")]
            "tsx" | "jsx" => Self::Tsx,
            #[cfg(feature = "lang-go")]
            "go" => Self::Go,
            #[cfg(feature = "lang-python")]
            "py" | "pyi" => Self::Python,
            #[cfg(feature = "lang-json")]
            "json" => Self::Json,
            #[cfg(feature = "lang-yaml")]
            "yaml" | "yml" => Self::Yaml,
            #[cfg(feature = "lang-bash")]
            "sh" | "bash" | "zsh" => Self::Bash,
            _ => Self::Plain,
        }
    }
}

/// Styled byte range of highlighted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledSpan {
    /// Byte start offset.
    pub start: usize,
    /// Byte end offset (exclusive).
    pub end: usize,
    /// Token class.
    pub style_id: StyleId,
}

/// Token classes mapped to theme colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StyleId {
    /// Unstyled text.
    #[default]
    Default,
    /// Language keywords.
    Keyword,
    /// Type names.
    Type,
    /// Function names.
    Function,
    /// String literals.
    String,
    /// Numeric literals.
    Number,
    /// Comments.
    Comment,
    /// Operators.
    Operator,
    /// Punctuation.
    Punctuation,
    /// Variable names.
    Variable,
    /// Constants.
    Constant,
    /// Properties and fields.
    Property,
    /// Attributes and decorators.
    Attribute,
}

const HIGHLIGHT_NAMES: &[&str] = &[
    "attribute",
    "comment",
    "constant",
    "constant.builtin",
    "constructor",
    "function",
    "function.builtin",
    "function.method",
    "keyword",
    "number",
    "operator",
    "property",
    "punctuation",
    "punctuation.bracket",
    "punctuation.delimiter",
    "string",
    "type",
    "type.builtin",
    "variable",
    "variable.builtin",
    "variable.parameter",
];

fn style_for_capture(name: &str) -> StyleId {
    match name {
        "keyword" => StyleId::Keyword,
        "type" | "type.builtin" => StyleId::Type,
        "function" | "function.builtin" | "function.method" | "constructor" => StyleId::Function,
        "string" => StyleId::String,
        "number" => StyleId::Number,
        "comment" => StyleId::Comment,
        "operator" => StyleId::Operator,
        "punctuation" | "punctuation.bracket" | "punctuation.delimiter" => StyleId::Punctuation,
        "variable" | "variable.builtin" | "variable.parameter" => StyleId::Variable,
        "constant" | "constant.builtin" => StyleId::Constant,
        "property" => StyleId::Property,
        "attribute" => StyleId::Attribute,
        _ => StyleId::Default,
    }
}

/// Produces styled spans for a block of source.
pub trait SyntaxHighlighter {
    /// Spans covering `source`, in order, with byte offsets into it.
    fn highlight(&self, source: &str) -> Vec<StyledSpan>;
}

fn whole(source: &str) -> Vec<StyledSpan> {
    vec![StyledSpan {
        start: 0,
        end: source.len(),
        style_id: StyleId::Default,
    }]
}

/// Highlighter that leaves text unstyled.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl SyntaxHighlighter for PlainHighlighter {
    fn highlight(&self, source: &str) -> Vec<StyledSpan> {
        whole(source)
    }
}

/// Tree-sitter highlighter for one language.
pub struct TreeSitterHighlighter {
    config: HighlightConfiguration,
    highlighter: Mutex<TsHighlighter>,
}

impl TreeSitterHighlighter {
    /// `None` for [`LanguageId::Plain`] or when the grammar fails to load.
    pub fn new(lang: LanguageId) -> Option<Self> {
        let (language, query) = match lang {
            #[cfg(feature = "lang-rust")]
            LanguageId::Rust => (
                tree_sitter_rust::LANGUAGE.into(),
                tree_sitter_rust::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-typescript")]
            LanguageId::TypeScript => (
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-typescript")]
            LanguageId::Tsx => (
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-go")]
            LanguageId::Go => (
                tree_sitter_go::LANGUAGE.into(),
                tree_sitter_go::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-python")]
            LanguageId::Python => (
                tree_sitter_python::LANGUAGE.into(),
                tree_sitter_python::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-json")]
            LanguageId::Json => (
                tree_sitter_json::LANGUAGE.into(),
                tree_sitter_json::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-yaml")]
            LanguageId::Yaml => (
                tree_sitter_yaml::LANGUAGE.into(),
                tree_sitter_yaml::HIGHLIGHTS_QUERY,
            ),
            #[cfg(feature = "lang-bash")]
            LanguageId::Bash => (
                tree_sitter_bash::LANGUAGE.into(),
                tree_sitter_bash::HIGHLIGHT_QUERY,
            ),
            LanguageId::Plain => return None,
        };

        let mut config = HighlightConfiguration::new(language, "source", query, "", "").ok()?;
        config.configure(HIGHLIGHT_NAMES);
        Some(Self {
            config,
            highlighter: Mutex::new(TsHighlighter::new()),
        })
    }
}

impl SyntaxHighlighter for TreeSitterHighlighter {
    fn highlight(&self, source: &str) -> Vec<StyledSpan> {
        let mut highlighter = self.highlighter.lock();
        let Ok(events) = highlighter.highlight(&self.config, source.as_bytes(), None, |_| None)
        else {
            return whole(source);
        };

        let mut spans = Vec::new();
        let mut stack = vec![StyleId::Default];
        let mut covered = 0;

        for event in events {
            match event {
                Ok(HighlightEvent::Source { start, end }) => {
                    let start = start.min(source.len());
                    let end = end.min(source.len());
                    if start < end {
                        spans.push(StyledSpan {
                            start,
                            end,
                            style_id: stack.last().copied().unwrap_or_default(),
                        });
                    }
                    covered = covered.max(end);
                }
                Ok(HighlightEvent::HighlightStart(h)) => {
                    let name = HIGHLIGHT_NAMES.get(h.0).copied().unwrap_or("");
                    stack.push(style_for_capture(name));
                }
                Ok(HighlightEvent::HighlightEnd) => {
                    stack.pop();
                }
                Err(_) => break,
            }
        }

        if covered < source.len() {
            spans.push(StyledSpan {
                start: covered,
                end: source.len(),
                style_id: StyleId::Default,
            });
        }
        spans
    }
}

/// Lazily built highlighters, one per language.
#[derive(Default)]
pub struct HighlighterCache {
    by_language: RefCell<HashMap<LanguageId, Box<dyn SyntaxHighlighter>>>,
}

impl HighlighterCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight `source` as `lang`.
    pub fn highlight(&self, lang: LanguageId, source: &str) -> Vec<StyledSpan> {
        if lang == LanguageId::Plain {
            return PlainHighlighter.highlight(source);
        }

        let mut map = self.by_language.borrow_mut();
        let highlighter = map.entry(lang).or_insert_with(|| match TreeSitterHighlighter::new(lang) {
            Some(h) => Box::new(h),
            None => Box::new(PlainHighlighter),
        });
        highlighter.highlight(source)
    }
}

/// Which version of the file a line is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Pre-change file: deleted and unchanged lines.
    Old,
    /// Post-change file: added and unchanged lines.
    New,
}

/// Per-line spans for both sides of one hunk.
#[derive(Debug, Clone, Default)]
pub struct HunkHighlights {
    old: Vec<Vec<StyledSpan>>,
    new: Vec<Vec<StyledSpan>>,
    /// For each hunk line, its row index on the old and new side.
    rows: Vec<(Option<usize>, Option<usize>)>,
}

impl HunkHighlights {
    /// Highlight both sides of `hunk`.
    pub fn compute(cache: &HighlighterCache, lang: LanguageId, hunk: &Hunk) -> Self {
        let mut old_src = String::new();
        let mut new_src = String::new();
        let mut old_rows = 0;
        let mut new_rows = 0;
        let mut rows = Vec::with_capacity(hunk.lines.len());

        for line in &hunk.lines {
            let on_old = matches!(line.kind, LineKind::Deleted | LineKind::Unchanged);
            let on_new = matches!(line.kind, LineKind::Added | LineKind::Unchanged);

            let old_row = on_old.then(|| {
                push_line(&mut old_src, line.display_content());
                old_rows += 1;
                old_rows - 1
            });
            let new_row = on_new.then(|| {
                push_line(&mut new_src, line.display_content());
                new_rows += 1;
                new_rows - 1
            });
            rows.push((old_row, new_row));
        }

        Self {
            old: highlight_block(cache, lang, &old_src, old_rows),
            new: highlight_block(cache, lang, &new_src, new_rows),
            rows,
        }
    }

    /// Spans for hunk line `line_idx` as seen from `side`. Empty when the
    /// line does not exist on that side.
    pub fn spans(&self, line_idx: usize, side: Side) -> &[StyledSpan] {
        let Some(&(old_row, new_row)) = self.rows.get(line_idx) else {
            return &[];
        };
        let found = match side {
            Side::Old => old_row.and_then(|r| self.old.get(r)),
            Side::New => new_row.and_then(|r| self.new.get(r)),
        };
        found.map_or(&[], Vec::as_slice)
    }
}

/// Highlights for every hunk of a file.
#[derive(Debug, Clone, Default)]
pub struct FileHighlights {
    hunks: Vec<HunkHighlights>,
}

impl FileHighlights {
    /// Highlight every hunk of `file` using its extension's language.
    pub fn compute(cache: &HighlighterCache, file: &FileDiff) -> Self {
        let lang = LanguageId::from_extension(&file.extension);
        Self {
            hunks: file
                .hunks
                .iter()
                .map(|hunk| HunkHighlights::compute(cache, lang, hunk))
                .collect(),
        }
    }

    /// Highlights for hunk `idx`.
    pub fn hunk(&self, idx: usize) -> Option<&HunkHighlights> {
        self.hunks.get(idx)
    }
}

fn push_line(block: &mut String, content: &str) {
    block.push_str(content);
    block.push('\n');
}

/// Highlight a newline-joined block and split it into `rows` lines.
fn highlight_block(
    cache: &HighlighterCache,
    lang: LanguageId,
    block: &str,
    rows: usize,
) -> Vec<Vec<StyledSpan>> {
    if rows == 0 {
        return Vec::new();
    }
    let bounds = line_bounds(block);
    let spans = cache.highlight(lang, block);
    let mut per_line = split_by_line(&spans, &bounds);
    for (spans, (start, end)) in per_line.iter_mut().zip(&bounds) {
        *spans = fill_gaps(std::mem::take(spans), end - start);
    }
    per_line
}

/// Byte bounds of each `\n`-terminated line, newline excluded.
fn line_bounds(block: &str) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut start = 0;
    for (idx, byte) in block.bytes().enumerate() {
        if byte == b'\n' {
            bounds.push((start, idx));
            start = idx + 1;
        }
    }
    if start < block.len() {
        bounds.push((start, block.len()));
    }
    bounds
}

/// Clip block-relative spans to lines, rebasing offsets to each line start.
fn split_by_line(spans: &[StyledSpan], bounds: &[(usize, usize)]) -> Vec<Vec<StyledSpan>> {
    let mut per_line = vec![Vec::new(); bounds.len()];

    for span in spans.iter().filter(|s| s.start < s.end) {
        let first = bounds.partition_point(|&(_, end)| end <= span.start);
        for (idx, &(line_start, line_end)) in bounds.iter().enumerate().skip(first) {
            if span.end <= line_start {
                break;
            }
            let start = span.start.max(line_start);
            let end = span.end.min(line_end);
            if start < end {
                per_line[idx].push(StyledSpan {
                    start: start - line_start,
                    end: end - line_start,
                    style_id: span.style_id,
                });
            }
        }
    }

    per_line
}

/// Cover `0..line_len` completely, filling holes with default spans.
fn fill_gaps(spans: Vec<StyledSpan>, line_len: usize) -> Vec<StyledSpan> {
    let mut filled = Vec::with_capacity(spans.len() + 1);
    let mut cursor = 0;

    for span in spans {
        if span.end <= cursor {
            continue;
        }
        if span.start > cursor {
            filled.push(StyledSpan {
                start: cursor,
                end: span.start,
                style_id: StyleId::Default,
            });
        }
        let start = span.start.max(cursor);
        filled.push(StyledSpan { start, ..span });
        cursor = span.end;
    }

    if cursor < line_len {
        filled.push(StyledSpan {
            start: cursor,
            end: line_len,
            style_id: StyleId::Default,
        });
    }
    filled
}
