//! Parser for unified diff text produced by `git diff`.

use thiserror::Error;

/// Errors from diff parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Non-empty input contained no `diff --git` file header.
    #[error("no diff data parsed")]
    Empty,
}

/// Kind of a line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Line present only in the new file (`+`).
    Added,
    /// Line present only in the old file (`-`).
    Deleted,
    /// Line present in both files (` `).
    Unchanged,
    /// Context line. Never produced by the parser, kept as a valid state.
    Context,
}

/// One physical line of a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Kind of change.
    pub kind: LineKind,
    /// Text without the diff marker and without trailing newline.
    pub content: String,
    /// Line number in the old file (deleted and unchanged lines).
    pub old_line_number: Option<u32>,
    /// Line number in the new file (added and unchanged lines).
    pub new_line_number: Option<u32>,
}

impl Line {
    /// Content as it should be displayed: a trailing `\r` from a CRLF
    /// file is dropped. `content` itself keeps the raw bytes.
    pub fn display_content(&self) -> &str {
        trim_cr(&self.content)
    }

    fn added(content: &str, new_line: u32) -> Self {
        Self {
            kind: LineKind::Added,
            content: content.to_string(),
            old_line_number: None,
            new_line_number: Some(new_line),
        }
    }

    fn deleted(content: &str, old_line: u32) -> Self {
        Self {
            kind: LineKind::Deleted,
            content: content.to_string(),
            old_line_number: Some(old_line),
            new_line_number: None,
        }
    }

    fn unchanged(content: &str, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: LineKind::Unchanged,
            content: content.to_string(),
            old_line_number: Some(old_line),
            new_line_number: Some(new_line),
        }
    }
}

/// Drop one trailing carriage return.
///
/// ```
/// assert_eq!(critica::core::trim_cr("let x = 1;\r"), "let x = 1;");
/// assert_eq!(critica::core::trim_cr("a\r\r"), "a\r");
/// ```
pub fn trim_cr(s: &str) -> &str {
    s.strip_suffix('\r').unwrap_or(s)
}

/// A contiguous change region delimited by an `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// First old-file line covered by the hunk.
    pub old_start: u32,
    /// Number of old-file lines (defaults to 1 when omitted).
    pub old_line_count: u32,
    /// First new-file line covered by the hunk.
    pub new_start: u32,
    /// Number of new-file lines (defaults to 1 when omitted).
    pub new_line_count: u32,
    /// Lines in diff order.
    pub lines: Vec<Line>,
}

impl Hunk {
    /// Last old-file line covered by this hunk, as stated by its header.
    pub fn old_end(&self) -> i64 {
        i64::from(self.old_start) + i64::from(self.old_line_count) - 1
    }
}

/// Change status of a file, derived from the header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// `new file mode`.
    New,
    /// `deleted file mode`.
    Deleted,
    /// `rename from`.
    Renamed,
    /// Anything else.
    Modified,
}

impl FileStatus {
    /// Human-readable label used in file headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::New => "new file",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
            Self::Modified => "modified",
        }
    }

    /// Single-letter badge (A, D, R, M).
    pub fn badge(self) -> &'static str {
        match self {
            Self::New => "A",
            Self::Deleted => "D",
            Self::Renamed => "R",
            Self::Modified => "M",
        }
    }
}

/// All changes to a single file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Path on the `a/` side of the header.
    pub old_path: String,
    /// Path on the `b/` side of the header.
    pub new_path: String,
    /// File was added.
    pub is_new: bool,
    /// File was removed.
    pub is_deleted: bool,
    /// File was renamed.
    pub is_renamed: bool,
    /// Extension of `new_path` without the dot; empty if none.
    pub extension: String,
    /// Hunks in diff order.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    fn new(old_path: String, new_path: String) -> Self {
        let extension = file_extension(&new_path).to_string();
        Self {
            old_path,
            new_path,
            extension,
            ..Self::default()
        }
    }

    /// Status derived from the header flags, checked new, deleted, renamed.
    pub fn status(&self) -> FileStatus {
        if self.is_new {
            FileStatus::New
        } else if self.is_deleted {
            FileStatus::Deleted
        } else if self.is_renamed {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        }
    }

    /// Count of added lines across all hunks.
    pub fn additions(&self) -> usize {
        self.count_kind(LineKind::Added)
    }

    /// Count of deleted lines across all hunks.
    pub fn deletions(&self) -> usize {
        self.count_kind(LineKind::Deleted)
    }

    fn count_kind(&self, kind: LineKind) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| l.kind == kind)
            .count()
    }
}

/// Parse `git diff` output into per-file records.
///
/// An empty string yields `Ok(vec![])`. Non-empty input that contains no
/// `diff --git` header fails with [`ParseError::Empty`].
///
/// # Examples
///
/// ```
/// use critica::core::{parse_diff, LineKind};
///
/// let files = parse_diff("diff --git a/f.txt b/f.txt\n@@ -1 +1 @@\n-old\n+new\n").unwrap();
/// assert_eq!(files[0].new_path, "f.txt");
/// assert_eq!(files[0].hunks[0].lines[1].kind, LineKind::Added);
/// ```
pub fn parse_diff(diff_text: &str) -> Result<Vec<FileDiff>, ParseError> {
    if diff_text.is_empty() {
        return Ok(Vec::new());
    }

    let _timer = crate::metrics::Timer::start("parse_diff");

    let mut files = Vec::new();
    let mut state = ScanState::Idle;

    for line in diff_text.split('\n') {
        if let Some((old_path, new_path)) = parse_diff_header(line) {
            if let ScanState::Building(builder) = state {
                files.push(builder.finish());
            }
            state = ScanState::Building(FileBuilder::new(FileDiff::new(old_path, new_path)));
            continue;
        }

        let ScanState::Building(builder) = &mut state else {
            continue;
        };
        builder.feed(line);
    }

    if let ScanState::Building(builder) = state {
        files.push(builder.finish());
    }

    if files.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(files)
}

/// Scan state: either before the first file header or accumulating a file.
enum ScanState {
    Idle,
    Building(FileBuilder),
}

struct FileBuilder {
    file: FileDiff,
    hunk: Option<HunkBuilder>,
}

struct HunkBuilder {
    hunk: Hunk,
    old_line: u32,
    new_line: u32,
}

impl FileBuilder {
    fn new(file: FileDiff) -> Self {
        Self { file, hunk: None }
    }

    fn feed(&mut self, line: &str) {
        if line.starts_with("new file mode") {
            self.file.is_new = true;
            return;
        }
        if line.starts_with("deleted file mode") {
            self.file.is_deleted = true;
            return;
        }
        if line.starts_with("rename from") {
            self.file.is_renamed = true;
            return;
        }

        if is_metadata_line(line) || is_path_marker(line) {
            return;
        }

        if let Some(header) = parse_hunk_header(line) {
            self.close_hunk();
            self.hunk = Some(HunkBuilder::new(header));
            return;
        }

        if let Some(hunk) = &mut self.hunk {
            hunk.push(line);
        }
    }

    fn close_hunk(&mut self) {
        if let Some(builder) = self.hunk.take() {
            self.file.hunks.push(builder.hunk);
        }
    }

    fn finish(mut self) -> FileDiff {
        self.close_hunk();
        self.file
    }
}

impl HunkBuilder {
    fn new(header: HunkHeader) -> Self {
        Self {
            hunk: Hunk {
                old_start: header.old_start,
                old_line_count: header.old_lines,
                new_start: header.new_start,
                new_line_count: header.new_lines,
                lines: Vec::new(),
            },
            old_line: header.old_start,
            new_line: header.new_start,
        }
    }

    fn push(&mut self, line: &str) {
        let mut chars = line.chars();
        let Some(marker) = chars.next() else {
            return;
        };
        let content = chars.as_str();

        match marker {
            '+' => {
                self.hunk.lines.push(Line::added(content, self.new_line));
                self.new_line = self.new_line.saturating_add(1);
            }
            '-' => {
                self.hunk.lines.push(Line::deleted(content, self.old_line));
                self.old_line = self.old_line.saturating_add(1);
            }
            ' ' => {
                self.hunk
                    .lines
                    .push(Line::unchanged(content, self.old_line, self.new_line));
                self.old_line = self.old_line.saturating_add(1);
                self.new_line = self.new_line.saturating_add(1);
            }
            // "\ No newline at end of file" and unknown markers
            _ => {}
        }
    }
}

/// Header lines with no structural effect.
fn is_metadata_line(line: &str) -> bool {
    const PREFIXES: [&str; 4] = ["index ", "Binary files", "similarity index", "rename to"];
    PREFIXES.iter().any(|p| line.starts_with(p))
}

/// `--- a/path` / `+++ b/path` lines; the paths come from the `diff --git` header.
fn is_path_marker(line: &str) -> bool {
    line.strip_prefix("--- ")
        .or_else(|| line.strip_prefix("+++ "))
        .is_some_and(|rest| !rest.is_empty())
}

/// Ranges from an `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HunkHeader {
    old_start: u32,
    old_lines: u32,
    new_start: u32,
    new_lines: u32,
}

/// Parse a hunk header. Omitted counts default to 1.
///
/// Numeric fields that fail to parse become 0 instead of rejecting the
/// header.
fn parse_hunk_header(line: &str) -> Option<HunkHeader> {
    let rest = line.strip_prefix("@@ -")?;
    let (old_range, rest) = rest.split_once(" +")?;
    let (new_range, _) = rest.split_once(" @@")?;

    let (old_start, old_lines) = parse_range(old_range);
    let (new_start, new_lines) = parse_range(new_range);

    Some(HunkHeader {
        old_start,
        old_lines,
        new_start,
        new_lines,
    })
}

fn parse_range(range: &str) -> (u32, u32) {
    match range.split_once(',') {
        Some((start, count)) => (parse_number(start), parse_number(count)),
        None => (parse_number(range), 1),
    }
}

fn parse_number(field: &str) -> u32 {
    field.parse().unwrap_or(0)
}

/// Parse a `diff --git a/old b/new` header into `(old, new)`.
///
/// Unquoted paths split at the last ` b/` so paths containing spaces keep
/// them. Git's C-style quoted paths are unescaped.
fn parse_diff_header(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("diff --git ")?;

    if rest.starts_with('"') {
        let first_end = find_closing_quote(rest)?;
        let old = unquote_path(&rest[..=first_end]);
        let remainder = rest.get(first_end + 2..)?;
        let new = if remainder.starts_with('"') {
            unquote_path(remainder)
        } else {
            remainder.to_string()
        };
        let old = old.strip_prefix("a/")?.to_string();
        let new = new.strip_prefix("b/")?.to_string();
        return (!old.is_empty() && !new.is_empty()).then_some((old, new));
    }

    let rest = rest.strip_prefix("a/")?;
    let split = rest.rfind(" b/")?;
    let old = &rest[..split];
    let new = &rest[split + 3..];
    if old.is_empty() || new.is_empty() {
        return None;
    }

    Some((old.to_string(), new.to_string()))
}

/// Index of the quote closing the quoted string at the start of `s`.
fn find_closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn unquote_path(s: &str) -> String {
    let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Extension of the last path component, without the dot.
fn file_extension(path: &str) -> &str {
    let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}
