//! Flat display-row model over parsed diffs.
//!
//! Rows hold indices into the parsed files rather than references, so a row
//! list can be rebuilt or scrolled without borrowing the diff.

use crate::core::{FileDiff, Hunk};

/// One display row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRow {
    /// ` <status>: <path> ` banner.
    FileHeader {
        /// File index.
        file: usize,
    },
    /// Separator between two hunks of the same file.
    HunkGap {
        /// File index.
        file: usize,
        /// Old-file lines between the hunks; may be zero or negative for
        /// overlapping or malformed headers.
        skipped: i64,
    },
    /// A hunk line.
    Line {
        /// File index.
        file: usize,
        /// Hunk index within the file.
        hunk: usize,
        /// Line index within the hunk.
        line: usize,
    },
    /// Blank row.
    Spacer,
}

impl DiffRow {
    /// File this row belongs to; `None` for spacers.
    pub fn file(&self) -> Option<usize> {
        match *self {
            Self::FileHeader { file } | Self::HunkGap { file, .. } | Self::Line { file, .. } => {
                Some(file)
            }
            Self::Spacer => None,
        }
    }
}

/// Old-file lines hidden between `prev` and `cur`.
pub fn skipped_lines(prev: &Hunk, cur: &Hunk) -> i64 {
    i64::from(cur.old_start) - prev.old_end() - 1
}

/// Text of a hunk gap separator.
pub fn gap_label(skipped: i64) -> String {
    if skipped > 0 {
        format!("⋯ ({skipped} lines skipped) ⋯")
    } else {
        "⋯".to_string()
    }
}

/// Text of a file header banner.
pub fn header_label(file: &FileDiff) -> String {
    format!(" {}: {} ", file.status().label(), file.new_path)
}

/// Append the rows for one file: header, spacer, then each hunk's lines
/// followed by a spacer, with a gap row between consecutive hunks.
pub fn push_file_rows(rows: &mut Vec<DiffRow>, file_idx: usize, file: &FileDiff) {
    rows.push(DiffRow::FileHeader { file: file_idx });
    rows.push(DiffRow::Spacer);

    for (hunk_idx, hunk) in file.hunks.iter().enumerate() {
        if let Some(prev) = hunk_idx.checked_sub(1).map(|i| &file.hunks[i]) {
            rows.push(DiffRow::HunkGap {
                file: file_idx,
                skipped: skipped_lines(prev, hunk),
            });
        }
        rows.extend((0..hunk.lines.len()).map(|line| DiffRow::Line {
            file: file_idx,
            hunk: hunk_idx,
            line,
        }));
        rows.push(DiffRow::Spacer);
    }
}

/// Rows for every file, separated by a spacer.
pub fn build_rows(files: &[FileDiff]) -> Vec<DiffRow> {
    let total: usize = files
        .iter()
        .map(|f| 3 + f.hunks.iter().map(|h| h.lines.len() + 2).sum::<usize>())
        .sum();
    let mut rows = Vec::with_capacity(total);

    for (idx, file) in files.iter().enumerate() {
        if idx > 0 {
            rows.push(DiffRow::Spacer);
        }
        push_file_rows(&mut rows, idx, file);
    }
    rows
}

/// Row index of the first line of each hunk.
pub fn hunk_starts(rows: &[DiffRow]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| matches!(row, DiffRow::Line { line: 0, .. }))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parse_diff;

    const TWO_HUNKS: &str = "diff --git a/a.rs b/a.rs
@@ -1,3 +1,3 @@
 a
-b
+B
@@ -20,2 +20,2 @@
-x
+y
";

    #[test]
    fn skip_count_uses_old_ranges() {
        let files = parse_diff(TWO_HUNKS).unwrap();
        let hunks = &files[0].hunks;
        // previous ends at 1 + 3 - 1 = 3, so lines 4..=19 are hidden
        assert_eq!(skipped_lines(&hunks[0], &hunks[1]), 16);
    }

    #[test]
    fn gap_labels() {
        assert_eq!(gap_label(16), "⋯ (16 lines skipped) ⋯");
        assert_eq!(gap_label(0), "⋯");
        assert_eq!(gap_label(-3), "⋯");
    }

    #[test]
    fn header_labels() {
        let files = parse_diff(
            "diff --git a/old.rs b/new.rs\nsimilarity index 90%\nrename from old.rs\nrename to new.rs\n",
        )
        .unwrap();
        assert_eq!(header_label(&files[0]), " renamed: new.rs ");
    }

    #[test]
    fn rows_for_two_hunks() {
        let files = parse_diff(TWO_HUNKS).unwrap();
        let rows = build_rows(&files);
        assert_eq!(
            rows,
            vec![
                DiffRow::FileHeader { file: 0 },
                DiffRow::Spacer,
                DiffRow::Line { file: 0, hunk: 0, line: 0 },
                DiffRow::Line { file: 0, hunk: 0, line: 1 },
                DiffRow::Line { file: 0, hunk: 0, line: 2 },
                DiffRow::Spacer,
                DiffRow::HunkGap { file: 0, skipped: 16 },
                DiffRow::Line { file: 0, hunk: 1, line: 0 },
                DiffRow::Line { file: 0, hunk: 1, line: 1 },
                DiffRow::Spacer,
            ]
        );
        assert_eq!(hunk_starts(&rows), vec![2, 7]);
    }

    #[test]
    fn files_are_separated() {
        let text = format!("{TWO_HUNKS}diff --git a/b.txt b/b.txt\nnew file mode 100644\n");
        let files = parse_diff(&text).unwrap();
        let rows = build_rows(&files);
        let headers: Vec<_> = rows
            .iter()
            .enumerate()
            .filter(|(_, r)| matches!(r, DiffRow::FileHeader { .. }))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(headers, vec![0, 11]);
        assert_eq!(rows[10], DiffRow::Spacer);
        assert_eq!(rows[11].file(), Some(1));
    }
}
