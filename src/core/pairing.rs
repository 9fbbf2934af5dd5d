//! Delete/add line pairing within a hunk.

use std::collections::HashMap;

use crate::core::{Line, LineKind};

/// Pair map for one hunk: line index to the content of its counterpart.
pub type LinePairs<'a> = HashMap<usize, &'a str>;

/// Pair each deleted line that is immediately followed by an added line.
///
/// Greedy, single pass, left to right. A matched added line is never
/// reconsidered as the start of another pair, so a run of `N` deletions
/// followed by `M` additions pairs only the one adjacent slot at the
/// boundary. Indices without an entry are pure insertions or deletions.
///
/// Recompute per hunk when rendering; the result borrows from `lines`.
///
/// # Examples
///
/// ```
/// use critica::core::{compute_pairs, parse_diff};
///
/// let files = parse_diff("diff --git a/f b/f\n@@ -1 +1 @@\n-old\n+new\n").unwrap();
/// let pairs = compute_pairs(&files[0].hunks[0].lines);
/// assert_eq!(pairs.get(&0), Some(&"new"));
/// assert_eq!(pairs.get(&1), Some(&"old"));
/// ```
pub fn compute_pairs(lines: &[Line]) -> LinePairs<'_> {
    let mut pairs = HashMap::new();
    let mut i = 0;

    while i + 1 < lines.len() {
        let current = &lines[i];
        let next = &lines[i + 1];

        if current.kind == LineKind::Deleted && next.kind == LineKind::Added {
            pairs.insert(i, next.content.as_str());
            pairs.insert(i + 1, current.content.as_str());
            i += 2;
        } else {
            i += 1;
        }
    }

    pairs
}
