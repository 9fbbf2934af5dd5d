//! Intraline change highlighting by common prefix/suffix trimming.
//!
//! Only the span between the first and last differing character is marked
//! changed. Lines with several disjoint edits get the whole middle marked,
//! identical runs inside it included.

/// A run of text within a rendered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSegment {
    /// Text of the run.
    pub text: String,
    /// Whether this run differs from the counterpart line.
    pub changed: bool,
}

impl InlineSegment {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changed: false,
        }
    }

    fn changed(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changed: true,
        }
    }
}

/// Split `text` into unchanged prefix, changed middle and unchanged suffix
/// relative to `counterpart`. Lengths are measured in chars.
///
/// Returns an empty vec when `counterpart` is empty (no pairing) or when
/// nothing would be emitted; callers then style the whole line.
///
/// # Examples
///
/// ```
/// use critica::core::segment;
///
/// let segments = segment("foobar", "foobaz");
/// assert_eq!(segments[0].text, "fooba");
/// assert!(!segments[0].changed);
/// assert_eq!(segments[1].text, "r");
/// assert!(segments[1].changed);
/// ```
pub fn segment(text: &str, counterpart: &str) -> Vec<InlineSegment> {
    if counterpart.is_empty() {
        return Vec::new();
    }

    let prefix_len = common_prefix_len(text, counterpart);
    let text_rest = skip_chars(text, prefix_len);
    let counter_rest = skip_chars(counterpart, prefix_len);

    let text_len = text.chars().count();
    let suffix_len = common_suffix_len(text_rest, counter_rest).min(text_len - prefix_len);
    let changed_end = prefix_len.max(text_len - suffix_len);

    let prefix_end = byte_offset(text, prefix_len);
    let middle_end = byte_offset(text, changed_end);

    let mut segments = Vec::with_capacity(3);
    if prefix_len > 0 {
        segments.push(InlineSegment::unchanged(&text[..prefix_end]));
    }
    if changed_end > prefix_len {
        segments.push(InlineSegment::changed(&text[prefix_end..middle_end]));
    }
    if suffix_len > 0 && changed_end < text_len {
        segments.push(InlineSegment::unchanged(&text[middle_end..]));
    }

    segments
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    a.chars()
        .rev()
        .zip(b.chars().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn skip_chars(s: &str, n: usize) -> &str {
    &s[byte_offset(s, n)..]
}

/// Byte index of the `n`th char, or `s.len()` past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str, changed: bool) -> InlineSegment {
        InlineSegment {
            text: text.to_string(),
            changed,
        }
    }

    #[test]
    fn empty_counterpart_falls_back() {
        assert!(segment("hello", "").is_empty());
        assert!(segment("", "").is_empty());
    }

    #[test]
    fn empty_text_with_counterpart_is_empty() {
        assert!(segment("", "something").is_empty());
    }

    #[test]
    fn changed_tail() {
        assert_eq!(
            segment("foobar", "foobaz"),
            vec![seg("fooba", false), seg("r", true)]
        );
    }

    #[test]
    fn identical_lines_are_one_unchanged_run() {
        assert_eq!(segment("same", "same"), vec![seg("same", false)]);
    }

    #[test]
    fn changed_middle() {
        assert_eq!(
            segment("let count = 1;", "let total = 1;"),
            vec![seg("let ", false), seg("count", true), seg(" = 1;", false)]
        );
    }

    #[test]
    fn changed_head() {
        assert_eq!(
            segment("xbc", "abc"),
            vec![seg("x", true), seg("bc", false)]
        );
    }

    #[test]
    fn suffix_cannot_overlap_prefix() {
        // "aa" vs "aaa": prefix covers all of text, nothing left for a suffix.
        assert_eq!(segment("aa", "aaa"), vec![seg("aa", false)]);
        // The longer side gets only the inserted char marked.
        assert_eq!(segment("aaa", "aa"), vec![seg("aa", false), seg("a", true)]);
    }

    #[test]
    fn pure_insertion_in_middle() {
        assert_eq!(
            segment("abXcd", "abcd"),
            vec![seg("ab", false), seg("X", true), seg("cd", false)]
        );
        assert_eq!(segment("abcd", "abXcd"), vec![seg("ab", false), seg("cd", false)]);
    }

    #[test]
    fn disjoint_edits_mark_the_whole_span() {
        assert_eq!(
            segment("a1b2c", "a9b8c"),
            vec![seg("a", false), seg("1b2", true), seg("c", false)]
        );
    }

    #[test]
    fn completely_different() {
        assert_eq!(segment("abc", "xyz"), vec![seg("abc", true)]);
    }

    #[test]
    fn multibyte_chars_count_as_one() {
        assert_eq!(
            segment("héllo wörld", "héllo world"),
            vec![seg("héllo w", false), seg("ö", true), seg("rld", false)]
        );
        assert_eq!(
            segment("日本語", "日本人"),
            vec![seg("日本", false), seg("語", true)]
        );
    }
}
