//! Fuzzy path filter for the interactive file list.

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

/// Ranks file paths against a typed query.
pub struct PathFilter {
    matcher: Matcher,
    scratch: Vec<char>,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl PathFilter {
    /// Matcher tuned for file paths.
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT.match_paths()),
            scratch: Vec::new(),
        }
    }

    /// Indices of `paths` matching `query`, best score first.
    ///
    /// A blank query matches everything in the original order. Equal scores
    /// keep their original relative order.
    pub fn rank<S: AsRef<str>>(&mut self, query: &str, paths: &[S]) -> Vec<usize> {
        let query = query.trim();
        if query.is_empty() {
            return (0..paths.len()).collect();
        }

        let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);
        let mut scored: Vec<(usize, u32)> = Vec::new();
        for (idx, path) in paths.iter().enumerate() {
            let haystack = Utf32Str::new(path.as_ref(), &mut self.scratch);
            if let Some(score) = pattern.score(haystack, &mut self.matcher) {
                scored.push((idx, score));
            }
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(idx, _)| idx).collect()
    }

    /// Whether a single path matches `query`.
    pub fn is_match(&mut self, query: &str, path: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        let pattern = Pattern::new(query, CaseMatching::Smart, Normalization::Smart, AtomKind::Fuzzy);
        let haystack = Utf32Str::new(path, &mut self.scratch);
        pattern.score(haystack, &mut self.matcher).is_some()
    }
}
