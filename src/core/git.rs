//! Git subprocess access: repository checks, diff text retrieval, and the
//! branch, commit and push helpers behind the `ai` commands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;

/// Untracked files larger than this (50 MiB) are left out of the diff.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Unified context lines requested from `git diff`.
pub const CONTEXT_LINES: u32 = 5;

/// Errors from git operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitError {
    /// Path is not inside a git repository.
    #[error("not a git repository: {0}")]
    NotARepo(String),
    /// Git exited unsuccessfully; carries its stderr.
    #[error("{0}")]
    CommandFailed(String),
    /// Branch name that is empty or would be read as an option.
    #[error("invalid branch name: '{0}'")]
    InvalidBranch(String),
    /// Spawning git or reading files failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which changes to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    /// Staged and unstaged changes against HEAD, plus untracked files.
    #[default]
    All,
    /// Changes in the index only.
    Staged,
    /// Working tree changes not yet staged, plus untracked files.
    Unstaged,
}

impl DiffMode {
    /// Parse a mode name (`all`, `staged`, `unstaged`), ignoring case and
    /// surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "staged" => Some(Self::Staged),
            "unstaged" => Some(Self::Unstaged),
            _ => None,
        }
    }

    /// Lowercase mode name.
    pub fn name(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Staged => "staged",
            Self::Unstaged => "unstaged",
        }
    }

    /// Display label for UI chrome.
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Staged => "Staged",
            Self::Unstaged => "Unstaged",
        }
    }

    /// Next mode in the All → Staged → Unstaged cycle.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Staged,
            Self::Staged => Self::Unstaged,
            Self::Unstaged => Self::All,
        }
    }

    fn includes_untracked(self) -> bool {
        matches!(self, Self::All | Self::Unstaged)
    }

    fn revision_args(self) -> &'static [&'static str] {
        match self {
            Self::All => &["HEAD"],
            Self::Staged => &["--staged"],
            Self::Unstaged => &[],
        }
    }
}

/// Check whether `path` lies inside a git work tree.
pub fn is_git_repository(path: &Path) -> bool {
    let Ok(abs) = std::path::absolute(path) else {
        return false;
    };
    if !abs.exists() {
        return false;
    }

    Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(work_dir(&abs))
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Fetch the unified diff text for `path` in the given mode.
///
/// In modes that include untracked files, a synthetic new-file block is
/// appended for each readable text file git does not track.
#[must_use = "this returns a Result that should be checked"]
pub fn diff_for_mode(path: &Path, mode: DiffMode) -> Result<String, GitError> {
    let _timer = crate::metrics::Timer::start("git_diff");

    let abs = std::path::absolute(path)?;
    if !is_git_repository(&abs) {
        return Err(GitError::NotARepo(path.display().to_string()));
    }
    let dir = work_dir(&abs);

    let mut diff = run_git_diff(&abs, &dir, mode)?;

    if mode.includes_untracked() {
        let untracked = untracked_files_diff(&abs, &dir)?;
        if !untracked.is_empty() {
            if !diff.is_empty() {
                diff.push('\n');
            }
            diff.push_str(&untracked);
        }
    }

    Ok(diff)
}

/// Directory to run git in: the path itself, or its parent for files.
fn work_dir(abs: &Path) -> PathBuf {
    if abs.is_file() {
        abs.parent().map(Path::to_path_buf).unwrap_or_else(|| abs.to_path_buf())
    } else {
        abs.to_path_buf()
    }
}

fn run_git_diff(target: &Path, dir: &Path, mode: DiffMode) -> Result<String, GitError> {
    let context = format!("-U{CONTEXT_LINES}");
    let output = Command::new("git")
        .arg("diff")
        .args(mode.revision_args())
        .args([context.as_str(), "--no-color", "--"])
        .arg(target)
        .current_dir(dir)
        .output()?;

    diff_output(output)
}

/// Interpret `git diff` output. Exit status 1 with output still carries a diff.
fn diff_output(output: Output) -> Result<String, GitError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if output.status.success() {
        return Ok(stdout);
    }
    if output.status.code() == Some(1) && !stdout.is_empty() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        Err(GitError::CommandFailed(output.status.to_string()))
    } else {
        Err(GitError::CommandFailed(stderr))
    }
}

fn untracked_files_diff(target: &Path, dir: &Path) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(["ls-files", "--others", "--exclude-standard"])
        .current_dir(dir)
        .output()?;
    if !output.status.success() {
        return Ok(String::new());
    }

    // For a single-file target only that file's own entry qualifies.
    let only_name = target
        .is_file()
        .then(|| target.file_name().map(|n| n.to_string_lossy().into_owned()))
        .flatten();

    let listing = String::from_utf8_lossy(&output.stdout);
    let mut result = String::new();

    for file in listing.lines().filter(|f| !f.is_empty()) {
        if only_name.as_deref().is_some_and(|name| name != file) {
            continue;
        }
        if let Some(content) = read_text_file(&dir.join(file)) {
            result.push_str(&synthesize_new_file_diff(file, &content));
        }
    }

    Ok(result)
}

/// Read a file as text. `None` for unreadable, oversized or binary files.
fn read_text_file(path: &Path) -> Option<String> {
    let meta = std::fs::metadata(path).ok()?;
    if !meta.is_file() || meta.len() > MAX_FILE_SIZE {
        return None;
    }
    let bytes = std::fs::read(path).ok()?;
    if is_binary(&bytes) {
        return None;
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn is_binary(bytes: &[u8]) -> bool {
    let check_len = bytes.len().min(8000);
    bytes[..check_len].contains(&0)
}

/// Name of the checked-out branch; empty on a detached HEAD.
pub fn current_branch(path: &Path) -> Result<String, GitError> {
    Ok(run_git(path, &["branch", "--show-current"])?.trim().to_string())
}

/// Local and remote branch names, deduplicated, `origin/` stripped.
pub fn all_branches(path: &Path) -> Result<Vec<String>, GitError> {
    Ok(parse_branch_list(&run_git(path, &["branch", "-a"])?))
}

/// Parse `git branch -a` output.
///
/// The current-branch marker and `remotes/` and `origin/` prefixes are
/// removed. `HEAD` pointers are skipped. First occurrence wins.
pub fn parse_branch_list(listing: &str) -> Vec<String> {
    let mut branches: Vec<String> = Vec::new();
    for line in listing.lines() {
        let line = line.trim();
        let line = line.strip_prefix("* ").unwrap_or(line);
        let line = line.strip_prefix("remotes/").unwrap_or(line);
        if line.is_empty() || line.contains("HEAD") {
            continue;
        }
        let name = line.strip_prefix("origin/").unwrap_or(line);
        if !branches.iter().any(|b| b == name) {
            branches.push(name.to_string());
        }
    }
    branches
}

/// Diff text between two branches (`git diff <from> <to>`).
#[must_use = "this returns a Result that should be checked"]
pub fn branch_diff(path: &Path, from: &str, to: &str) -> Result<String, GitError> {
    let _timer = crate::metrics::Timer::start("git_branch_diff");
    for name in [from, to] {
        if name.trim().is_empty() || name.starts_with('-') {
            return Err(GitError::InvalidBranch(name.to_string()));
        }
    }

    let abs = std::path::absolute(path)?;
    let context = format!("-U{CONTEXT_LINES}");
    let output = Command::new("git")
        .args(["diff", context.as_str(), "--no-color", from, to])
        .current_dir(work_dir(&abs))
        .output()?;

    diff_output(output)
}

/// Whether the index differs from HEAD.
pub fn has_staged_changes(path: &Path) -> Result<bool, GitError> {
    let abs = std::path::absolute(path)?;
    let output = Command::new("git")
        .args(["diff", "--staged", "--quiet"])
        .current_dir(work_dir(&abs))
        .output()?;

    match output.status.code() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(command_failed("diff", &output)),
    }
}

/// Stage every change under the working directory (`git add .`).
pub fn stage_all(path: &Path) -> Result<(), GitError> {
    run_git(path, &["add", "."]).map(drop)
}

/// Commit the index with `message`.
pub fn create_commit(path: &Path, message: &str) -> Result<(), GitError> {
    run_git(path, &["commit", "-q", "-m", message]).map(drop)
}

/// Push the current branch to its upstream.
pub fn push_branch(path: &Path) -> Result<(), GitError> {
    run_git(path, &["push", "-q"]).map(drop)
}

/// Run git in the directory for `path` and return its stdout.
fn run_git(path: &Path, args: &[&str]) -> Result<String, GitError> {
    let abs = std::path::absolute(path)?;
    let output = Command::new("git")
        .args(args)
        .current_dir(work_dir(&abs))
        .output()?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(command_failed(args.first().copied().unwrap_or_default(), &output))
    }
}

fn command_failed(subcommand: &str, output: &Output) -> GitError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let detail = if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr
    };
    GitError::CommandFailed(format!("git {subcommand}: {detail}"))
}

/// Build a `new file` diff block for content git does not track yet.
///
/// Matches what `git diff` prints for an added file: a single
/// `@@ -0,0 +1,N @@` hunk of `+` lines. Empty files get no hunk.
///
/// # Examples
///
/// ```
/// use critica::core::synthesize_new_file_diff;
///
/// let block = synthesize_new_file_diff("notes.txt", "a\nb\n");
/// assert!(block.contains("@@ -0,0 +1,2 @@\n+a\n+b\n"));
/// ```
pub fn synthesize_new_file_diff(path: &str, content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2 * path.len() + 96);
    let _ = writeln!(out, "diff --git a/{path} b/{path}");
    out.push_str("new file mode 100644\n");
    out.push_str("index 0000000..0000000\n");
    out.push_str("--- /dev/null\n");
    let _ = writeln!(out, "+++ b/{path}");

    if content.is_empty() {
        return out;
    }

    let lines: Vec<&str> = content.lines().collect();
    let _ = writeln!(out, "@@ -0,0 +1,{} @@", lines.len());
    for line in &lines {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    if !content.ends_with('\n') {
        out.push_str("\\ No newline at end of file\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_diff, LineKind};

    #[test]
    fn mode_names_round_trip() {
        for mode in [DiffMode::All, DiffMode::Staged, DiffMode::Unstaged] {
            assert_eq!(DiffMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(DiffMode::from_name("  STAGED "), Some(DiffMode::Staged));
        assert_eq!(DiffMode::from_name("cached"), None);
    }

    #[test]
    fn mode_cycle_visits_all() {
        let mode = DiffMode::All;
        assert_eq!(mode.next(), DiffMode::Staged);
        assert_eq!(mode.next().next(), DiffMode::Unstaged);
        assert_eq!(mode.next().next().next(), DiffMode::All);
    }

    #[test]
    fn untracked_only_for_working_tree_modes() {
        assert!(DiffMode::All.includes_untracked());
        assert!(DiffMode::Unstaged.includes_untracked());
        assert!(!DiffMode::Staged.includes_untracked());
    }

    #[test]
    fn synthesized_block_format() {
        let block = synthesize_new_file_diff("src/new.rs", "fn main() {}\n");
        assert_eq!(
            block,
            "diff --git a/src/new.rs b/src/new.rs\n\
             new file mode 100644\n\
             index 0000000..0000000\n\
             --- /dev/null\n\
             +++ b/src/new.rs\n\
             @@ -0,0 +1,1 @@\n\
             +fn main() {}\n"
        );
    }

    #[test]
    fn synthesized_block_parses_as_new_file() {
        let block = synthesize_new_file_diff("a.txt", "one\ntwo\nthree");
        let files = parse_diff(&block).unwrap();
        assert_eq!(files.len(), 1);

        let file = &files[0];
        assert!(file.is_new);
        assert_eq!(file.new_path, "a.txt");
        let hunk = &file.hunks[0];
        assert_eq!((hunk.new_start, hunk.new_line_count), (1, 3));
        assert_eq!(hunk.lines.len(), 3);
        assert!(hunk.lines.iter().all(|l| l.kind == LineKind::Added));
        assert_eq!(hunk.lines[2].new_line_number, Some(3));
    }

    #[test]
    fn empty_untracked_file_has_no_hunk() {
        let files = parse_diff(&synthesize_new_file_diff("empty", "")).unwrap();
        assert!(files[0].is_new);
        assert!(files[0].hunks.is_empty());
    }

    #[test]
    fn branch_listing_is_cleaned() {
        let listing = "  feature/x\n* main\n  remotes/origin/HEAD -> origin/main\n  remotes/origin/main\n  remotes/origin/release\n  remotes/upstream/main\n\n";
        assert_eq!(
            parse_branch_list(listing),
            vec!["feature/x", "main", "release", "upstream/main"]
        );
        assert!(parse_branch_list("").is_empty());
    }

    #[test]
    fn branch_names_are_validated() {
        let dir = std::env::temp_dir();
        for bad in ["", "  ", "--output=/tmp/x"] {
            match branch_diff(&dir, bad, "main") {
                Err(GitError::InvalidBranch(name)) => assert_eq!(name, bad),
                other => panic!("expected InvalidBranch, got {:?}", other),
            }
        }
    }

    #[test]
    fn binary_detection() {
        assert!(is_binary(b"abc\0def"));
        assert!(!is_binary(b"plain text\n"));
    }
}
