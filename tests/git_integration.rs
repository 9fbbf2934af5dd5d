//! Integration tests with real git repositories.

use std::path::Path;
use std::process::Command;

use critica::core::{
    all_branches, branch_diff, create_commit, current_branch, diff_for_mode, has_staged_changes,
    is_git_repository, parse_diff, push_branch, stage_all, DiffMode, FileStatus, GitError,
    LineKind,
};
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
}

/// Create a temporary git repo with one commit of two files.
fn create_test_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let path = dir.path();

    git(path, &["init", "-q"]);
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    std::fs::write(path.join("file.txt"), "initial content\n").unwrap();
    std::fs::write(path.join("other.txt"), "one\ntwo\nthree\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-q", "-m", "initial"]);

    dir
}

fn paths(text: &str) -> Vec<String> {
    parse_diff(text)
        .unwrap()
        .into_iter()
        .map(|f| f.new_path)
        .collect()
}

#[test]
fn clean_repo_has_empty_diff() {
    let dir = create_test_repo();
    for mode in [DiffMode::All, DiffMode::Staged, DiffMode::Unstaged] {
        assert_eq!(diff_for_mode(dir.path(), mode).unwrap(), "");
    }
}

#[test]
fn modified_file_shows_in_all_mode() {
    let dir = create_test_repo();
    std::fs::write(dir.path().join("file.txt"), "modified content\n").unwrap();

    let text = diff_for_mode(dir.path(), DiffMode::All).unwrap();
    let files = parse_diff(&text).unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].new_path, "file.txt");
    assert_eq!(files[0].status(), FileStatus::Modified);
    let kinds: Vec<LineKind> = files[0].hunks[0].lines.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![LineKind::Deleted, LineKind::Added]);
    assert_eq!(files[0].hunks[0].lines[1].content, "modified content");
}

#[test]
fn staged_and_unstaged_are_separate() {
    let dir = create_test_repo();
    let path = dir.path();

    std::fs::write(path.join("file.txt"), "staged change\n").unwrap();
    git(path, &["add", "file.txt"]);
    std::fs::write(path.join("other.txt"), "one\nTWO\nthree\n").unwrap();

    let staged = diff_for_mode(path, DiffMode::Staged).unwrap();
    assert_eq!(paths(&staged), vec!["file.txt"]);

    let unstaged = diff_for_mode(path, DiffMode::Unstaged).unwrap();
    assert_eq!(paths(&unstaged), vec!["other.txt"]);

    let all = diff_for_mode(path, DiffMode::All).unwrap();
    assert_eq!(paths(&all), vec!["file.txt", "other.txt"]);
}

#[test]
fn untracked_files_are_synthesized() {
    let dir = create_test_repo();
    let path = dir.path();
    std::fs::write(path.join("new.rs"), "fn main() {}\nfn other() {}").unwrap();

    let all = diff_for_mode(path, DiffMode::All).unwrap();
    assert!(all.contains("--- /dev/null\n+++ b/new.rs\n@@ -0,0 +1,2 @@\n"));

    let files = parse_diff(&all).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].status(), FileStatus::New);
    assert_eq!(files[0].extension, "rs");
    assert_eq!(files[0].hunks[0].lines.len(), 2);
    assert_eq!(files[0].hunks[0].lines[1].new_line_number, Some(2));

    let unstaged = diff_for_mode(path, DiffMode::Unstaged).unwrap();
    assert_eq!(paths(&unstaged), vec!["new.rs"]);

    let staged = diff_for_mode(path, DiffMode::Staged).unwrap();
    assert!(staged.is_empty());
}

#[test]
fn tracked_and_untracked_blocks_are_joined() {
    let dir = create_test_repo();
    let path = dir.path();
    std::fs::write(path.join("file.txt"), "changed\n").unwrap();
    std::fs::write(path.join("zzz.txt"), "hello\n").unwrap();

    let all = diff_for_mode(path, DiffMode::All).unwrap();
    assert_eq!(paths(&all), vec!["file.txt", "zzz.txt"]);
}

#[test]
fn binary_and_ignored_untracked_files_are_skipped() {
    let dir = create_test_repo();
    let path = dir.path();
    std::fs::write(path.join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
    std::fs::write(path.join(".gitignore"), "ignored.txt\n").unwrap();
    std::fs::write(path.join("ignored.txt"), "secret\n").unwrap();

    let all = diff_for_mode(path, DiffMode::All).unwrap();
    assert_eq!(paths(&all), vec![".gitignore"]);
}

#[test]
fn file_target_limits_output() {
    let dir = create_test_repo();
    let path = dir.path();
    std::fs::write(path.join("file.txt"), "changed\n").unwrap();
    std::fs::write(path.join("other.txt"), "changed too\n").unwrap();
    std::fs::write(path.join("untracked.txt"), "new\n").unwrap();

    let one = diff_for_mode(&path.join("other.txt"), DiffMode::All).unwrap();
    assert_eq!(paths(&one), vec!["other.txt"]);

    let untracked = diff_for_mode(&path.join("untracked.txt"), DiffMode::All).unwrap();
    assert_eq!(paths(&untracked), vec!["untracked.txt"]);
}

#[test]
fn outside_a_repository() {
    let dir = TempDir::new().unwrap();
    assert!(!is_git_repository(dir.path()));
    assert!(!is_git_repository(&dir.path().join("missing")));

    match diff_for_mode(dir.path(), DiffMode::All) {
        Err(GitError::NotARepo(_)) => {}
        other => panic!("expected NotARepo, got {:?}", other),
    }
}

#[test]
fn repository_detection() {
    let dir = create_test_repo();
    assert!(is_git_repository(dir.path()));
    assert!(is_git_repository(&dir.path().join("file.txt")));
}

fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

#[test]
fn branches_and_branch_diff() {
    let dir = create_test_repo();
    let path = dir.path();
    let base = current_branch(path).unwrap();
    assert!(!base.is_empty());

    git(path, &["checkout", "-q", "-b", "feature"]);
    std::fs::write(path.join("file.txt"), "feature content\n").unwrap();
    git(path, &["commit", "-q", "-am", "feature work"]);
    assert_eq!(current_branch(path).unwrap(), "feature");

    let branches = all_branches(path).unwrap();
    assert!(branches.contains(&"feature".to_string()));
    assert!(branches.contains(&base));
    assert_eq!(branches.len(), 2);

    let text = branch_diff(path, &base, "feature").unwrap();
    let files = parse_diff(&text).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].new_path, "file.txt");
    let added: Vec<&str> = files[0].hunks[0]
        .lines
        .iter()
        .filter(|l| l.kind == LineKind::Added)
        .map(|l| l.content.as_str())
        .collect();
    assert_eq!(added, vec!["feature content"]);

    assert_eq!(branch_diff(path, "feature", "feature").unwrap(), "");
    assert!(matches!(
        branch_diff(path, &base, "no-such-branch"),
        Err(GitError::CommandFailed(_))
    ));
}

#[test]
fn stage_and_commit() {
    let dir = create_test_repo();
    let path = dir.path();
    assert!(!has_staged_changes(path).unwrap());

    std::fs::write(path.join("file.txt"), "changed\n").unwrap();
    std::fs::write(path.join("brand_new.txt"), "new\n").unwrap();
    assert!(!has_staged_changes(path).unwrap());

    stage_all(path).unwrap();
    assert!(has_staged_changes(path).unwrap());

    create_commit(path, "feat: second commit").unwrap();
    assert!(!has_staged_changes(path).unwrap());
    assert_eq!(git_stdout(path, &["log", "-1", "--format=%s"]), "feat: second commit");
    assert_eq!(diff_for_mode(path, DiffMode::All).unwrap(), "");

    match create_commit(path, "nothing to commit") {
        Err(GitError::CommandFailed(msg)) => assert!(msg.starts_with("git commit:")),
        other => panic!("expected commit failure, got {:?}", other),
    }
}

#[test]
fn push_to_bare_remote() {
    let dir = create_test_repo();
    let path = dir.path();
    let remote = TempDir::new().unwrap();
    git(remote.path(), &["init", "-q", "--bare"]);

    let remote_url = remote.path().to_string_lossy().to_string();
    git(path, &["remote", "add", "origin", &remote_url]);
    git(path, &["push", "-q", "-u", "origin", "HEAD"]);

    std::fs::write(path.join("other.txt"), "pushed\n").unwrap();
    stage_all(path).unwrap();
    create_commit(path, "to be pushed").unwrap();
    push_branch(path).unwrap();

    let branch = current_branch(path).unwrap();
    assert_eq!(
        git_stdout(remote.path(), &["log", "-1", "--format=%s", &branch]),
        "to be pushed"
    );
}

#[test]
fn push_without_remote_fails() {
    let dir = create_test_repo();
    match push_branch(dir.path()) {
        Err(GitError::CommandFailed(msg)) => assert!(msg.starts_with("git push:")),
        other => panic!("expected push failure, got {:?}", other),
    }
}
