//! `critica ai`: send the current diff to a chat-completion model.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::core::{
    all_branches, branch_diff, create_commit, current_branch, diff_for_mode, is_git_repository,
    parse_diff, push_branch, stage_all, AiConfig, AiError, AiService, DiffMode, FileDiff,
};

const RULE_WIDTH: usize = 50;

/// AI-assisted review of git diffs.
#[derive(Parser, Debug)]
#[command(name = "critica ai", about)]
struct AiCli {
    #[command(subcommand)]
    command: AiCommand,
}

#[derive(Subcommand, Debug)]
enum AiCommand {
    /// Summary, risks and suggestions for the changes
    Analyze(DiffArgs),

    /// Generate a conventional commit message
    Commit {
        #[command(flatten)]
        diff: DiffArgs,

        /// Commit with the generated message (stages everything unless --staged)
        #[arg(long)]
        apply: bool,

        /// Push the branch after committing
        #[arg(long, requires = "apply")]
        push: bool,
    },

    /// Generate a pull request description
    Pr {
        #[command(flatten)]
        diff: DiffArgs,

        /// Describe the current branch against BRANCH instead of the working tree
        #[arg(long, value_name = "BRANCH")]
        base: Option<String>,
    },

    /// Suggest improvements to the changes
    Improve(DiffArgs),

    /// Explain what the changes do
    Explain(DiffArgs),
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Repository or file to diff (defaults to the current directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Only staged changes
    #[arg(short = 's', long = "staged", alias = "cached")]
    staged: bool,
}

impl DiffArgs {
    fn path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn mode(&self) -> DiffMode {
        if self.staged {
            DiffMode::Staged
        } else {
            DiffMode::All
        }
    }
}

/// Run an `ai` subcommand. `args` excludes the program name and `ai`.
pub fn run_ai_command(args: &[String]) -> ExitCode {
    let argv = std::iter::once("critica ai".to_string()).chain(args.iter().cloned());
    let cli = match AiCli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let connect = || AiConfig::from_env().map(AiService::from_config);
    match execute(cli.command, connect, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Diff first, then connect: an empty diff never needs an API key.
fn execute<W: Write>(
    command: AiCommand,
    connect: impl FnOnce() -> Result<AiService, AiError>,
    out: &mut W,
) -> Result<()> {
    match command {
        AiCommand::Analyze(args) => {
            let Some((_, files)) = load_files(&args, "No changes to analyze", out)? else {
                return Ok(());
            };
            let service = connect()?;
            eprintln!("Analyzing changes...");
            let analysis = service.analyze_diff(&files).context("AI analysis failed")?;
            write!(out, "{}", analysis.report())?;
        }
        AiCommand::Commit { diff, apply, push } => {
            let Some((path, files)) = load_files(&diff, "No changes to commit", out)? else {
                return Ok(());
            };
            let service = connect()?;
            eprintln!("Generating commit message...");
            let message = service
                .generate_commit_message(&files)
                .context("commit message generation failed")?;
            write_framed(out, "Generated commit message:", &message)?;

            if apply {
                if !diff.staged {
                    stage_all(&path).context("failed to stage changes")?;
                }
                create_commit(&path, &message).context("failed to create commit")?;
                writeln!(out, "Commit created")?;
                if push {
                    push_branch(&path).context("failed to push branch")?;
                    writeln!(out, "Branch pushed")?;
                }
            }
        }
        AiCommand::Pr {
            diff,
            base: Some(base),
        } => {
            let path = diff.path();
            ensure_repository(&path)?;
            let current = current_branch(&path).context("failed to read current branch")?;
            if current.is_empty() {
                bail!("HEAD is detached; check out a branch to compare against {base}");
            }
            let branches = all_branches(&path).context("failed to list branches")?;
            if !branches.iter().any(|b| *b == base) {
                bail!("unknown branch: {base}");
            }
            let text = branch_diff(&path, &base, &current)
                .with_context(|| format!("failed to diff {base}..{current}"))?;
            if text.trim().is_empty() {
                writeln!(out, "No changes between {base} and {current}")?;
                return Ok(());
            }
            let service = connect()?;
            eprintln!("Generating PR description for {current} -> {base}...");
            let description = service
                .generate_pr_description_with_branches(&text, &current, &base)
                .context("PR description generation failed")?;
            write_framed(out, "Generated PR description:", &description)?;
        }
        AiCommand::Pr { diff, base: None } => {
            let Some((_, files)) = load_files(&diff, "No changes to describe", out)? else {
                return Ok(());
            };
            let service = connect()?;
            eprintln!("Generating PR description...");
            let description = service
                .generate_pr_description(&files)
                .context("PR description generation failed")?;
            write_framed(out, "Generated PR description:", &description)?;
        }
        AiCommand::Improve(args) => {
            let Some((_, files)) = load_files(&args, "No changes to review", out)? else {
                return Ok(());
            };
            let service = connect()?;
            eprintln!("Collecting suggestions...");
            let suggestions = service
                .suggest_improvements(&files)
                .context("improvement suggestions failed")?;
            if suggestions.is_empty() {
                writeln!(out, "No suggestions")?;
            } else {
                writeln!(out, "Suggestions:")?;
                for (i, item) in suggestions.iter().enumerate() {
                    writeln!(out, "  {}. {item}", i + 1)?;
                }
            }
        }
        AiCommand::Explain(args) => {
            let Some((_, files)) = load_files(&args, "No changes to explain", out)? else {
                return Ok(());
            };
            let service = connect()?;
            eprintln!("Explaining changes...");
            let explanation = service
                .explain_changes(&files)
                .context("explanation failed")?;
            writeln!(out, "{explanation}")?;
        }
    }
    Ok(())
}

fn ensure_repository(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("path does not exist: {}", path.display());
    }
    if !is_git_repository(path) {
        bail!("not a git repository: {}", path.display());
    }
    Ok(())
}

/// Parsed diff for `args`, or `None` after printing `empty` when there is
/// nothing to send.
fn load_files<W: Write>(
    args: &DiffArgs,
    empty: &str,
    out: &mut W,
) -> Result<Option<(PathBuf, Vec<FileDiff>)>> {
    let path = args.path();
    ensure_repository(&path)?;

    let mode = args.mode();
    let text = diff_for_mode(&path, mode)
        .with_context(|| format!("failed to get {} diff", mode.name()))?;
    if text.trim().is_empty() {
        writeln!(out, "{empty}")?;
        return Ok(None);
    }
    let files = parse_diff(&text).context("failed to parse diff")?;
    Ok(Some((path, files)))
}

fn write_framed<W: Write>(out: &mut W, heading: &str, body: &str) -> io::Result<()> {
    let rule = "─".repeat(RULE_WIDTH);
    writeln!(out, "{heading}")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{body}")?;
    writeln!(out, "{rule}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Completion;
    use std::fs;
    use std::process::Command;
    use tempfile::TempDir;

    struct Reply(&'static str);

    impl Completion for Reply {
        fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.0.to_string())
        }
    }

    fn git(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(output.status.success(), "git {:?} failed", args);
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        git(dir.path(), &["init", "-q", "-b", "main"]);
        git(dir.path(), &["config", "user.email", "dev@example.com"]);
        git(dir.path(), &["config", "user.name", "Dev"]);
        fs::write(dir.path().join("notes.txt"), "one\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "init"]);
        dir
    }

    fn parse(args: &[&str]) -> Result<AiCli, clap::Error> {
        AiCli::try_parse_from(std::iter::once("critica ai").chain(args.iter().copied()))
    }

    fn run(command: AiCommand, reply: &'static str) -> Result<String> {
        let mut out = Vec::new();
        execute(command, || Ok(AiService::new(Reply(reply))), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn diff_args(dir: &TempDir) -> DiffArgs {
        DiffArgs {
            path: Some(dir.path().to_path_buf()),
            staged: false,
        }
    }

    #[test]
    fn parses_subcommands() {
        let cli = parse(&["commit", "--apply", "--push", "repo"]).unwrap();
        match cli.command {
            AiCommand::Commit { diff, apply, push } => {
                assert!(apply && push);
                assert_eq!(diff.path, Some(PathBuf::from("repo")));
            }
            other => panic!("unexpected {:?}", other),
        }

        let cli = parse(&["pr", "--base", "main", "--cached"]).unwrap();
        match cli.command {
            AiCommand::Pr { diff, base } => {
                assert_eq!(base.as_deref(), Some("main"));
                assert!(diff.staged);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn push_requires_apply() {
        assert!(parse(&["commit", "--push"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn empty_diff_skips_the_model() {
        let dir = repo();
        let mut out = Vec::new();
        execute(
            AiCommand::Explain(diff_args(&dir)),
            || Err(AiError::MissingApiKey),
            &mut out,
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No changes to explain\n");
    }

    #[test]
    fn missing_api_key_is_reported() {
        let dir = repo();
        fs::write(dir.path().join("notes.txt"), "two\n").unwrap();
        let err = execute(
            AiCommand::Analyze(diff_args(&dir)),
            || Err(AiError::MissingApiKey),
            &mut Vec::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"), "{err}");
    }

    #[test]
    fn not_a_repository_fails_early() {
        let dir = TempDir::new().unwrap();
        let err = run(AiCommand::Improve(diff_args(&dir)), "").unwrap_err();
        assert!(err.to_string().starts_with("not a git repository"));
    }

    #[test]
    fn commit_apply_stages_and_commits() {
        let dir = repo();
        fs::write(dir.path().join("notes.txt"), "two\n").unwrap();
        fs::write(dir.path().join("extra.txt"), "new\n").unwrap();

        let out = run(
            AiCommand::Commit {
                diff: diff_args(&dir),
                apply: true,
                push: false,
            },
            "  feat: update notes\n",
        )
        .unwrap();
        assert!(out.starts_with("Generated commit message:\n"));
        assert!(out.contains("\nfeat: update notes\n"));
        assert!(out.ends_with("Commit created\n"));

        assert_eq!(git(dir.path(), &["log", "-1", "--format=%s"]), "feat: update notes\n");
        assert_eq!(git(dir.path(), &["status", "--porcelain"]), "");
    }

    #[test]
    fn improvements_are_numbered() {
        let dir = repo();
        fs::write(dir.path().join("notes.txt"), "two\n").unwrap();
        let out = run(
            AiCommand::Improve(diff_args(&dir)),
            "Add a test\n- ignored\n\nName the constant\n",
        )
        .unwrap();
        assert_eq!(out, "Suggestions:\n  1. Add a test\n  2. Name the constant\n");
    }

    #[test]
    fn pr_against_base_branch() {
        let dir = repo();
        git(dir.path(), &["checkout", "-q", "-b", "feature"]);
        fs::write(dir.path().join("notes.txt"), "feature\n").unwrap();
        git(dir.path(), &["commit", "-q", "-am", "feature work"]);

        let out = run(
            AiCommand::Pr {
                diff: diff_args(&dir),
                base: Some("main".to_string()),
            },
            "## Summary\nFeature work",
        )
        .unwrap();
        assert!(out.contains("## Summary\nFeature work\n"));

        let err = run(
            AiCommand::Pr {
                diff: diff_args(&dir),
                base: Some("nope".to_string()),
            },
            "",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "unknown branch: nope");

        git(dir.path(), &["checkout", "-q", "main"]);
        let out = run(
            AiCommand::Pr {
                diff: diff_args(&dir),
                base: Some("main".to_string()),
            },
            "",
        )
        .unwrap();
        assert_eq!(out, "No changes between main and main\n");
    }
}
