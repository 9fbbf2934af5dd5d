//! critica - side-by-side git diffs in the terminal.

use std::io::{self, BufWriter, Write};
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use critica::cli::run_ai_command;
use critica::core::{
    diff_for_mode, parse_diff, AiConfig, AiService, Config, DiffMode, FileDiff,
};
use critica::theme::Theme;
use critica::ui::{
    handle_input, print_diff, render, terminal_width, App, GitLoader, PrintOptions, ViewLayout,
};

/// Side-by-side terminal viewer for git diffs.
#[derive(Parser, Debug)]
#[command(name = "critica", version, about)]
struct Cli {
    /// File or directory to diff (defaults to the current directory)
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Show only staged changes
    #[arg(short = 's', long = "staged")]
    staged: bool,

    /// Alias for --staged
    #[arg(short = 'c', long = "cached")]
    cached: bool,

    /// Disable colors and syntax highlighting
    #[arg(long = "no-color")]
    no_color: bool,

    /// Single-column unified layout instead of split
    #[arg(short = 'u', long = "unified")]
    unified: bool,

    /// Open the interactive viewer
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Color theme (default, catppuccin, dracula, gruvbox, nord, or a user theme)
    #[arg(short = 't', long = "theme", value_name = "THEME")]
    theme: Option<String>,

    /// Which changes to show
    #[arg(long = "mode", value_name = "MODE", value_parser = parse_mode)]
    mode: Option<DiffMode>,

    /// Print available theme names and exit
    #[arg(long = "list-themes")]
    list_themes: bool,
}

fn parse_mode(s: &str) -> Result<DiffMode, String> {
    DiffMode::from_name(s).ok_or_else(|| format!("expected all, staged or unstaged, got '{s}'"))
}

/// Effective options after merging flags, config file and defaults.
#[derive(Debug)]
struct Settings {
    path: PathBuf,
    mode: DiffMode,
    layout: ViewLayout,
    interactive: bool,
    color: bool,
    theme: Theme,
}

impl Settings {
    fn resolve(cli: Cli, config: Config) -> Self {
        let mode = if cli.staged || cli.cached {
            DiffMode::Staged
        } else {
            cli.mode.or(config.diff_mode).unwrap_or_default()
        };
        let unified = cli.unified || config.unified.unwrap_or(false);
        let no_color = cli.no_color || config.no_color.unwrap_or(false);

        let theme_name = cli
            .theme
            .or(config.theme)
            .unwrap_or_else(|| "default".to_string());
        let theme = Theme::load(&theme_name)
            .with_style(config.diff_style.unwrap_or_default())
            .with_overrides(
                config.added_text_color.as_deref(),
                config.deleted_text_color.as_deref(),
            );

        Self {
            path: cli.path.unwrap_or_else(|| PathBuf::from(".")),
            mode,
            layout: if unified {
                ViewLayout::Unified
            } else {
                ViewLayout::Split
            },
            interactive: cli.interactive || config.interactive.unwrap_or(false),
            color: !no_color,
            theme,
        }
    }
}

/// RAII guard for terminal state. Restores terminal on drop (including panic).
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
    let _ = disable_raw_mode();
    let _ = io::stdout().flush();
}

fn main() -> ExitCode {
    critica::metrics::init();

    // Check for the ai subcommand first (before clap parsing)
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("ai") {
        return run_ai_command(&args[2..]);
    }

    let cli = Cli::parse();
    if cli.list_themes {
        for name in Theme::list() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring config file: {}", e);
            Config::default()
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(cli, load_config());

    if !settings.path.exists() {
        bail!("path does not exist: {}", settings.path.display());
    }

    let text = diff_for_mode(&settings.path, settings.mode)
        .with_context(|| format!("failed to get {} diff", settings.mode.name()))?;
    if text.trim().is_empty() {
        println!("No changes to display");
        return Ok(());
    }

    let files = parse_diff(&text).context("failed to parse diff")?;
    critica::metrics::record("files", files.len());

    if settings.interactive {
        run_tui(settings, files)
    } else {
        print_static(&settings, &files)
    }
}

fn print_static(settings: &Settings, files: &[FileDiff]) -> Result<()> {
    let opts = PrintOptions {
        layout: settings.layout,
        width: terminal_width(),
        color: settings.color,
    };
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match print_diff(&mut out, files, &settings.theme, opts) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("failed to write diff"),
    }
}

/// Run the TUI application.
fn run_tui(settings: Settings, files: Vec<FileDiff>) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    let mut app = App::new(
        Box::new(GitLoader::new(settings.path)),
        settings.mode,
        files,
        settings.theme,
        settings.layout,
    );
    if let Ok(config) = AiConfig::from_env() {
        app = app.with_ai(AiService::from_config(config));
    }

    let _guard = TerminalGuard::new().context("failed to set up terminal")?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    run_loop(&mut terminal, &mut app)
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.poll_ai_worker();

        if app.ui.dirty {
            terminal.draw(|frame| render(frame, app))?;
            app.clear_dirty();
        }

        if event::poll(Duration::from_millis(50))? {
            handle_input(app, event::read()?);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
