//! Top-level CLI definition and dispatch.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::{Color, Colorize};

use crate::core::config::Config;
use crate::core::errors::{DteError, Result};
use crate::logger::JsonlLogger;
use crate::request::{HttpVerdictService, MockVerdictService, VerdictService, mock};
use crate::session::render::render_backstage;
use crate::session::{
    SUGGESTED_CLAIMS, Screen, SessionModel, SessionMsg, SessionReport, SessionRuntime,
};
use crate::verdict::Verdict;

/// Exit status for the error screen.
pub const EXIT_ERROR_SCREEN: i32 = 2;

/// Dinner Table Economist: fact-check the economic claims you hear at dinner.
#[derive(Debug, Parser)]
#[command(name = "dte", version, about)]
pub struct Cli {
    /// Path to a TOML config file (defaults to the XDG location).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Investigate one claim and print the result.
    Check(CheckArgs),
    /// Line-driven session: type a claim, or `:reset`, `:retry`, `:<n>`, `:quit`.
    Interactive(ServiceArgs),
    /// List the suggested claims.
    Suggestions,
    /// Print the effective configuration as TOML.
    Config,
    /// Generate a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Which verdict service to talk to.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Use the built-in demo service instead of the HTTP endpoint.
    #[arg(long)]
    pub mock: bool,
    /// Seed for the demo service's failure draws.
    #[arg(long, value_name = "N", requires = "mock")]
    pub seed: Option<u64>,
    /// Probability that the demo service answers with a 503.
    #[arg(long, value_name = "F", default_value_t = mock::DEFAULT_FAILURE_RATE)]
    pub failure_rate: f64,
}

/// Arguments of `dte check`.
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// The claim to investigate.
    pub claim: String,
    #[command(flatten)]
    pub service: ServiceArgs,
    /// Print a JSON report instead of the rendered screen.
    #[arg(long)]
    pub json: bool,
    /// Include the backstage narrative for verdicts.
    #[arg(long)]
    pub backstage: bool,
}

/// Dispatch CLI commands, returning the process exit status.
///
/// # Errors
/// Returns an error if configuration is invalid or the session loop breaks.
pub fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Check(args) => {
            let config = Config::load(cli.config.as_deref())?;
            run_check(&config, args)
        }
        Command::Interactive(args) => {
            let config = Config::load(cli.config.as_deref())?;
            run_interactive(&config, args)
        }
        Command::Suggestions => {
            for (idx, claim) in SUGGESTED_CLAIMS.iter().enumerate() {
                println!("{:>2}. {claim}", idx + 1);
            }
            Ok(0)
        }
        Command::Config => {
            let config = Config::load(cli.config.as_deref())?;
            print!("{}", config.to_toml_string()?);
            Ok(0)
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "dte", &mut io::stdout());
            Ok(0)
        }
    }
}

// ──────────────────── check ────────────────────

fn run_check(config: &Config, args: &CheckArgs) -> Result<i32> {
    let color = !args.json && io::stdout().is_terminal();
    colored::control::set_override(color && std::env::var_os("NO_COLOR").is_none());

    let mut runtime = build_runtime(config, &args.service)?;
    let show_progress = !args.json && io::stderr().is_terminal();
    let mut sink = |model: &SessionModel, frame: &str| {
        if show_progress && model.screen == Screen::Pending {
            eprint!("{frame}");
            eprintln!();
        }
    };
    let screen = runtime.investigate(&args.claim, &mut sink)?;
    let model = runtime.model();

    let mut stdout = io::stdout().lock();
    if args.json {
        let report = SessionReport::from_model(model, args.backstage);
        let json = serde_json::to_string_pretty(&report)?;
        writeln!(stdout, "{json}").map_err(stdout_error)?;
    } else {
        write!(stdout, "{}", decorate(model)).map_err(stdout_error)?;
        if args.backstage {
            if let Some(data) = model.verdict.as_deref().filter(|_| screen == Screen::Verdict) {
                writeln!(stdout).map_err(stdout_error)?;
                write!(stdout, "{}", render_backstage(data)).map_err(stdout_error)?;
            }
        }
    }

    Ok(exit_status(screen))
}

const fn exit_status(screen: Screen) -> i32 {
    match screen {
        Screen::Error => EXIT_ERROR_SCREEN,
        Screen::Landing | Screen::Pending | Screen::Verdict | Screen::OutOfScope => 0,
    }
}

// ──────────────────── interactive ────────────────────

/// A line typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum InputCommand {
    Submit(String),
    Suggestion(usize),
    Reset,
    Retry,
    Quit,
    Ignore,
}

fn parse_input(line: &str) -> InputCommand {
    let trimmed = line.trim();
    let Some(directive) = trimmed.strip_prefix(':') else {
        return if trimmed.is_empty() {
            InputCommand::Ignore
        } else {
            InputCommand::Submit(trimmed.to_string())
        };
    };
    match directive.trim() {
        "reset" => InputCommand::Reset,
        "retry" => InputCommand::Retry,
        "quit" | "q" => InputCommand::Quit,
        other => other
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .map_or(InputCommand::Ignore, InputCommand::Suggestion),
    }
}

impl InputCommand {
    fn into_msg(self) -> Option<SessionMsg> {
        match self {
            Self::Submit(text) => Some(SessionMsg::Submit(text)),
            Self::Suggestion(idx) => Some(SessionMsg::SelectSuggestion(idx)),
            Self::Reset => Some(SessionMsg::Reset),
            Self::Retry => Some(SessionMsg::Retry),
            Self::Quit => Some(SessionMsg::Quit),
            Self::Ignore => None,
        }
    }
}

fn run_interactive(config: &Config, args: &ServiceArgs) -> Result<i32> {
    colored::control::set_override(
        io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    );
    let mut runtime = build_runtime(config, args)?;
    let tx = runtime.sender();

    std::thread::Builder::new()
        .name("dte-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let Some(msg) = parse_input(&line).into_msg() else {
                    continue;
                };
                let quit = matches!(msg, SessionMsg::Quit);
                if tx.send(msg).is_err() || quit {
                    return;
                }
            }
            let _ = tx.send(SessionMsg::Quit);
        })
        .map_err(|e| DteError::Runtime {
            details: format!("failed to spawn input reader: {e}"),
        })?;

    print!("{}", decorate(runtime.model()));
    let mut sink = |model: &SessionModel, _frame: &str| {
        println!();
        print!("{}", decorate(model));
        let _ = io::stdout().flush();
    };
    runtime.run_until(|model| model.quit, &mut sink, None)?;
    Ok(0)
}

// ──────────────────── shared ────────────────────

fn build_runtime(config: &Config, args: &ServiceArgs) -> Result<SessionRuntime> {
    let service: Arc<dyn VerdictService> = if args.mock {
        Arc::new(MockVerdictService::new(args.failure_rate, args.seed)?)
    } else {
        Arc::new(HttpVerdictService::new(&config.service)?)
    };
    let logger = match (&config.logging.jsonl_path, config.logging.enabled) {
        (_, false) => JsonlLogger::disabled(),
        (Some(path), true) => JsonlLogger::open(path),
        (None, true) => JsonlLogger::stderr(),
    };
    Ok(SessionRuntime::new(service, config.animation.clone(), logger))
}

/// Render the model and color the lines that carry meaning.
fn decorate(model: &SessionModel) -> String {
    let frame = crate::session::render::render(model);
    let badge = model
        .verdict
        .as_deref()
        .filter(|_| model.screen == Screen::Verdict)
        .map(|data| (format!("[{}]", data.verdict().badge()), verdict_color(data.verdict())));

    let mut out = String::with_capacity(frame.len());
    for (idx, line) in frame.lines().enumerate() {
        let marker = line.trim_start();
        let styled = match (&badge, model.screen) {
            (Some((text, color)), _) if line == text.as_str() => {
                line.color(*color).bold().to_string()
            }
            (_, Screen::Error | Screen::OutOfScope) if idx == 0 => line.yellow().bold().to_string(),
            (_, Screen::Landing) if idx == 0 => line.bold().to_string(),
            (_, Screen::Pending) if marker.starts_with("[x]") => line.green().to_string(),
            (_, Screen::Pending) if marker.starts_with("[>]") => line.cyan().to_string(),
            (_, Screen::Pending) if marker.starts_with("[ ]") => line.dimmed().to_string(),
            _ => line.to_string(),
        };
        out.push_str(&styled);
        out.push('\n');
    }
    out
}

const fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Busted => Color::Red,
        Verdict::Confirmed => Color::Green,
        Verdict::Complicated => Color::Yellow,
    }
}

#[allow(clippy::needless_pass_by_value)]
fn stdout_error(error: io::Error) -> DteError {
    DteError::io("<stdout>", error)
}
