//! Purpose: `cfgparser` CLI entry point: load INI files and print lookups as JSON.
//! Role: Binary crate root; parses args, loads sources, dispatches one read command.
//! Invariants: Successful output is a single JSON document on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value as JsonValue, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use cfgparser::api::{CfgParser, Error, ErrorKind, SectionKey, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Run `cfgparser --help` for usage."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let cfg = load(&cli.files).map_err(|err| (err, color_mode))?;
    command_dispatch::dispatch_command(cli.command, &cfg)
        .map_err(add_lookup_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn load(files: &[PathBuf]) -> Result<CfgParser, Error> {
    let mut cfg = CfgParser::new();
    for path in files {
        cfg.read_path(path)?;
    }
    Ok(cfg)
}

#[derive(Parser)]
#[command(
    name = "cfgparser",
    version,
    about = "Read INI configuration files with typed values and section categories",
    long_about = None,
    after_help = r#"EXAMPLES
  $ cfgparser -f app.ini sections
  $ cfgparser -f app.ini categories
  $ cfgparser -f app.ini sections --category command
  $ cfgparser -f app.ini get evalvals val13 --eval
  $ cfgparser -f app.ini get foo dir --category command
  $ cfgparser -f base.ini -f local.ini get listvals val5 --list --eval

NOTES
  - Later files override options from earlier ones.
  - Sections named `category: name` can be addressed with --category."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        required = true,
        help = "Config file to read (repeatable, read in order)",
        value_hint = ValueHint::FilePath
    )]
    files: Vec<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        help = "Colorize error output on a terminal"
    )]
    color: ColorMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "List category names in order of first appearance")]
    Categories,
    #[command(about = "List section names, or the bare names within a category")]
    Sections {
        #[arg(long, help = "Only list sections in this category")]
        category: Option<String>,
    },
    #[command(about = "List option names declared in a section")]
    Options {
        section: String,
        #[arg(long, help = "Treat SECTION as a bare name within this category")]
        category: Option<String>,
    },
    #[command(about = "List option/value pairs of a section")]
    Items {
        section: String,
        #[arg(long, help = "Treat SECTION as a bare name within this category")]
        category: Option<String>,
    },
    #[command(
        about = "Print one option value",
        after_help = r#"EXAMPLES
  $ cfgparser -f app.ini get evalvals val1 --eval          # 42
  $ cfgparser -f app.ini get listvals val2 --list          # ["hello", "there", ...]
  $ cfgparser -f app.ini get server port --default 8080 --eval

NOTES
  - --default applies when the option (or categorized section) is missing.
  - With --eval the default is evaluated; with --list it is split."#
    )]
    Get {
        section: String,
        option: String,
        #[arg(long, help = "Treat SECTION as a bare name within this category")]
        category: Option<String>,
        #[arg(long, help = "Evaluate the value as a literal (numbers, lists, booleans, ...)")]
        eval: bool,
        #[arg(long, help = "Split the value on commas and newlines")]
        list: bool,
        #[arg(long, help = "Value to use when the option is missing")]
        default: Option<String>,
    },
}

fn section_key<'a>(section: &'a str, category: Option<&'a str>) -> SectionKey<'a> {
    match category {
        Some(category) => SectionKey::categorized(category, section),
        None => SectionKey::Name(section),
    }
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or("invalid arguments");
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

fn add_lookup_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::SectionNotFound => {
            err.with_hint("List sections with `cfgparser -f FILE sections` (or `categories`).")
        }
        ErrorKind::OptionNotFound => {
            err.with_hint("Pass --default to supply a value for missing options.")
        }
        _ => err,
    }
}

fn emit_json(value: JsonValue) {
    let pretty = io::stdout().is_terminal();
    let json = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    let rendered = if is_tty {
        error_text(err, color_mode.use_color(is_tty))
    } else {
        serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
            r#"{"error":{"kind":"Internal","message":"json encode failed"}}"#.to_string()
        })
    };
    eprintln!("{rendered}");
}

fn error_message(err: &Error) -> String {
    let fallback = match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::SectionNotFound => "no such section",
        ErrorKind::OptionNotFound => "no such option",
        ErrorKind::Parse => "invalid config file",
        ErrorKind::Io => "i/o error",
    };
    err.message().unwrap_or(fallback).to_string()
}

/// Optional context attached to an error, in display order. Both renderings
/// walk this list, so a field added here shows up in each.
fn error_details(err: &Error) -> Vec<(&'static str, JsonValue)> {
    let mut details = Vec::new();
    if let Some(hint) = err.hint() {
        details.push(("hint", json!(hint)));
    }
    if let Some(section) = err.section() {
        details.push(("section", json!(section)));
    }
    if let Some(option) = err.option() {
        details.push(("option", json!(option)));
    }
    if let Some(path) = err.path() {
        details.push(("path", json!(path.display().to_string())));
    }
    if let Some(line) = err.line() {
        details.push(("line", json!(line)));
    }
    let causes: Vec<String> =
        std::iter::successors(err.source(), |&source| source.source())
            .map(ToString::to_string)
            .collect();
    if !causes.is_empty() {
        details.push(("causes", json!(causes)));
    }
    details
}

fn error_json(err: &Error) -> JsonValue {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    inner.extend(
        error_details(err)
            .into_iter()
            .map(|(name, value)| (name.to_string(), value)),
    );
    json!({ "error": inner })
}

const RED: u8 = 31;
const YELLOW: u8 = 33;

fn paint(label: &str, color: Option<u8>) -> String {
    match color {
        Some(code) => format!("\u{1b}[{code}m{label}\u{1b}[0m"),
        None => label.to_string(),
    }
}

fn error_text(err: &Error, use_color: bool) -> String {
    let tint = |code: u8| use_color.then_some(code);
    let mut lines = vec![format!("{} {}", paint("error:", tint(RED)), error_message(err))];
    for (name, value) in error_details(err) {
        let label = match name {
            "causes" => "caused by:".to_string(),
            other => format!("{other}:"),
        };
        let label = paint(&label, tint(YELLOW));
        let values = match value {
            JsonValue::Array(items) => items,
            other => vec![other],
        };
        for value in values {
            let text = value.as_str().map_or_else(|| value.to_string(), str::to_string);
            lines.push(format!("{label} {text}"));
        }
    }
    lines.join("\n")
}
