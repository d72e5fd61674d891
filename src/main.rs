//! CLI tool to check, render, and classify Foreman documents.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use foreman_analysis::{
    Compilation, IdentifierError, SemanticTokenKind, VariableIdentifier, VariableValueBag,
    compile,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid --var '{0}': expected namespace/key=value")]
    InvalidVariable(String),
    #[error("invalid --var: {0}")]
    InvalidIdentifier(#[from] IdentifierError),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Check,
    Render,
    Tokens,
}

impl Command {
    fn parse(name: &str) -> Result<Self, CliError> {
        match name {
            "check" => Ok(Self::Check),
            "render" => Ok(Self::Render),
            "tokens" => Ok(Self::Tokens),
            other => Err(CliError::UnknownCommand(other.to_string())),
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return ExitCode::from(2);
    }

    let command = match Command::parse(&args[1]) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let (files, values) = match parse_options(&args[2..]) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    if files.is_empty() {
        eprintln!("Error: no files specified");
        return ExitCode::from(2);
    }

    let mut had_error = false;

    for path in &files {
        let compilation = match load(path) {
            Ok(compilation) => compilation,
            Err(e) => {
                eprintln!("{e}");
                had_error = true;
                continue;
            }
        };

        match command {
            Command::Check => {
                if report_diagnostics(path, &compilation) {
                    had_error = true;
                } else {
                    eprintln!("{path}: ok");
                }
            }
            Command::Render => {
                if report_diagnostics(path, &compilation) {
                    had_error = true;
                }
                println!("{}", compilation.render(&values));
            }
            Command::Tokens => {
                for token in compilation.semantic_tokens() {
                    println!(
                        "{path}:{}:{} {} {}",
                        token.line + 1,
                        token.start + 1,
                        token.length,
                        token.kind.name()
                    );
                }
            }
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_usage() {
    eprintln!("Usage: foreman <command> [files...] [--var namespace/key=value]...");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check   Report parse and bind diagnostics");
    eprintln!("  render  Print the document with variables substituted");
    eprintln!("  tokens  Print semantic highlighting tokens");
    eprintln!();
    eprintln!("Token kinds: {}", SemanticTokenKind::LEGEND.join(", "));
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  foreman check build.job");
    eprintln!("  foreman render build.job --var env/name=prod");
    eprintln!("  RUST_LOG=debug foreman tokens build.job");
}

/// Split arguments into file paths and `--var` assignments.
fn parse_options(args: &[String]) -> Result<(Vec<String>, VariableValueBag), CliError> {
    let mut files = Vec::new();
    let mut values = VariableValueBag::new();

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let assignment = if arg == "--var" {
            args.next()
                .ok_or_else(|| CliError::InvalidVariable(String::new()))?
                .as_str()
        } else if let Some(rest) = arg.strip_prefix("--var=") {
            rest
        } else {
            files.push(arg.clone());
            continue;
        };

        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| CliError::InvalidVariable(assignment.to_string()))?;
        values.set(VariableIdentifier::parse(name)?, value);
    }

    Ok((files, values))
}

fn load(path: &str) -> Result<Compilation, CliError> {
    let source = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    Ok(compile(&source))
}

/// Print every diagnostic as `path:line:col: message`. Returns whether any
/// were printed.
fn report_diagnostics(path: &str, compilation: &Compilation) -> bool {
    let mut any = false;
    for diagnostic in compilation.diagnostics() {
        eprintln!(
            "{path}:{}:{}: {}",
            diagnostic.span.start_line() + 1,
            diagnostic.span.start_col() + 1,
            diagnostic.message
        );
        any = true;
    }
    any
}

/// Install a stderr subscriber when `RUST_LOG` is set.
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
