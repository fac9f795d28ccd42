//! Binary entry point for the codeshift CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Run two codemods over a tree, writing the result to out/
//! codeshift run -c strings.toml -c rename.toml src/ -o out/ --ignore ./vendor
//!
//! # Show the parsed tree of one file
//! codeshift ast src/index.php --format json
//!
//! # List the built-in codemods
//! codeshift list
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use codeshift::cli::{dump_ast, emit, list_codemods, run_codemods, AstFormat, RunOptions};
use codeshift::error::{OutputErrorCode, ShiftError};
use codeshift::tracer::{ConsoleTracer, Tracer};

// ============================================================================
// CLI Structure
// ============================================================================

/// Apply codemods to PHP sources while preserving formatting.
#[derive(Parser, Debug)]
#[command(name = "codeshift", version, about = "Apply codemods to PHP sources")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for the ast command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    /// Indented tree, one node per line (default).
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl From<DumpFormat> for AstFormat {
    fn from(format: DumpFormat) -> Self {
        match format {
            DumpFormat::Text => AstFormat::Text,
            DumpFormat::Json => AstFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run codemods over a file or directory.
    Run {
        /// Codemod manifest; repeat to chain several, in order.
        #[arg(short = 'c', long = "codemod", required = true)]
        codemods: Vec<PathBuf>,
        /// File or directory to transform.
        target: PathBuf,
        /// Write results here instead of rewriting the target in place.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Comma-separated paths to skip; `./` entries resolve against the target.
        #[arg(long, value_delimiter = ',')]
        ignore: Vec<String>,
        /// Print the full cause chain on failure.
        #[arg(long)]
        stack: bool,
    },
    /// Print the parsed tree of a file.
    Ast {
        /// PHP file to parse.
        file: PathBuf,
        /// Write the dump here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Dump format.
        #[arg(long, value_enum, default_value = "text")]
        format: DumpFormat,
    },
    /// List the built-in codemods.
    List,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level);

    let tracer: Arc<dyn Tracer> = Arc::new(ConsoleTracer::new());
    match execute(cli.command, tracer) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(OutputErrorCode::from(&err).code()),
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command. Failures are reported before they are returned.
fn execute(command: Command, tracer: Arc<dyn Tracer>) -> Result<(), ShiftError> {
    match command {
        Command::Run {
            codemods,
            target,
            output,
            ignore,
            stack,
        } => {
            let options = RunOptions {
                codemods,
                target,
                output,
                ignore,
                stack,
            };
            run_codemods(&options, tracer).map(|_| ())
        }
        Command::Ast {
            file,
            output,
            format,
        } => {
            let result = dump_ast(&file, format.into())
                .and_then(|dump| emit(&dump, output.as_deref(), tracer.as_ref()));
            if let Err(err) = &result {
                tracer.trace_exception(err, false);
            }
            result
        }
        Command::List => {
            for name in list_codemods() {
                tracer.write_line(&name);
            }
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_collects_codemods_and_ignores() {
        let args = [
            "codeshift", "run", "-c", "a.toml", "--codemod", "b.toml", "src", "-o", "out",
            "--ignore", "./vendor,./cache", "--stack",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::Run {
                codemods,
                target,
                output,
                ignore,
                stack,
            } => {
                assert_eq!(codemods, vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]);
                assert_eq!(target, PathBuf::from("src"));
                assert_eq!(output, Some(PathBuf::from("out")));
                assert_eq!(ignore, vec!["./vendor", "./cache"]);
                assert!(stack);
            }
            _ => panic!("expected Run"),
        }
    }

    #[test]
    fn run_requires_a_codemod() {
        assert!(Cli::try_parse_from(["codeshift", "run", "src"]).is_err());
    }

    #[test]
    fn ast_defaults_to_text() {
        let cli = Cli::try_parse_from(["codeshift", "ast", "a.php"]).unwrap();
        match cli.command {
            Command::Ast { format, output, .. } => {
                assert_eq!(format, DumpFormat::Text);
                assert!(output.is_none());
            }
            _ => panic!("expected Ast"),
        }
        let cli = Cli::try_parse_from(["codeshift", "ast", "a.php", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Ast {
                format: DumpFormat::Json,
                ..
            }
        ));
    }

    #[test]
    fn log_level_is_global() {
        let cli = Cli::try_parse_from(["codeshift", "list", "--log-level", "debug"]).unwrap();
        assert!(matches!(cli.global.log_level, LogLevel::Debug));
        assert!(matches!(cli.command, Command::List));
    }
}
