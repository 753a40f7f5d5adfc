//! CLI module for the `rpy` tool
//!
//! ## Commands
//!
//! - `rpy <file>` / `rpy check <file>` - Parse a script and report every error
//! - `rpy definition <file> <line> <col>` - Print where the name under a position is defined
//! - `rpy references <file> <line> <col>` - Print every reference to the name under a position
//! - `rpy --lex <file>` / `rpy --parse <file>` - Token and statement dumps (debug)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Ren'Py script checker and navigator
#[derive(Parser, Debug)]
#[command(name = "rpy")]
#[command(version = VERSION)]
#[command(about = "Parse Ren'Py scripts, report errors and navigate labels and symbols", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Script to check (default action when no subcommand given)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    // Debug/development flags
    /// Tokenize only and print the token stream (debug)
    #[arg(long = "lex", value_name = "FILE", conflicts_with = "file")]
    pub lex_file: Option<PathBuf>,

    /// Parse only and print the statement outline (debug)
    #[arg(long = "parse", value_name = "FILE", conflicts_with = "file")]
    pub parse_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a script and report every error
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the definition of the name at a position
    Definition {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// 1-based line
        #[arg(value_name = "LINE")]
        line: usize,
        /// 1-based column
        #[arg(value_name = "COL")]
        col: usize,
    },

    /// Print every reference to the name at a position
    References {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// 1-based line
        #[arg(value_name = "LINE")]
        line: usize,
        /// 1-based column
        #[arg(value_name = "COL")]
        col: usize,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    // Handle debug flags first
    if let Some(file) = cli.lex_file {
        return commands::lex_file(&file.to_string_lossy());
    }
    if let Some(file) = cli.parse_file {
        return commands::parse_file(&file.to_string_lossy());
    }

    match cli.command {
        Some(Command::Check { file }) => commands::check_file(&file.to_string_lossy()),
        Some(Command::Definition { file, line, col }) => commands::definition(&file.to_string_lossy(), line, col),
        Some(Command::References { file, line, col }) => commands::references(&file.to_string_lossy(), line, col),
        None => {
            // Default: check the file if provided
            if let Some(file) = cli.file {
                commands::check_file(&file.to_string_lossy())
            } else {
                // No command and no file - show help
                print!("{}", help_text());
                Err(CliError::new("", ExitCode::FAILURE))
            }
        }
    }
}

/// Rendered `--help` output.
fn help_text() -> String {
    Cli::command().render_help().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_bare_file() {
        let cli = Cli::try_parse_from(["rpy", "script.rpy"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.file.as_deref(), Some(std::path::Path::new("script.rpy")));
    }

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["rpy", "check", "script.rpy"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Check { .. })));
    }

    #[test]
    fn test_cli_parse_definition() {
        let cli = Cli::try_parse_from(["rpy", "definition", "script.rpy", "5", "10"]).unwrap();
        if let Some(Command::Definition { line, col, .. }) = cli.command {
            assert_eq!((line, col), (5, 10));
        } else {
            panic!("Expected Definition command");
        }
    }

    #[test]
    fn test_cli_parse_references_requires_position() {
        assert!(Cli::try_parse_from(["rpy", "references", "script.rpy"]).is_err());
        let cli = Cli::try_parse_from(["rpy", "references", "script.rpy", "1", "7"]).unwrap();
        assert!(matches!(cli.command, Some(Command::References { line: 1, col: 7, .. })));
    }

    #[test]
    fn test_no_arguments_shows_help_and_fails() {
        let help = help_text();
        assert!(help.contains("Usage:"), "{help}");
        assert!(help.contains("definition"), "{help}");

        let cli = Cli::try_parse_from(["rpy"]).unwrap();
        let err = execute(cli).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_cli_parse_debug_flags() {
        let cli = Cli::try_parse_from(["rpy", "--lex", "script.rpy"]).unwrap();
        assert!(cli.lex_file.is_some());

        let cli = Cli::try_parse_from(["rpy", "--parse", "script.rpy"]).unwrap();
        assert!(cli.parse_file.is_some());

        assert!(Cli::try_parse_from(["rpy", "--lex", "a.rpy", "b.rpy"]).is_err());
    }
}
