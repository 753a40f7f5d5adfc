//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::future::Future;
use std::sync::atomic::AtomicBool;

use rpy_syntax::document::{Position, TextDocument};
use rpy_syntax::tokenizer::{RENPY_GRAMMAR, tokenize};

use crate::config::FrontendConfig;
use crate::frontend::diagnostics;
use crate::frontend::parser::parse_document;
use crate::frontend::program::Program;
use crate::query;

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// while tokenizing.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a source file with a size check.
pub fn read_source(file_path: &str) -> CliResult<String> {
    // Check file size before reading
    let metadata =
        fs::metadata(file_path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file_path, e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            file_path,
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file_path, e)))
}

fn load(file_path: &str) -> CliResult<TextDocument> {
    Ok(TextDocument::new(file_path, read_source(file_path)?))
}

/// Drive a front end future to completion on a single-threaded runtime.
fn block_on<F: Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::failure(format!("Error starting runtime: {}", e)))?;
    Ok(runtime.block_on(future))
}

fn parse(document: &TextDocument) -> CliResult<Program> {
    block_on(parse_document(document))?
        .map_err(|e| CliError::failure(format!("Error parsing '{}': {}", document.path().display(), e)))
}

fn render_errors(document: &TextDocument, program: &Program) -> String {
    let file_name = document.path().to_string_lossy();
    let mut msg = String::new();
    for err in &program.errors {
        msg.push_str(&diagnostics::format_error(&file_name, document.text(), err));
    }
    msg
}

/// Convert 1-based CLI coordinates into a document position.
fn position(line: usize, col: usize) -> CliResult<Position> {
    if line == 0 || col == 0 {
        return Err(CliError::failure("Error: line and column are 1-based"));
    }
    Ok(Position::new(line - 1, col - 1, 0))
}

// ============================================================================
// Commands
// ============================================================================

/// Tokenize and print the token stream.
pub fn lex_file(file_path: &str) -> CliResult<ExitCode> {
    let document = load(file_path)?;
    let tokens = tokenize(document.text(), &RENPY_GRAMMAR);
    println!("{}", tokens.dump(&document));
    Ok(ExitCode::SUCCESS)
}

/// Parse and print the statement outline.
pub fn parse_file(file_path: &str) -> CliResult<ExitCode> {
    let document = load(file_path)?;
    let program = parse(&document)?;
    print!("{}", program.dump());

    if program.has_errors() {
        return Err(CliError::failure(render_errors(&document, &program).trim_end()));
    }
    Ok(ExitCode::SUCCESS)
}

/// Parse a script and report every error.
pub fn check_file(file_path: &str) -> CliResult<ExitCode> {
    let document = load(file_path)?;
    let program = parse(&document)?;

    if program.has_errors() {
        let mut msg = render_errors(&document, &program);
        msg.push_str(&format!("{} error(s) in {}", program.errors.len(), file_path));
        return Err(CliError::failure(msg));
    }

    let labels = program
        .symbols
        .symbols()
        .iter()
        .filter(|s| s.kind == crate::frontend::symbols::SymbolKind::Label)
        .count();
    println!("✓ No errors found ({} statements, {} labels)", program.statements.len(), labels);
    Ok(ExitCode::SUCCESS)
}

/// Print where the name at `line`:`col` is defined.
pub fn definition(file_path: &str, line: usize, col: usize) -> CliResult<ExitCode> {
    let document = load(file_path)?;
    let position = position(line, col)?;
    let cancelled = AtomicBool::new(false);

    let found = block_on(query::find_definition(&document, position, &cancelled, FrontendConfig::default()))?
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    match found {
        Some(location) => {
            println!("{}", location);
            Ok(ExitCode::SUCCESS)
        }
        None => Err(CliError::failure(format!("No definition found at {}:{}:{}", file_path, line, col))),
    }
}

/// Print every reference to the name at `line`:`col`.
pub fn references(file_path: &str, line: usize, col: usize) -> CliResult<ExitCode> {
    let document = load(file_path)?;
    let position = position(line, col)?;
    let cancelled = AtomicBool::new(false);

    let found = block_on(query::find_references(&document, position, &cancelled, FrontendConfig::default()))?
        .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    if found.is_empty() {
        eprintln!("No references found at {}:{}:{}", file_path, line, col);
    }
    for location in &found {
        println!("{}", location);
    }
    Ok(ExitCode::SUCCESS)
}
