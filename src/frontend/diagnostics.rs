//! Diagnostics and error reporting for Ren'Py scripts
//!
//! Parse and definition errors are plain data appended to [`crate::frontend::Program::errors`]; nothing here is ever
//! returned as an `Err` from the parser. Rendering for the terminal goes through `miette`.

use std::fmt;

use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, SourceCode, SourceSpan};
use rpy_core::lang::tokens::TokenType;
use rpy_syntax::document::Location;
use rpy_syntax::token::Token;
use thiserror::Error;

use crate::frontend::symbols::DuplicateDefinitionError;

// ============================================================================
// Parse errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorType {
    UnexpectedToken,
    UnexpectedEndOfLine,
    UnexpectedEndOfFile,
}

/// A recoverable syntax error, captured with the parser state at the point it was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error_type: ParseErrorType,
    /// The last consumed token
    pub current_token: Token,
    /// The lookahead token ([`TokenType::Invalid`] at end of input)
    pub next_token: Token,
    pub expected: Option<TokenType>,
}

impl ParseError {
    pub fn message(&self) -> String {
        match self.error_type {
            ParseErrorType::UnexpectedEndOfFile => "Unexpected end of file".to_string(),
            ParseErrorType::UnexpectedToken => format!(
                "Expected token of type '{}', but got '{}'\n\tat: {}",
                self.expected.map_or("None", TokenType::name),
                self.next_token.token_type,
                self.next_token.start
            ),
            ParseErrorType::UnexpectedEndOfLine => {
                format!("Unexpected end of line.\n\tat: {}", self.next_token.start)
            }
        }
    }
}

// ============================================================================
// Compile errors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CompileErrorKind {
    Parse(ParseError),
    DuplicateDefinition(DuplicateDefinitionError),
}

/// An error in a program, with its location when one is known
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub location: Option<Location>,
    pub kind: CompileErrorKind,
}

impl CompileError {
    pub fn parse(error: ParseError, location: Option<Location>) -> Self {
        Self {
            message: error.message(),
            location,
            kind: CompileErrorKind::Parse(error),
        }
    }

    pub fn duplicate_definition(error: DuplicateDefinitionError) -> Self {
        Self {
            message: error.message.clone(),
            location: Some(error.location.clone()),
            kind: CompileErrorKind::DuplicateDefinition(error),
        }
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.kind {
            CompileErrorKind::Parse(error) => Some(error),
            CompileErrorKind::DuplicateDefinition(_) => None,
        }
    }

    pub fn duplicate_definition_error(&self) -> Option<&DuplicateDefinitionError> {
        match &self.kind {
            CompileErrorKind::DuplicateDefinition(error) => Some(error),
            CompileErrorKind::Parse(_) => None,
        }
    }

    /// First line of the message, without the `at:` trailer
    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.headline()),
            None => f.write_str(self.headline()),
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Error)]
#[error("{message}")]
struct SourceDiagnostic {
    message: String,
    source_code: NamedSource<String>,
    span: Option<SourceSpan>,
    label: String,
    help: Option<String>,
}

impl Diagnostic for SourceDiagnostic {
    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source_code)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.clone()),
            span,
        ))))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.as_ref().map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }
}

fn label_for(error: &CompileError) -> (&'static str, Option<String>) {
    match &error.kind {
        CompileErrorKind::Parse(parse) => match parse.error_type {
            ParseErrorType::UnexpectedToken => ("unexpected token", None),
            ParseErrorType::UnexpectedEndOfLine => ("expected end of line", None),
            ParseErrorType::UnexpectedEndOfFile => ("input ends here", None),
        },
        CompileErrorKind::DuplicateDefinition(dup) => (
            "duplicate definition",
            Some(format!(
                "the first definition of \"{}\" stays in effect",
                dup.duplicate.identifier
            )),
        ),
    }
}

/// Render an error with source context.
pub fn format_error(file_name: &str, source: &str, error: &CompileError) -> String {
    let (label, help) = label_for(error);
    let span = error.location.as_ref().map(|location| {
        let start = location.range.start.absolute_offset.min(source.len());
        let end = location.range.end.absolute_offset.clamp(start, source.len());
        SourceSpan::from((start, end - start))
    });
    let diagnostic = SourceDiagnostic {
        message: error.headline().to_string(),
        source_code: NamedSource::new(file_name, source.to_string()),
        span,
        label: label.to_string(),
        help,
    };

    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, &diagnostic).is_err() {
        // fall back to the one-line form
        return format!("{file_name}: {error}\n");
    }
    out
}

/// Print an error with source context to stderr
pub fn print_error(file_name: &str, source: &str, error: &CompileError) {
    eprint!("{}", format_error(file_name, source, error));
}
