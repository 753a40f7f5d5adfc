//! Parser for Ren'Py scripts
//!
//! Drives a filtered [`TokenListIterator`] through composable grammar rules, building a [`Program`]: the statement
//! tree, the scope tree with its symbols and labels, and an ordered list of every error found. Parse and definition
//! errors never abort the parse.
//!
//! ## Notes
//! - `current` is the last consumed token; the iterator's peek is the lookahead. Rules test the lookahead and only
//!   `parse` moves the cursor.
//! - Blocks are delimited by indentation: the column of the first token on each line.
//! - Label and symbol references are recorded as they are found and resolved once the token pass is over, so forward
//!   references (`jump ending` before `label ending:`) are found.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use rpy::frontend::parser::parse_document;
//! use rpy_syntax::document::TextDocument;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let document = TextDocument::new("script.rpy", "label start:\n    jump start\n");
//! let program = parse_document(&document).await?;
//! let start = program.global_scope().resolve_label("start").unwrap();
//! assert_eq!(start.references.len(), 1);
//! # Ok(())
//! # }
//! ```

use rpy_syntax::document::{Location, TextDocument};
use rpy_syntax::token::{Token, TokenListIterator};
use rpy_syntax::tokenizer::{RENPY_GRAMMAR, tokenize};
use thiserror::Error;

use crate::config::FrontendConfig;
use crate::frontend::ast::Identifier;
use crate::frontend::diagnostics::CompileError;
use crate::frontend::program::Program;
use crate::frontend::symbols::{GLOBAL_SCOPE, ScopeId};

mod expressions;
mod helpers;
mod rules;
mod statements;

pub use rules::GrammarRule;
#[cfg(test)]
mod tests;

/// Errors that abort a parse outright.
///
/// These are caller contract violations or infrastructure failures. Malformed input never produces one; it is
/// reported through [`Program::errors`] instead.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("DocumentParser::initialize() called twice")]
    AlreadyInitialized,

    #[error("DocumentParser used before initialize()")]
    NotInitialized,

    #[error("tokenization task failed: {0}")]
    Tokenize(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferenceKind {
    Label,
    Symbol,
}

/// A reference site waiting for the end of the token pass.
#[derive(Debug, Clone)]
struct PendingReference {
    kind: ReferenceKind,
    name: String,
    location: Location,
    /// Scope current at the reference site
    scope: ScopeId,
}

/// Parser state for one document.
///
/// ## Notes
/// - Call [`DocumentParser::initialize`] exactly once, then [`DocumentParser::parse`].
/// - The parser owns the [`Program`] it builds; scopes are entered and exited on `program.symbols`.
pub struct DocumentParser<'a> {
    document: &'a TextDocument,
    config: FrontendConfig,
    it: TokenListIterator,
    current: Token,
    invalid: Token,
    program: Program,
    references: Vec<PendingReference>,
    /// Column of the first token of the statement being parsed
    indent: usize,
    initialized: bool,
}

impl<'a> DocumentParser<'a> {
    pub fn new(document: &'a TextDocument) -> Self {
        Self::with_config(document, FrontendConfig::default())
    }

    pub fn with_config(document: &'a TextDocument, config: FrontendConfig) -> Self {
        Self {
            document,
            config,
            it: rpy_syntax::token::TokenList::default().iterator(),
            current: Token::invalid(),
            invalid: Token::invalid(),
            program: Program::new(document.path()),
            references: Vec::new(),
            indent: 0,
            initialized: false,
        }
    }

    /// Tokenize the document and prime the cursor.
    ///
    /// Tokenization runs on the blocking pool; nothing after it suspends. Afterwards the lookahead is the first
    /// non-filtered token and `current` is the `Invalid` placeholder.
    ///
    /// ## Errors
    /// - [`ParserError::AlreadyInitialized`] on a second call.
    /// - [`ParserError::Tokenize`] if the tokenization task panicked or was cancelled.
    pub async fn initialize(&mut self) -> Result<(), ParserError> {
        if self.initialized {
            return Err(ParserError::AlreadyInitialized);
        }
        self.initialized = true;

        let text = self.document.text().to_string();
        let tokens = tokio::task::spawn_blocking(move || tokenize(&text, &RENPY_GRAMMAR)).await?;

        self.it = tokens.iterator();
        self.it.set_filter(self.config.skip_types.iter().copied());
        self.current = Token::invalid();
        Ok(())
    }

    /// Parse the whole document into a [`Program`].
    ///
    /// ## Errors
    /// Returns [`ParserError::NotInitialized`] if [`DocumentParser::initialize`] has not run. Syntax and definition
    /// errors are collected in [`Program::errors`].
    #[tracing::instrument(skip_all, fields(path = %self.document.path().display()))]
    pub fn parse(mut self) -> Result<Program, ParserError> {
        if !self.initialized {
            return Err(ParserError::NotInitialized);
        }

        let statements = self.parse_indented(None, |p| p.statement());
        self.program.statements = statements;
        self.resolve_references();

        tracing::debug!(
            statements = self.program.statements.len(),
            errors = self.program.errors.len(),
            "parsed document"
        );
        Ok(self.program)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.program.errors
    }

    // ========================================================================
    // Reference resolution
    // ========================================================================

    fn reference_label(&mut self, name: &Identifier) {
        self.references.push(PendingReference {
            kind: ReferenceKind::Label,
            name: name.name.clone(),
            location: self.location(name.range),
            scope: self.scope(),
        });
    }

    fn reference_symbol(&mut self, name: &Identifier) {
        self.references.push(PendingReference {
            kind: ReferenceKind::Symbol,
            name: name.name.clone(),
            location: self.location(name.range),
            scope: self.scope(),
        });
    }

    /// Attach every recorded reference to the symbol it resolves to. Unresolved references are dropped.
    fn resolve_references(&mut self) {
        let references = std::mem::take(&mut self.references);
        let mut resolved = 0usize;
        for reference in references {
            let table = &self.program.symbols;
            let target = match reference.kind {
                ReferenceKind::Label => table.resolve_label(GLOBAL_SCOPE, &reference.name),
                // `a.b.c` may be defined as a whole or only through its root
                ReferenceKind::Symbol => dotted_prefixes(&reference.name)
                    .find_map(|candidate| table.resolve(reference.scope, candidate)),
            };
            if let Some(id) = target {
                self.program.symbols.add_reference(id, reference.location);
                resolved += 1;
            }
        }
        tracing::trace!(resolved, "resolved references");
    }
}

/// `a.b.c`, `a.b`, `a`
fn dotted_prefixes(name: &str) -> impl Iterator<Item = &str> {
    std::iter::once(name).chain(name.rmatch_indices('.').map(move |(i, _)| &name[..i]))
}

// ============================================================================
// Public entry points
// ============================================================================

/// Parse a document with the default configuration.
///
/// ## Errors
/// Only infrastructure failures (see [`ParserError`]); syntax and definition errors are in [`Program::errors`].
pub async fn parse_document(document: &TextDocument) -> Result<Program, ParserError> {
    parse_document_with_config(document, FrontendConfig::default()).await
}

#[tracing::instrument(skip_all, fields(path = %document.path().display(), bytes = document.len()))]
pub async fn parse_document_with_config(
    document: &TextDocument,
    config: FrontendConfig,
) -> Result<Program, ParserError> {
    let mut parser = DocumentParser::with_config(document, config);
    parser.initialize().await?;
    parser.parse()
}
