//! Definition and reference queries over a single document
//!
//! Each query re-parses the document, finds the symbol under a position and reads its definition or reference
//! sites. Queries are cheap to abandon: cancellation is checked once, on entry, and a document larger than
//! [`FrontendConfig::max_reparse_bytes`] is not parsed at all.
//!
//! ## Notes
//! - A missing result is `Ok(None)` / an empty list, never an error. Errors are reserved for caller mistakes (a
//!   position outside the document) and infrastructure failures.
//! - The symbol under the cursor is found first by reference and definition sites, which covers parameters and
//!   local labels. Otherwise the word at the position is resolved by name in the global scope: symbols first, then
//!   labels.

use std::sync::atomic::{AtomicBool, Ordering};

use rpy_syntax::document::{DocumentError, Location, Position, TextDocument};
use thiserror::Error;

use crate::config::FrontendConfig;
use crate::frontend::parser::{ParserError, parse_document_with_config};
use crate::frontend::program::Program;
use crate::frontend::symbols::Symbol;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("invalid query position: {0}")]
    Position(#[from] DocumentError),

    #[error(transparent)]
    Parser(#[from] ParserError),
}

/// Location of the definition of the symbol or label at `position`.
///
/// ## Errors
/// - [`FrontendError::Position`] if `position` is outside the document.
/// - [`FrontendError::Parser`] if the re-parse could not run.
#[tracing::instrument(skip_all, fields(path = %document.path().display(), %position))]
pub async fn find_definition(
    document: &TextDocument,
    position: Position,
    cancelled: &AtomicBool,
    config: FrontendConfig,
) -> Result<Option<Location>, FrontendError> {
    let Some(program) = reparse(document, &position, cancelled, config).await? else {
        return Ok(None);
    };
    Ok(symbol_at(&program, document, &position).map(|symbol| symbol.definition_location.clone()))
}

/// Every recorded reference to the symbol or label at `position`, in discovery order.
///
/// ## Errors
/// Same as [`find_definition`].
#[tracing::instrument(skip_all, fields(path = %document.path().display(), %position))]
pub async fn find_references(
    document: &TextDocument,
    position: Position,
    cancelled: &AtomicBool,
    config: FrontendConfig,
) -> Result<Vec<Location>, FrontendError> {
    let Some(program) = reparse(document, &position, cancelled, config).await? else {
        return Ok(Vec::new());
    };
    Ok(symbol_at(&program, document, &position)
        .map(|symbol| symbol.references.clone())
        .unwrap_or_default())
}

/// Parse `document` for a query, or `None` if the query should degrade to not-found.
async fn reparse(
    document: &TextDocument,
    position: &Position,
    cancelled: &AtomicBool,
    config: FrontendConfig,
) -> Result<Option<Program>, FrontendError> {
    if cancelled.load(Ordering::Relaxed) {
        tracing::debug!("query cancelled before parsing");
        return Ok(None);
    }
    document.offset_at(position)?;
    if document.len() > config.max_reparse_bytes {
        tracing::debug!(
            bytes = document.len(),
            limit = config.max_reparse_bytes,
            "document too large to re-parse"
        );
        return Ok(None);
    }
    Ok(Some(parse_document_with_config(document, config).await?))
}

fn symbol_at<'p>(program: &'p Program, document: &TextDocument, position: &Position) -> Option<&'p Symbol> {
    let offset = document.offset_at(position).ok()?;
    let by_site = program.symbols.symbols().iter().find(|symbol| {
        symbol.definition_location.range.contains(offset)
            || symbol.references.iter().any(|r| r.range.contains(offset))
    });
    if by_site.is_some() {
        return by_site;
    }

    let word = word_at(document, position)?;
    tracing::trace!(word, "resolving word at position");
    let global = program.global_scope();
    global.resolve(word).or_else(|| global.resolve_label(word))
}

/// The identifier (dots allowed) around `position`, cut out of the surrounding whitespace-delimited word.
fn word_at<'d>(document: &'d TextDocument, position: &Position) -> Option<&'d str> {
    let range = document.get_word_range_at_position(position)?;
    let word = document.get_text(Some(&range)).ok()?;
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '.';

    let cursor = position
        .character
        .saturating_sub(range.start.character)
        .min(word.len());
    let mut cursor = cursor;
    while !word.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let start = word[..cursor]
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_ident(c))
        .last()
        .map_or(cursor, |(i, _)| i);
    let end = word[cursor..]
        .char_indices()
        .find(|&(_, c)| !is_ident(c))
        .map_or(word.len(), |(i, _)| cursor + i);

    let ident = word[start..end].trim_matches('.');
    (!ident.is_empty()).then_some(ident)
}
