//! Tokens and the filtered, replayable token stream the parser walks.

use std::collections::HashSet;
use std::sync::Arc;

use rpy_core::lang::tokens::{TokenCategory, TokenType};

use crate::document::{DocumentRange, Position, TextDocument};

/// A classified span of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub start: Position,
    pub end: Position,
    /// Secondary classifications inherited from enclosing range patterns, outermost first.
    pub meta: Vec<TokenType>,
}

impl Token {
    pub fn new(token_type: TokenType, start: Position, end: Position) -> Self {
        Self {
            token_type,
            start,
            end,
            meta: Vec::new(),
        }
    }

    /// Placeholder used by the parser before the first token is consumed.
    pub fn invalid() -> Self {
        Self::new(TokenType::Invalid, Position::default(), Position::default())
    }

    pub fn with_meta(mut self, meta: Vec<TokenType>) -> Self {
        self.meta = meta;
        self
    }

    pub fn is(&self, token_type: TokenType) -> bool {
        self.token_type == token_type
    }

    pub fn has_meta(&self, meta: TokenType) -> bool {
        self.meta.contains(&meta)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.absolute_offset - self.start.absolute_offset
    }

    /// The token's span. An empty span is logged as an anomaly.
    pub fn range(&self) -> DocumentRange {
        if self.is_empty() && !self.token_type.is_invalid() {
            tracing::warn!(
                token_type = %self.token_type,
                line = self.start.line + 1,
                column = self.start.character + 1,
                "empty token"
            );
        }
        DocumentRange::new(self.start, self.end)
    }

    /// The source text covered by the token.
    pub fn value<'d>(&self, document: &'d TextDocument) -> &'d str {
        document
            .text()
            .get(self.start.absolute_offset..self.end.absolute_offset)
            .unwrap_or_default()
    }
}

// ============================================================================
// TokenList
// ============================================================================

/// The full, ordered token sequence of one document.
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    tokens: Arc<[Token]>,
}

impl TokenList {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens: tokens.into() }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn as_slice(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// One line per token: 1-based span, type, source text and any meta classifications.
    pub fn dump(&self, document: &TextDocument) -> String {
        self.tokens
            .iter()
            .map(|token| {
                let mut line = format!(
                    "{}:{}..{}:{} {} {:?}",
                    token.start.line + 1,
                    token.start.character + 1,
                    token.end.line + 1,
                    token.end.character + 1,
                    token.token_type,
                    token.value(document)
                );
                if !token.meta.is_empty() {
                    let meta: Vec<&str> = token.meta.iter().map(|m| m.name()).collect();
                    line.push_str(&format!(" [{}]", meta.join(", ")));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A fresh cursor over the list with no filter installed.
    pub fn iterator(&self) -> TokenListIterator {
        TokenListIterator {
            tokens: Arc::clone(&self.tokens),
            index: 0,
            filter: Arc::default(),
        }
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

// ============================================================================
// TokenListIterator
// ============================================================================

/// A cursor over a [`TokenList`] that transparently skips filtered token types.
///
/// ## Notes
/// - `clone()` yields an independent cursor at the same position; advancing either does not affect the other. The
///   token storage itself is shared and immutable.
/// - The cursor always rests on a non-filtered token (or past the end), so [`TokenListIterator::token`] is a pure
///   peek.
#[derive(Debug, Clone)]
pub struct TokenListIterator {
    tokens: Arc<[Token]>,
    index: usize,
    filter: Arc<HashSet<TokenFilter>>,
}

/// One entry of an iterator filter: an exact token type or a whole category range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenFilter {
    Type(TokenType),
    Category(TokenCategory),
}

impl From<TokenType> for TokenFilter {
    fn from(token_type: TokenType) -> Self {
        TokenFilter::Type(token_type)
    }
}

impl From<TokenCategory> for TokenFilter {
    fn from(category: TokenCategory) -> Self {
        TokenFilter::Category(category)
    }
}

impl TokenListIterator {
    /// Install a set of token types and categories to skip and move past any at the cursor.
    pub fn set_filter<F: Into<TokenFilter>>(&mut self, filter: impl IntoIterator<Item = F>) {
        self.filter = Arc::new(filter.into_iter().map(Into::into).collect());
        self.skip_filtered();
    }

    pub fn has_next(&self) -> bool {
        self.index < self.tokens.len()
    }

    /// Peek at the next token without consuming it.
    pub fn token(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Raw index of the cursor in the underlying list.
    pub fn index(&self) -> usize {
        self.index
    }

    fn skips(&self, token_type: TokenType) -> bool {
        self.filter.contains(&TokenFilter::Type(token_type))
            || self.filter.contains(&TokenFilter::Category(token_type.category()))
    }

    fn skip_filtered(&mut self) {
        while let Some(token) = self.tokens.get(self.index) {
            if !self.skips(token.token_type) {
                break;
            }
            self.index += 1;
        }
    }
}

impl Iterator for TokenListIterator {
    type Item = Token;

    /// Consume and return the next token.
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index)?.clone();
        self.index += 1;
        self.skip_filtered();
        Some(token)
    }
}
