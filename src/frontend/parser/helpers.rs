//! Cursor primitives: lookahead tests, token consumption and error recording.

use rpy_core::lang::tokens::TokenType;
use rpy_syntax::document::{DocumentRange, Location, Position};
use rpy_syntax::token::Token;

use super::DocumentParser;
use crate::frontend::diagnostics::{CompileError, ParseError, ParseErrorType};
use crate::frontend::symbols::ScopeId;

impl<'a> DocumentParser<'a> {
    /// The last consumed token ([`TokenType::Invalid`] before the first `next`)
    pub fn current(&self) -> &Token {
        &self.current
    }

    /// The lookahead token ([`TokenType::Invalid`] at end of input)
    pub fn peek(&self) -> &Token {
        self.it.token().unwrap_or(&self.invalid)
    }

    /// The token `n` places after the lookahead, without moving the cursor
    pub fn peek_nth(&self, n: usize) -> Token {
        let mut it = self.it.clone();
        for _ in 0..n {
            it.next();
        }
        it.token().cloned().unwrap_or_else(Token::invalid)
    }

    pub fn has_next(&self) -> bool {
        self.it.has_next()
    }

    /// Source text of the last consumed token
    pub fn current_value(&self) -> &'a str {
        self.token_value(&self.current)
    }

    /// Source text of the lookahead token
    pub fn peek_value(&self) -> &'a str {
        self.token_value(self.peek())
    }

    pub(super) fn token_value(&self, token: &Token) -> &'a str {
        if token.is(TokenType::Invalid) {
            return "";
        }
        token.value(self.document)
    }

    /// Consume the lookahead. At end of input this records an unexpected end of file and leaves `current` as is.
    pub fn next(&mut self) {
        match self.it.next() {
            Some(token) => self.current = token,
            None => self.add_error(ParseErrorType::UnexpectedEndOfFile, None),
        }
    }

    /// Whether the lookahead has type `token_type` or carries it as meta.
    pub fn test(&self, token_type: TokenType) -> bool {
        let token = self.peek();
        token.is(token_type) || token.has_meta(token_type)
    }

    /// Whether the lookahead's source text is exactly `value`
    pub fn test_value(&self, value: &str) -> bool {
        self.has_next() && self.peek_value() == value
    }

    /// Consume a token of `token_type`, or record an unexpected token without consuming anything.
    pub fn require_token(&mut self, token_type: TokenType) -> bool {
        if !self.test(token_type) {
            self.add_error(ParseErrorType::UnexpectedToken, Some(token_type));
            return false;
        }
        self.next();
        true
    }

    /// Consume a token of `token_type` if present. Never records an error.
    pub fn optional_token(&mut self, token_type: TokenType) -> bool {
        if !self.test(token_type) {
            return false;
        }
        self.next();
        true
    }

    /// Consume the lookahead if it matches any of `token_types`, otherwise record an unexpected token.
    pub fn any_of_token(&mut self, token_types: &[TokenType]) -> bool {
        if token_types.iter().any(|&t| self.test(t)) {
            self.next();
            return true;
        }
        self.add_error(ParseErrorType::UnexpectedToken, None);
        false
    }

    /// End of a logical line: a line break or the end of input.
    pub fn at_eol(&self) -> bool {
        !self.has_next() || self.test(TokenType::NewLine)
    }

    /// Consume tokens up to (not including) the next line break.
    pub fn skip_to_eol(&mut self) {
        while self.has_next() && !self.test(TokenType::NewLine) {
            self.next();
        }
    }

    /// Require the end of the line.
    ///
    /// Anything left on the line is reported once, as an unexpected end of line, and skipped. Returns whether the
    /// cursor now rests on a line break.
    pub fn expect_eol(&mut self) -> bool {
        if !self.at_eol() {
            self.add_error(ParseErrorType::UnexpectedEndOfLine, None);
        }
        self.skip_to_eol();
        self.test(TokenType::NewLine)
    }

    pub(super) fn skip_empty_lines(&mut self) {
        while self.test(TokenType::NewLine) {
            self.next();
        }
    }

    // ========================================================================
    // Locations and errors
    // ========================================================================

    pub fn location(&self, range: DocumentRange) -> Location {
        Location::new(self.document.path(), range)
    }

    /// Location of the last consumed token
    pub fn location_from_current(&self) -> Location {
        self.location(self.token_range(&self.current))
    }

    pub(super) fn token_range(&self, token: &Token) -> DocumentRange {
        if self.config.warn_on_empty_tokens {
            token.range()
        } else {
            DocumentRange::new(token.start, token.end)
        }
    }

    /// Range from `start` to the end of the last consumed token
    pub(super) fn range_from(&self, start: Position) -> DocumentRange {
        let end = if self.current.is(TokenType::Invalid) {
            start
        } else {
            self.current.end.max(start)
        };
        DocumentRange::new(start, end)
    }

    /// Record a parse error against the current parser state.
    pub fn add_error(&mut self, error_type: ParseErrorType, expected: Option<TokenType>) {
        let next_token = self.peek().clone();
        let anchor = match error_type {
            ParseErrorType::UnexpectedEndOfFile => &self.current,
            _ if self.has_next() => &next_token,
            _ => &self.current,
        };
        let location =
            (!anchor.is(TokenType::Invalid)).then(|| self.location(DocumentRange::new(anchor.start, anchor.end)));

        let error = ParseError {
            error_type,
            current_token: self.current.clone(),
            next_token,
            expected,
        };
        tracing::trace!(message = %error.message(), "parse error");
        self.program.add_error(CompileError::parse(error, location));
    }

    /// Log the token types remaining on the current line.
    pub fn debug_print_line(&self) {
        let mut it = self.it.clone();
        let mut types = Vec::new();
        while let Some(token) = it.token() {
            if token.is(TokenType::NewLine) {
                break;
            }
            types.push(token.token_type.name());
            it.next();
        }
        tracing::debug!(at = %self.peek().start, tokens = %types.join(", "), "unparsed line");
    }

    pub(super) fn scope(&self) -> ScopeId {
        self.program.symbols.current_scope()
    }
}
