//! Expressions, string literals and the references they carry.

use rpy_core::lang::tokens::TokenType;
use rpy_syntax::document::DocumentRange;
use rpy_syntax::token::Token;

use super::DocumentParser;
use crate::frontend::ast::{Expression, Identifier, StringLiteral};
use crate::frontend::diagnostics::ParseErrorType;

fn opens(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::OpenParenthesis | TokenType::OpenSquareBracket | TokenType::OpenBracket
    )
}

fn closes(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::CloseParenthesis | TokenType::CloseSquareBracket | TokenType::CloseBracket
    )
}

impl<'a> DocumentParser<'a> {
    /// Parse an expression and record its identifiers as symbol references.
    ///
    /// Runs to the end of the line, or to the first token of a `stops` type outside brackets and strings. Returns
    /// `None` if nothing was consumed.
    pub(super) fn expression(&mut self, stops: &[TokenType]) -> Option<Expression> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        while !self.at_eol() {
            let token = self.peek();
            if !token.has_meta(TokenType::StringLiteral) {
                if depth == 0 && stops.contains(&token.token_type) {
                    break;
                }
                if opens(token.token_type) {
                    depth += 1;
                } else if closes(token.token_type) {
                    depth = depth.saturating_sub(1);
                }
            }
            self.next();
            tokens.push(self.current.clone());
        }
        self.finish_expression(&tokens)
    }

    /// Like [`DocumentParser::expression`], recording an unexpected token when the expression is empty.
    pub(super) fn required_expression(&mut self, stops: &[TokenType]) -> Option<Expression> {
        let expression = self.expression(stops);
        if expression.is_none() {
            self.add_error(ParseErrorType::UnexpectedToken, None);
        }
        expression
    }

    /// A balanced `( ... )` group, such as call arguments.
    pub(super) fn parenthesized(&mut self) -> Option<Expression> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        while !self.at_eol() {
            self.next();
            let token = self.current.clone();
            let in_string = token.has_meta(TokenType::StringLiteral);
            tokens.push(token);
            if in_string {
                continue;
            }
            let last = &tokens[tokens.len() - 1];
            if opens(last.token_type) {
                depth += 1;
            } else if closes(last.token_type) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
        }
        if depth > 0 {
            self.add_error(ParseErrorType::UnexpectedToken, Some(TokenType::CloseParenthesis));
        }
        self.finish_expression(&tokens)
    }

    fn finish_expression(&mut self, tokens: &[Token]) -> Option<Expression> {
        let expression = self.expression_from(tokens)?;
        for identifier in &expression.identifiers {
            self.reference_symbol(identifier);
        }
        for token in tokens.iter().filter(|t| t.is(TokenType::Interpolation)) {
            self.reference_interpolation(token);
        }
        Some(expression)
    }

    pub(super) fn expression_from(&self, tokens: &[Token]) -> Option<Expression> {
        let (first, last) = (tokens.first()?, tokens.last()?);
        let range = DocumentRange::new(first.start, last.end);
        Some(Expression {
            text: self.slice(range).to_string(),
            range,
            identifiers: self.identifiers_in(tokens),
        })
    }

    /// Root names mentioned by an expression: attribute chains (`a.b.c`) are kept whole, while attribute accesses
    /// on other values, keyword argument names and string contents are skipped.
    fn identifiers_in(&self, tokens: &[Token]) -> Vec<Identifier> {
        let adjacent = |a: &Token, b: &Token| a.end.absolute_offset == b.start.absolute_offset;
        let mut identifiers = Vec::new();
        let mut depth = 0usize;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            if token.has_meta(TokenType::StringLiteral) {
                i += 1;
                continue;
            }
            if opens(token.token_type) {
                depth += 1;
            } else if closes(token.token_type) {
                depth = depth.saturating_sub(1);
            }

            let attribute = i > 0 && tokens[i - 1].is(TokenType::Period);
            let keyword_argument = depth > 0 && tokens.get(i + 1).is_some_and(|t| t.is(TokenType::Assign));
            if !token.is(TokenType::Identifier) || attribute || keyword_argument {
                i += 1;
                continue;
            }

            let mut end = i;
            while let (Some(dot), Some(part)) = (tokens.get(end + 1), tokens.get(end + 2)) {
                let joins = dot.is(TokenType::Period)
                    && (part.is(TokenType::Identifier) || part.token_type.is_keyword())
                    && adjacent(&tokens[end], dot)
                    && adjacent(dot, part);
                if !joins {
                    break;
                }
                end += 2;
            }

            let range = DocumentRange::new(token.start, tokens[end].end);
            identifiers.push(Identifier {
                name: self.slice(range).to_string(),
                range,
            });
            i = end + 1;
        }
        identifiers
    }

    /// Parse a string literal at the lookahead.
    ///
    /// ## Notes
    /// - The opening delimiter carries [`TokenType::StringLiteral`] meta; the literal ends at the next token of
    ///   the same delimiter type, or wherever the string-meta tokens run out.
    /// - Interpolations (`[name]`) in the body are recorded as symbol references.
    /// - Anything else at the lookahead records an unexpected token and consumes nothing.
    pub(super) fn string_literal(&mut self) -> Option<StringLiteral> {
        if !self.require_token(TokenType::StringLiteral) {
            return None;
        }
        let open = self.current.clone();
        let mut body_end = open.end;
        let mut closed = false;

        while self.has_next() && self.test(TokenType::StringLiteral) {
            self.next();
            if self.current.is(open.token_type) {
                closed = true;
                break;
            }
            body_end = self.current.end;
            if self.current.is(TokenType::Interpolation) {
                let token = self.current.clone();
                self.reference_interpolation(&token);
            }
        }
        if !closed {
            tracing::debug!(at = %open.start, "unterminated string literal");
        }

        Some(StringLiteral {
            text: self.slice(DocumentRange::new(open.end, body_end)).to_string(),
            range: self.range_from(open.start),
        })
    }

    /// Record the root name of a `[name.attr!q]` interpolation.
    fn reference_interpolation(&mut self, token: &Token) {
        let text = self.token_value(token);
        let inner = text.strip_prefix('[').unwrap_or(text);
        let len = inner
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(inner.len());
        let name = inner[..len].trim_end_matches('.');
        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return;
        }

        let mut start = token.start;
        start.advance(text.len() - inner.len());
        let mut end = start;
        end.advance(name.len());
        self.reference_symbol(&Identifier {
            name: name.to_string(),
            range: DocumentRange::new(start, end),
        });
    }

    fn slice(&self, range: DocumentRange) -> &'a str {
        self.document
            .text()
            .get(range.start.absolute_offset..range.end.absolute_offset)
            .unwrap_or_default()
    }
}
