//! Pattern-driven tokenizer.
//!
//! Turns document text into a flat, ordered, non-overlapping token sequence that covers every byte of the input.
//! Text no pattern accepts becomes [`TokenType::Unknown`] tokens (consecutive unmatched characters are merged into one
//! run), so tokenization never fails.
//!
//! ## Notes
//! - At each offset the grammar's alternatives are tried in declaration order; the first match wins.
//! - A range pattern emits its begin delimiter, then repeatedly: checks its end pattern, then its sub-patterns, and
//!   otherwise adds one character to a content run. The end delimiter is emitted unless it matched zero-width. An
//!   unterminated range closes at end of input.
//! - The scanner owns one working [`Position`] cursor; tokens receive copies of it, never a shared handle.
//!
//! ## Examples
//! ```rust
//! use rpy_core::lang::tokens::TokenType;
//! use rpy_syntax::tokenizer::{tokenize, RENPY_GRAMMAR};
//!
//! let tokens = tokenize("jump start", &RENPY_GRAMMAR);
//! let types: Vec<_> = tokens.iter().map(|t| t.token_type).collect();
//! assert_eq!(types, vec![TokenType::Jump, TokenType::Whitespace, TokenType::Identifier]);
//! ```

pub mod grammar;
pub mod pattern;

use rpy_core::lang::tokens::TokenType;

pub use grammar::{RENPY_GRAMMAR, build_renpy_grammar};
pub use pattern::{MatchPattern, PatternError, RangePattern, RepoPattern, TokenPattern};

use crate::document::Position;
use crate::token::{Token, TokenList};

/// Tokenize `text` against `grammar`.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn tokenize(text: &str, grammar: &TokenPattern) -> TokenList {
    let mut scanner = Scanner::new(text);
    while !scanner.at_end() {
        if !scanner.try_pattern(grammar) {
            scanner.push_unmatched(TokenType::Unknown);
        }
    }
    scanner.flush_pending();
    tracing::debug!(token_count = scanner.tokens.len(), "tokenized");
    TokenList::new(scanner.tokens)
}

/// A run of unmatched characters waiting to be emitted as one token.
struct PendingRun {
    token_type: TokenType,
    start: Position,
}

struct Scanner<'t> {
    text: &'t str,
    /// The working cursor. Only the scanner mutates it.
    cursor: Position,
    tokens: Vec<Token>,
    meta: Vec<TokenType>,
    pending: Option<PendingRun>,
}

impl<'t> Scanner<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            text,
            cursor: Position::default(),
            tokens: Vec::new(),
            meta: Vec::new(),
            pending: None,
        }
    }

    fn at_end(&self) -> bool {
        self.cursor.absolute_offset >= self.text.len()
    }

    fn offset(&self) -> usize {
        self.cursor.absolute_offset
    }

    /// Move the cursor over `len` bytes, tracking line breaks.
    fn advance_over(&mut self, len: usize) {
        let start = self.offset();
        for byte in self.text.as_bytes()[start..start + len].iter() {
            if *byte == b'\n' {
                self.cursor.absolute_offset += 1;
                self.cursor.next_line();
            } else {
                self.cursor.next();
            }
        }
    }

    fn emit(&mut self, token_type: TokenType, len: usize) {
        self.flush_pending();
        let start = self.cursor;
        self.advance_over(len);
        self.tokens
            .push(Token::new(token_type, start, self.cursor).with_meta(self.meta.clone()));
    }

    /// Consume one character into the pending run of `token_type`.
    fn push_unmatched(&mut self, token_type: TokenType) {
        match &self.pending {
            Some(run) if run.token_type == token_type => {}
            _ => {
                self.flush_pending();
                self.pending = Some(PendingRun {
                    token_type,
                    start: self.cursor,
                });
            }
        }
        let len = self.text[self.offset()..].chars().next().map_or(1, char::len_utf8);
        self.advance_over(len);
    }

    fn flush_pending(&mut self) {
        if let Some(run) = self.pending.take() {
            self.tokens
                .push(Token::new(run.token_type, run.start, self.cursor).with_meta(self.meta.clone()));
        }
    }

    fn try_pattern(&mut self, pattern: &TokenPattern) -> bool {
        match pattern {
            TokenPattern::Match(p) => match p.match_at(self.text, self.offset()) {
                Some(len) => {
                    self.emit(p.token, len);
                    true
                }
                None => false,
            },
            TokenPattern::Repo(repo) => self.try_repo(repo),
            TokenPattern::Range(range) => self.try_range(range),
        }
    }

    fn try_repo(&mut self, repo: &RepoPattern) -> bool {
        repo.patterns.iter().any(|p| self.try_pattern(p))
    }

    fn try_range(&mut self, range: &RangePattern) -> bool {
        let Some(begin_len) = range.begin_at(self.text, self.offset()) else {
            return false;
        };

        self.flush_pending();
        if let Some(meta) = range.meta {
            self.meta.push(meta);
        }
        self.emit(range.begin_token, begin_len);

        while !self.at_end() {
            if let Some(end_len) = range.end_at(self.text, self.offset()) {
                self.flush_pending();
                if end_len > 0 {
                    self.emit(range.end_token, end_len);
                }
                break;
            }
            if !self.try_repo(&range.patterns) {
                self.push_unmatched(range.content_token);
            }
        }

        self.flush_pending();
        if range.meta.is_some() {
            self.meta.pop();
        }
        true
    }
}
