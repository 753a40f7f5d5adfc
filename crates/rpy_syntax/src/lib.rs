//! Syntax layer for Ren'Py scripts: document/position model, pattern tokenizer, token stream.
//!
//! This crate knows nothing about statements or scopes; the parser and symbol table live in the `rpy` crate.
//!
//! ## Notes
//! - Token vocabulary comes from `rpy_core::lang`.
//! - Positions use 0-based lines and UTF-8 byte columns (see [`document`]).
//!
//! ## Examples
//! ```rust
//! use rpy_core::lang::tokens::TokenType;
//! use rpy_syntax::document::TextDocument;
//! use rpy_syntax::tokenizer::{tokenize, RENPY_GRAMMAR};
//!
//! let doc = TextDocument::new("script.rpy", "label start:\n    \"Hello\"\n");
//! let tokens = tokenize(doc.text(), &RENPY_GRAMMAR);
//! let mut it = tokens.iterator();
//! it.set_filter([TokenType::Whitespace]);
//! assert_eq!(it.token().map(|t| t.token_type), Some(TokenType::Label));
//! ```

pub mod document;
pub mod token;
pub mod tokenizer;

pub use document::{DocumentError, DocumentRange, Location, Position, TextDocument};
pub use token::{Token, TokenFilter, TokenList, TokenListIterator};
