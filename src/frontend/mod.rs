//! Ren'Py script front end
//!
//! This module contains the parsing half of the toolchain:
//! - `parser`: grammar rules driving a token iterator, producing a [`Program`]
//! - `ast`: statement tree for the supported Ren'Py subset
//! - `symbols`: scope tree, symbol and label namespaces
//! - `program`: parse result aggregate
//! - `diagnostics`: parse and definition errors, terminal rendering
//!
//! Tokenization and the document model live in the `rpy_syntax` crate.

pub mod ast;
pub mod diagnostics;
pub mod parser;
pub mod program;
pub mod symbols;

pub use parser::{DocumentParser, GrammarRule, ParserError, parse_document, parse_document_with_config};
pub use program::{Program, ScopeRef};
