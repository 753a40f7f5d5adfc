#![forbid(unsafe_code)]
//! Ren'Py script front end
//!
//! Tokenizes `.rpy` scripts, parses a statement subset into a [`Program`] with a scope tree of symbols and labels,
//! and answers go-to-definition and find-references queries. The syntax layer (documents, positions, tokenizer,
//! token iterator) is the `rpy_syntax` crate; this crate adds the parser, symbol table, queries and the `rpy` CLI.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`. Malformed scripts never panic; they produce errors in [`Program::errors`].
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: The built-in grammar's static regexes use `.expect("INVARIANT: reason")`.

pub mod cli;
pub mod config;
pub mod frontend;
pub mod query;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::parser;
pub use frontend::symbols;
pub use frontend::{Program, parse_document, parse_document_with_config};

pub use config::FrontendConfig;
pub use query::{FrontendError, find_definition, find_references};
