//! Provide the canonical token vocabulary shared by the rpy tokenizer, parser, and tooling.
//!
//! This crate is intentionally small and dependency-free. It contains:
//! - the flat [`lang::tokens::TokenType`] enumeration and its category ranges, and
//! - the keyword registry ([`lang::keywords`]) the tokenizer grammar is generated from.
//!
//! ## Notes
//!
//! - No IO, no global state, no AST types. The tokenizer and parser own syntax; this crate only names things.

pub mod lang;
