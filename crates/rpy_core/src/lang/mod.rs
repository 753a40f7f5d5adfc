//! Ren'Py language vocabulary registries.
//!
//! Callers work with **stable IDs** ([`tokens::TokenType`]) and look up spellings/metadata via registry tables
//! instead of comparing strings.
//!
//! ## Examples
//! ```rust
//! use rpy_core::lang::keywords;
//! use rpy_core::lang::tokens::{TokenCategory, TokenType};
//!
//! assert_eq!(keywords::from_str("label"), Some(TokenType::Label));
//! assert_eq!(TokenType::Label.category(), TokenCategory::Keyword);
//! ```

pub mod keywords;
pub mod tokens;
