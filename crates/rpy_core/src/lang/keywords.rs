//! Define the reserved keyword vocabulary of the Ren'Py script language.
//!
//! This module is the single source of truth for reserved words: every keyword is a [`TokenType`] in the keyword
//! range plus a row in [`KEYWORDS`] recording its spelling and category. The tokenizer grammar generates one match
//! pattern per row, in table order.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Ren'Py statements are context sensitive (`show` is only a statement at line start), but the tokenizer does not
//!   know about context: a reserved spelling always tokenizes as its keyword, and the parser decides what it means.
//!
//! ## Examples
//! ```rust
//! use rpy_core::lang::keywords::{self, KeywordCategory};
//! use rpy_core::lang::tokens::TokenType;
//!
//! assert_eq!(keywords::from_str("jump"), Some(TokenType::Jump));
//! assert_eq!(keywords::as_str(TokenType::Jump), Some("jump"));
//! assert_eq!(keywords::info_for(TokenType::Behind).map(|k| k.category), Some(KeywordCategory::Clause));
//! ```

use super::tokens::TokenType;

/// High-level grouping for documentation and diagnostics.
///
/// Categories are metadata only; they do not enforce parsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// Starts a statement (`label`, `jump`, `show`, ...).
    Statement,
    /// Modifies a statement (`at`, `with`, `behind`, `expression`, ...).
    Clause,
    /// Python word operators usable inside expressions.
    Operator,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub token: TokenType,
    pub canonical: &'static str,
    pub category: KeywordCategory,
}

/// Registry of all keywords.
///
/// ## Notes
/// - Ordering is the tokenizer's pattern order. No keyword is a prefix of another one followed by a word character,
///   so order only matters for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Statements
    info(TokenType::Label, "label", KeywordCategory::Statement),
    info(TokenType::Jump, "jump", KeywordCategory::Statement),
    info(TokenType::Call, "call", KeywordCategory::Statement),
    info(TokenType::Return, "return", KeywordCategory::Statement),
    info(TokenType::Pass, "pass", KeywordCategory::Statement),
    info(TokenType::Define, "define", KeywordCategory::Statement),
    info(TokenType::Default, "default", KeywordCategory::Statement),
    info(TokenType::Init, "init", KeywordCategory::Statement),
    info(TokenType::Python, "python", KeywordCategory::Statement),
    info(TokenType::Menu, "menu", KeywordCategory::Statement),
    info(TokenType::If, "if", KeywordCategory::Statement),
    info(TokenType::Elif, "elif", KeywordCategory::Statement),
    info(TokenType::Else, "else", KeywordCategory::Statement),
    info(TokenType::While, "while", KeywordCategory::Statement),
    info(TokenType::For, "for", KeywordCategory::Statement),
    info(TokenType::Scene, "scene", KeywordCategory::Statement),
    info(TokenType::Show, "show", KeywordCategory::Statement),
    info(TokenType::Hide, "hide", KeywordCategory::Statement),
    info(TokenType::With, "with", KeywordCategory::Statement),
    info(TokenType::Pause, "pause", KeywordCategory::Statement),
    info(TokenType::Image, "image", KeywordCategory::Statement),
    info(TokenType::Screen, "screen", KeywordCategory::Statement),
    info(TokenType::Transform, "transform", KeywordCategory::Statement),
    info(TokenType::Play, "play", KeywordCategory::Statement),
    info(TokenType::Stop, "stop", KeywordCategory::Statement),
    info(TokenType::Queue, "queue", KeywordCategory::Statement),
    info(TokenType::Voice, "voice", KeywordCategory::Statement),
    info(TokenType::Nvl, "nvl", KeywordCategory::Statement),
    info(TokenType::Window, "window", KeywordCategory::Statement),
    info(TokenType::Style, "style", KeywordCategory::Statement),
    info(TokenType::Translate, "translate", KeywordCategory::Statement),
    // Clauses
    info(TokenType::At, "at", KeywordCategory::Clause),
    info(TokenType::As, "as", KeywordCategory::Clause),
    info(TokenType::Behind, "behind", KeywordCategory::Clause),
    info(TokenType::Onlayer, "onlayer", KeywordCategory::Clause),
    info(TokenType::Zorder, "zorder", KeywordCategory::Clause),
    info(TokenType::Expression, "expression", KeywordCategory::Clause),
    info(TokenType::From, "from", KeywordCategory::Clause),
    // Word operators
    info(TokenType::In, "in", KeywordCategory::Operator),
    info(TokenType::Not, "not", KeywordCategory::Operator),
    info(TokenType::And, "and", KeywordCategory::Operator),
    info(TokenType::Or, "or", KeywordCategory::Operator),
    info(TokenType::Is, "is", KeywordCategory::Operator),
];

/// Lookup by spelling.
pub fn from_str(s: &str) -> Option<TokenType> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.token)
}

/// Canonical spelling of a keyword token type, `None` for non-keywords.
pub fn as_str(token: TokenType) -> Option<&'static str> {
    info_for(token).map(|k| k.canonical)
}

/// Registry row for a keyword token type.
pub fn info_for(token: TokenType) -> Option<&'static KeywordInfo> {
    KEYWORDS.iter().find(|k| k.token == token)
}

// --- helpers -----------------------------------------------------------------

const fn info(token: TokenType, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo {
        token,
        canonical,
        category,
    }
}
