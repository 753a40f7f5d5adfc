//! Front end configuration.

use rpy_core::lang::tokens::TokenType;

/// Default upper bound on documents a query will re-parse (4 MiB).
pub const DEFAULT_MAX_REPARSE_BYTES: usize = 4 * 1024 * 1024;

/// Parser and query configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// Token types the parser's iterator skips
    pub skip_types: Vec<TokenType>,
    /// Largest document a definition/reference query will parse
    pub max_reparse_bytes: usize,
    /// Log a warning when an empty token span is observed
    pub warn_on_empty_tokens: bool,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            skip_types: vec![TokenType::Comment, TokenType::Whitespace],
            max_reparse_bytes: DEFAULT_MAX_REPARSE_BYTES,
            warn_on_empty_tokens: true,
        }
    }
}

impl FrontendConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of skipped token types
    pub fn with_skip_types(mut self, skip_types: impl IntoIterator<Item = TokenType>) -> Self {
        self.skip_types = skip_types.into_iter().collect();
        self
    }

    /// Set the re-parse size bound for queries
    pub fn with_max_reparse_bytes(mut self, bytes: usize) -> Self {
        self.max_reparse_bytes = bytes;
        self
    }

    pub fn with_warn_on_empty_tokens(mut self, warn: bool) -> Self {
        self.warn_on_empty_tokens = warn;
        self
    }

    pub fn skips(&self, token_type: TokenType) -> bool {
        self.skip_types.contains(&token_type)
    }
}
