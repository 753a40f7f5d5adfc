//! Pattern grammar types driving the tokenizer.
//!
//! A grammar is a tree of [`TokenPattern`]s. The three variants form a closed set: adding a fourth kind means
//! extending the `match` in the tokenizer, which the compiler enforces.

use regex::Regex;
use rpy_core::lang::tokens::TokenType;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One element of a tokenizer grammar.
#[derive(Debug, Clone)]
pub enum TokenPattern {
    /// A regex at the cursor producing exactly one token.
    Match(MatchPattern),
    /// A begin/end delimited region, optionally with nested patterns inside.
    Range(RangePattern),
    /// An ordered list of alternatives; the first one that matches wins.
    Repo(RepoPattern),
}

impl From<MatchPattern> for TokenPattern {
    fn from(pattern: MatchPattern) -> Self {
        TokenPattern::Match(pattern)
    }
}

impl From<RangePattern> for TokenPattern {
    fn from(pattern: RangePattern) -> Self {
        TokenPattern::Range(pattern)
    }
}

impl From<RepoPattern> for TokenPattern {
    fn from(pattern: RepoPattern) -> Self {
        TokenPattern::Repo(pattern)
    }
}

/// Compile `pattern` so that it can only match at the start of the haystack.
fn anchored(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(&format!(r"\A(?:{pattern})")).map_err(|source| PatternError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Length of the anchored match at `offset`, if any. May be zero.
fn match_len(regex: &Regex, text: &str, offset: usize) -> Option<usize> {
    regex.find(&text[offset..]).map(|m| m.end())
}

#[derive(Debug, Clone)]
pub struct MatchPattern {
    regex: Regex,
    pub token: TokenType,
}

impl MatchPattern {
    pub fn new(pattern: &str, token: TokenType) -> Result<Self, PatternError> {
        Ok(Self {
            regex: anchored(pattern)?,
            token,
        })
    }

    /// Length of a non-empty match at `offset`. Empty matches count as no match.
    pub fn match_at(&self, text: &str, offset: usize) -> Option<usize> {
        match_len(&self.regex, text, offset).filter(|&len| len > 0)
    }
}

/// A delimited region such as a string body or a python line.
///
/// ## Notes
/// - `meta` is pushed as a secondary classification onto every token emitted from the begin delimiter through the
///   end delimiter, nested sub-pattern tokens included.
/// - Text inside the region that no sub-pattern matches is merged into runs of `content_token`.
/// - The end pattern may match zero-width (e.g. `$` in multi-line mode). A zero-width end closes the region without
///   emitting a delimiter token.
#[derive(Debug, Clone)]
pub struct RangePattern {
    begin: Regex,
    end: Regex,
    pub begin_token: TokenType,
    pub end_token: TokenType,
    pub content_token: TokenType,
    pub meta: Option<TokenType>,
    pub patterns: RepoPattern,
}

impl RangePattern {
    pub fn new(
        begin: &str,
        begin_token: TokenType,
        end: &str,
        end_token: TokenType,
    ) -> Result<Self, PatternError> {
        Ok(Self {
            begin: anchored(begin)?,
            end: anchored(end)?,
            begin_token,
            end_token,
            content_token: TokenType::Unknown,
            meta: None,
            patterns: RepoPattern::default(),
        })
    }

    pub fn with_content(mut self, content_token: TokenType) -> Self {
        self.content_token = content_token;
        self
    }

    pub fn with_meta(mut self, meta: TokenType) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_patterns(mut self, patterns: RepoPattern) -> Self {
        self.patterns = patterns;
        self
    }

    /// Length of a non-empty begin match at `offset`.
    pub fn begin_at(&self, text: &str, offset: usize) -> Option<usize> {
        match_len(&self.begin, text, offset).filter(|&len| len > 0)
    }

    /// Length of an end match at `offset`; zero-width matches are reported as `Some(0)`.
    pub fn end_at(&self, text: &str, offset: usize) -> Option<usize> {
        match_len(&self.end, text, offset)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RepoPattern {
    pub patterns: Vec<TokenPattern>,
}

impl RepoPattern {
    pub fn new(patterns: Vec<TokenPattern>) -> Self {
        Self { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn push(&mut self, pattern: impl Into<TokenPattern>) {
        self.patterns.push(pattern.into());
    }

    /// Append every pattern of `other`, preserving its order.
    pub fn extend(&mut self, other: &RepoPattern) {
        self.patterns.extend(other.patterns.iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_pattern_is_anchored() {
        let p = MatchPattern::new(r"\d+", TokenType::Integer).unwrap();
        assert_eq!(p.match_at("12ab", 0), Some(2));
        assert_eq!(p.match_at("ab12", 0), None);
        assert_eq!(p.match_at("ab12", 2), Some(2));
    }

    #[test]
    fn test_match_pattern_alternation_stays_anchored() {
        let p = MatchPattern::new("a|b", TokenType::Identifier).unwrap();
        assert_eq!(p.match_at("xb", 0), None);
    }

    #[test]
    fn test_empty_match_is_no_match() {
        let p = MatchPattern::new(r"\d*", TokenType::Integer).unwrap();
        assert_eq!(p.match_at("abc", 0), None);
    }

    #[test]
    fn test_range_end_may_be_zero_width() {
        let r = RangePattern::new(r"\$", TokenType::Dollar, r"(?m:$)", TokenType::NewLine).unwrap();
        assert_eq!(r.begin_at("$ x\n", 0), Some(1));
        assert_eq!(r.end_at("$ x\n", 3), Some(0));
        assert_eq!(r.end_at("$ x\n", 1), None);
    }

    #[test]
    fn test_invalid_regex_is_reported() {
        let err = MatchPattern::new("(", TokenType::Unknown).unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { .. }));
        assert!(err.to_string().contains("invalid pattern"));
    }
}
