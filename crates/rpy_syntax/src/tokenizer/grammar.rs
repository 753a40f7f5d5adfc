//! The built-in Ren'Py token grammar.
//!
//! ## Notes
//! - Alternatives are tried in declaration order and the first match wins, regardless of length. Anything order
//!   sensitive (`"""` before `"`, floats before integers, `==` before `=`) relies on that.
//! - Keyword rows come from [`rpy_core::lang::keywords::KEYWORDS`], so adding a keyword there is enough for it to be
//!   tokenized.

use once_cell::sync::Lazy;
use regex::escape;
use rpy_core::lang::keywords::KEYWORDS;
use rpy_core::lang::tokens::TokenType;

use super::pattern::{MatchPattern, PatternError, RangePattern, RepoPattern, TokenPattern};

/// Root grammar for `.rpy` scripts.
pub static RENPY_GRAMMAR: Lazy<TokenPattern> =
    Lazy::new(|| build_renpy_grammar().expect("INVARIANT: built-in grammar patterns are valid regexes"));

const OPERATORS: &[(&str, TokenType)] = &[
    ("==", TokenType::Equals),
    ("!=", TokenType::NotEquals),
    ("<=", TokenType::LessThanOrEquals),
    (">=", TokenType::GreaterThanOrEquals),
    ("+=", TokenType::PlusAssign),
    ("-=", TokenType::MinusAssign),
    ("*=", TokenType::MultiplyAssign),
    ("/=", TokenType::DivideAssign),
    ("//", TokenType::FloorDivide),
    ("**", TokenType::Exponent),
    ("=", TokenType::Assign),
    ("+", TokenType::Plus),
    ("-", TokenType::Minus),
    ("*", TokenType::Multiply),
    ("/", TokenType::Divide),
    ("%", TokenType::Modulo),
    ("<", TokenType::LessThan),
    (">", TokenType::GreaterThan),
];

const PUNCTUATION: &[(&str, TokenType)] = &[
    (":", TokenType::Colon),
    (",", TokenType::Comma),
    (".", TokenType::Period),
    ("(", TokenType::OpenParenthesis),
    (")", TokenType::CloseParenthesis),
    ("[", TokenType::OpenSquareBracket),
    ("]", TokenType::CloseSquareBracket),
    ("{", TokenType::OpenBracket),
    ("}", TokenType::CloseBracket),
];

const ESCAPES: &[(&str, TokenType)] = &[
    (r#"\\""#, TokenType::EscDoubleQuote),
    (r"\\'", TokenType::EscSingleQuote),
    (r"\\\\", TokenType::EscBackslash),
    (r"\\n", TokenType::EscNewline),
    (r"\\t", TokenType::EscTab),
    (r"\\ ", TokenType::EscWhitespace),
    (r"\[\[", TokenType::EscOpenSquareBracket),
    (r"\{\{", TokenType::EscOpenBracket),
    ("%%", TokenType::EscPercent),
];

fn literal(table: &[(&str, TokenType)]) -> Result<RepoPattern, PatternError> {
    let mut repo = RepoPattern::default();
    for &(text, token) in table {
        repo.push(MatchPattern::new(&escape(text), token)?);
    }
    Ok(repo)
}

/// Escapes, text tags and interpolations valid inside a string body.
fn string_content() -> Result<RepoPattern, PatternError> {
    let mut repo = RepoPattern::default();
    for &(pattern, token) in ESCAPES {
        repo.push(MatchPattern::new(pattern, token)?);
    }
    repo.push(MatchPattern::new(r"\{[^{}\r\n]*\}", TokenType::TextTag)?);
    repo.push(MatchPattern::new(r"\[[^\[\]\r\n]*\]", TokenType::Interpolation)?);
    Ok(repo)
}

fn strings() -> Result<RepoPattern, PatternError> {
    let content = string_content()?;
    let string = |delimiter: &str, token: TokenType| -> Result<TokenPattern, PatternError> {
        Ok(RangePattern::new(delimiter, token, delimiter, token)?
            .with_content(TokenType::String)
            .with_meta(TokenType::StringLiteral)
            .with_patterns(content.clone())
            .into())
    };

    Ok(RepoPattern::new(vec![
        string(r#"""""#, TokenType::TripleDoubleQuote)?,
        string(r#"""#, TokenType::DoubleQuote)?,
        string("'", TokenType::SingleQuote)?,
        string("`", TokenType::BackQuote)?,
    ]))
}

fn trivia() -> Result<RepoPattern, PatternError> {
    let mut repo = RepoPattern::default();
    repo.push(MatchPattern::new(r"[ \t]+", TokenType::Whitespace)?);
    repo.push(MatchPattern::new(r"#[^\r\n]*", TokenType::Comment)?);
    Ok(repo)
}

/// Literals, words, operators and punctuation.
fn atoms() -> Result<RepoPattern, PatternError> {
    let mut repo = RepoPattern::default();
    repo.push(MatchPattern::new(
        r"(?:\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?|\d+[eE][+-]?\d+",
        TokenType::Float,
    )?);
    repo.push(MatchPattern::new(r"0[xX][0-9a-fA-F]+|\d+", TokenType::Integer)?);
    for keyword in KEYWORDS {
        repo.push(MatchPattern::new(&format!(r"{}\b", escape(keyword.canonical)), keyword.token)?);
    }
    repo.push(MatchPattern::new(r"(?:True|False)\b", TokenType::Boolean)?);
    repo.push(MatchPattern::new(r"None\b", TokenType::Null)?);
    repo.push(MatchPattern::new(r"[\p{L}_][\p{L}\p{N}_]*", TokenType::Identifier)?);
    repo.extend(&literal(OPERATORS)?);
    repo.extend(&literal(PUNCTUATION)?);
    Ok(repo)
}

pub fn build_renpy_grammar() -> Result<TokenPattern, PatternError> {
    let trivia = trivia()?;
    let strings = strings()?;
    let atoms = atoms()?;

    // a python line holds everything except line breaks and nested `$`
    let mut python = RepoPattern::default();
    python.extend(&trivia);
    python.extend(&strings);
    python.extend(&atoms);
    let python_line = RangePattern::new(r"\$", TokenType::Dollar, r"(?mR:$)", TokenType::NewLine)?
        .with_meta(TokenType::PythonLine)
        .with_patterns(python);

    let mut root = RepoPattern::default();
    root.push(MatchPattern::new(r"\r?\n", TokenType::NewLine)?);
    root.extend(&trivia);
    root.extend(&strings);
    root.push(python_line);
    root.extend(&atoms);
    Ok(root.into())
}
