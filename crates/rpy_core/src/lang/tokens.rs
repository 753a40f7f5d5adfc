//! Define the flat token type vocabulary shared by the tokenizer and the parser.
//!
//! Every token the tokenizer emits carries exactly one [`TokenType`]. The enumeration is a single
//! `#[repr(u16)]` list partitioned into **contiguous ranges**, one per [`TokenCategory`]:
//!
//! | Range | First variant |
//! |---|---|
//! | Keyword | [`TokenType::Label`] |
//! | Entity | [`TokenType::Identifier`] |
//! | Constant | [`TokenType::Integer`] |
//! | Operator | [`TokenType::Assign`] |
//! | Character | [`TokenType::Whitespace`] |
//! | EscapedCharacter | [`TokenType::EscDoubleQuote`] |
//! | Meta | [`TokenType::Comment`] |
//! | Unknown | [`TokenType::Unknown`] |
//!
//! ## Notes
//! - Category membership is a range comparison against the boundary constants in [`boundaries`]. Those constants
//!   are the only place the layout is encoded; [`TokenType::category`] is the only place it is interpreted.
//! - When adding a variant, put it inside its category's range and add it to [`TokenType::ALL`]. The registry
//!   guardrail tests fail if `ALL` is not dense or a category range becomes empty.
//!
//! ## Examples
//! ```rust
//! use rpy_core::lang::tokens::{TokenCategory, TokenType};
//!
//! assert_eq!(TokenType::Jump.category(), TokenCategory::Keyword);
//! assert_eq!(TokenType::NewLine.category(), TokenCategory::Character);
//! assert!(TokenType::Unknown.is_unknown());
//! ```

use std::fmt;

/// Stable identifier for every token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum TokenType {
    // ========== Keywords ==========
    Label,
    Jump,
    Call,
    Return,
    Pass,
    Define,
    Default,
    Init,
    Python,
    Menu,
    If,
    Elif,
    Else,
    While,
    For,
    Scene,
    Show,
    Hide,
    With,
    At,
    As,
    Behind,
    Onlayer,
    Zorder,
    Expression,
    From,
    Pause,
    Image,
    Screen,
    Transform,
    Play,
    Stop,
    Queue,
    Voice,
    Nvl,
    Window,
    Style,
    Translate,
    In,
    Not,
    And,
    Or,
    Is,

    // ========== Entities ==========
    Identifier,
    /// `{b}`, `{/i}` style text tags inside strings.
    TextTag,
    /// `[name]` interpolation inside strings.
    Interpolation,

    // ========== Constants ==========
    Integer,
    Float,
    Boolean,
    Null,
    /// Body text of a string literal.
    String,

    // ========== Operators ==========
    Assign,
    PlusAssign,
    MinusAssign,
    MultiplyAssign,
    DivideAssign,
    Equals,
    NotEquals,
    LessThanOrEquals,
    GreaterThanOrEquals,
    FloorDivide,
    Exponent,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    LessThan,
    GreaterThan,

    // ========== Characters ==========
    Whitespace,
    NewLine,
    Colon,
    Comma,
    Period,
    OpenParenthesis,
    CloseParenthesis,
    OpenSquareBracket,
    CloseSquareBracket,
    OpenBracket,
    CloseBracket,
    DoubleQuote,
    SingleQuote,
    BackQuote,
    TripleDoubleQuote,
    Dollar,

    // ========== Escaped characters ==========
    EscDoubleQuote,
    EscSingleQuote,
    EscBackslash,
    EscNewline,
    EscTab,
    EscWhitespace,
    EscOpenSquareBracket,
    EscOpenBracket,
    EscPercent,

    // ========== Meta ==========
    Comment,
    /// Secondary classification of every token inside a string range.
    StringLiteral,
    /// Secondary classification of every token inside a `$` python line.
    PythonLine,

    // ========== Sentinels ==========
    /// Text no pattern matched.
    Unknown,
    /// Placeholder for "no token" (before the first token, past the last one).
    Invalid,
}

/// Category ranges of [`TokenType`], in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Keyword,
    Entity,
    Constant,
    Operator,
    Character,
    EscapedCharacter,
    Meta,
    Unknown,
}

/// Range boundaries of the [`TokenType`] layout.
///
/// Each constant is the discriminant of the first variant of its category; a category spans up to (not including)
/// the next constant.
pub mod boundaries {
    use super::TokenType;

    pub const KEYWORD_START: u16 = TokenType::Label as u16;
    pub const ENTITY_START: u16 = TokenType::Identifier as u16;
    pub const CONSTANT_START: u16 = TokenType::Integer as u16;
    pub const OPERATOR_START: u16 = TokenType::Assign as u16;
    pub const CHARACTER_START: u16 = TokenType::Whitespace as u16;
    pub const ESCAPED_CHARACTER_START: u16 = TokenType::EscDoubleQuote as u16;
    pub const META_START: u16 = TokenType::Comment as u16;
    pub const UNKNOWN_START: u16 = TokenType::Unknown as u16;
    /// One past the last discriminant.
    pub const END: u16 = TokenType::Invalid as u16 + 1;
}

impl TokenType {
    /// Every token type, in discriminant order.
    pub const ALL: &'static [TokenType] = &[
        TokenType::Label,
        TokenType::Jump,
        TokenType::Call,
        TokenType::Return,
        TokenType::Pass,
        TokenType::Define,
        TokenType::Default,
        TokenType::Init,
        TokenType::Python,
        TokenType::Menu,
        TokenType::If,
        TokenType::Elif,
        TokenType::Else,
        TokenType::While,
        TokenType::For,
        TokenType::Scene,
        TokenType::Show,
        TokenType::Hide,
        TokenType::With,
        TokenType::At,
        TokenType::As,
        TokenType::Behind,
        TokenType::Onlayer,
        TokenType::Zorder,
        TokenType::Expression,
        TokenType::From,
        TokenType::Pause,
        TokenType::Image,
        TokenType::Screen,
        TokenType::Transform,
        TokenType::Play,
        TokenType::Stop,
        TokenType::Queue,
        TokenType::Voice,
        TokenType::Nvl,
        TokenType::Window,
        TokenType::Style,
        TokenType::Translate,
        TokenType::In,
        TokenType::Not,
        TokenType::And,
        TokenType::Or,
        TokenType::Is,
        TokenType::Identifier,
        TokenType::TextTag,
        TokenType::Interpolation,
        TokenType::Integer,
        TokenType::Float,
        TokenType::Boolean,
        TokenType::Null,
        TokenType::String,
        TokenType::Assign,
        TokenType::PlusAssign,
        TokenType::MinusAssign,
        TokenType::MultiplyAssign,
        TokenType::DivideAssign,
        TokenType::Equals,
        TokenType::NotEquals,
        TokenType::LessThanOrEquals,
        TokenType::GreaterThanOrEquals,
        TokenType::FloorDivide,
        TokenType::Exponent,
        TokenType::Plus,
        TokenType::Minus,
        TokenType::Multiply,
        TokenType::Divide,
        TokenType::Modulo,
        TokenType::LessThan,
        TokenType::GreaterThan,
        TokenType::Whitespace,
        TokenType::NewLine,
        TokenType::Colon,
        TokenType::Comma,
        TokenType::Period,
        TokenType::OpenParenthesis,
        TokenType::CloseParenthesis,
        TokenType::OpenSquareBracket,
        TokenType::CloseSquareBracket,
        TokenType::OpenBracket,
        TokenType::CloseBracket,
        TokenType::DoubleQuote,
        TokenType::SingleQuote,
        TokenType::BackQuote,
        TokenType::TripleDoubleQuote,
        TokenType::Dollar,
        TokenType::EscDoubleQuote,
        TokenType::EscSingleQuote,
        TokenType::EscBackslash,
        TokenType::EscNewline,
        TokenType::EscTab,
        TokenType::EscWhitespace,
        TokenType::EscOpenSquareBracket,
        TokenType::EscOpenBracket,
        TokenType::EscPercent,
        TokenType::Comment,
        TokenType::StringLiteral,
        TokenType::PythonLine,
        TokenType::Unknown,
        TokenType::Invalid,
    ];

    /// Numeric discriminant.
    pub const fn index(self) -> u16 {
        self as u16
    }

    /// Look up a token type by discriminant.
    pub fn from_index(index: u16) -> Option<TokenType> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Classify by range membership.
    pub const fn category(self) -> TokenCategory {
        use boundaries::*;

        let id = self as u16;
        if id < ENTITY_START {
            TokenCategory::Keyword
        } else if id < CONSTANT_START {
            TokenCategory::Entity
        } else if id < OPERATOR_START {
            TokenCategory::Constant
        } else if id < CHARACTER_START {
            TokenCategory::Operator
        } else if id < ESCAPED_CHARACTER_START {
            TokenCategory::Character
        } else if id < META_START {
            TokenCategory::EscapedCharacter
        } else if id < UNKNOWN_START {
            TokenCategory::Meta
        } else {
            TokenCategory::Unknown
        }
    }

    pub const fn is_keyword(self) -> bool {
        matches!(self.category(), TokenCategory::Keyword)
    }

    pub const fn is_entity(self) -> bool {
        matches!(self.category(), TokenCategory::Entity)
    }

    pub const fn is_constant(self) -> bool {
        matches!(self.category(), TokenCategory::Constant)
    }

    pub const fn is_operator(self) -> bool {
        matches!(self.category(), TokenCategory::Operator)
    }

    pub const fn is_character(self) -> bool {
        matches!(self.category(), TokenCategory::Character)
    }

    pub const fn is_escaped_character(self) -> bool {
        matches!(self.category(), TokenCategory::EscapedCharacter)
    }

    pub const fn is_meta(self) -> bool {
        matches!(self.category(), TokenCategory::Meta)
    }

    /// `true` for both sentinels.
    pub const fn is_unknown(self) -> bool {
        matches!(self.category(), TokenCategory::Unknown)
    }

    pub const fn is_invalid(self) -> bool {
        matches!(self, TokenType::Invalid)
    }

    /// Stable display name.
    pub const fn name(self) -> &'static str {
        match self {
            TokenType::Label => "Label",
            TokenType::Jump => "Jump",
            TokenType::Call => "Call",
            TokenType::Return => "Return",
            TokenType::Pass => "Pass",
            TokenType::Define => "Define",
            TokenType::Default => "Default",
            TokenType::Init => "Init",
            TokenType::Python => "Python",
            TokenType::Menu => "Menu",
            TokenType::If => "If",
            TokenType::Elif => "Elif",
            TokenType::Else => "Else",
            TokenType::While => "While",
            TokenType::For => "For",
            TokenType::Scene => "Scene",
            TokenType::Show => "Show",
            TokenType::Hide => "Hide",
            TokenType::With => "With",
            TokenType::At => "At",
            TokenType::As => "As",
            TokenType::Behind => "Behind",
            TokenType::Onlayer => "Onlayer",
            TokenType::Zorder => "Zorder",
            TokenType::Expression => "Expression",
            TokenType::From => "From",
            TokenType::Pause => "Pause",
            TokenType::Image => "Image",
            TokenType::Screen => "Screen",
            TokenType::Transform => "Transform",
            TokenType::Play => "Play",
            TokenType::Stop => "Stop",
            TokenType::Queue => "Queue",
            TokenType::Voice => "Voice",
            TokenType::Nvl => "Nvl",
            TokenType::Window => "Window",
            TokenType::Style => "Style",
            TokenType::Translate => "Translate",
            TokenType::In => "In",
            TokenType::Not => "Not",
            TokenType::And => "And",
            TokenType::Or => "Or",
            TokenType::Is => "Is",
            TokenType::Identifier => "Identifier",
            TokenType::TextTag => "TextTag",
            TokenType::Interpolation => "Interpolation",
            TokenType::Integer => "Integer",
            TokenType::Float => "Float",
            TokenType::Boolean => "Boolean",
            TokenType::Null => "Null",
            TokenType::String => "String",
            TokenType::Assign => "Assign",
            TokenType::PlusAssign => "PlusAssign",
            TokenType::MinusAssign => "MinusAssign",
            TokenType::MultiplyAssign => "MultiplyAssign",
            TokenType::DivideAssign => "DivideAssign",
            TokenType::Equals => "Equals",
            TokenType::NotEquals => "NotEquals",
            TokenType::LessThanOrEquals => "LessThanOrEquals",
            TokenType::GreaterThanOrEquals => "GreaterThanOrEquals",
            TokenType::FloorDivide => "FloorDivide",
            TokenType::Exponent => "Exponent",
            TokenType::Plus => "Plus",
            TokenType::Minus => "Minus",
            TokenType::Multiply => "Multiply",
            TokenType::Divide => "Divide",
            TokenType::Modulo => "Modulo",
            TokenType::LessThan => "LessThan",
            TokenType::GreaterThan => "GreaterThan",
            TokenType::Whitespace => "Whitespace",
            TokenType::NewLine => "NewLine",
            TokenType::Colon => "Colon",
            TokenType::Comma => "Comma",
            TokenType::Period => "Period",
            TokenType::OpenParenthesis => "OpenParenthesis",
            TokenType::CloseParenthesis => "CloseParenthesis",
            TokenType::OpenSquareBracket => "OpenSquareBracket",
            TokenType::CloseSquareBracket => "CloseSquareBracket",
            TokenType::OpenBracket => "OpenBracket",
            TokenType::CloseBracket => "CloseBracket",
            TokenType::DoubleQuote => "DoubleQuote",
            TokenType::SingleQuote => "SingleQuote",
            TokenType::BackQuote => "BackQuote",
            TokenType::TripleDoubleQuote => "TripleDoubleQuote",
            TokenType::Dollar => "Dollar",
            TokenType::EscDoubleQuote => "EscDoubleQuote",
            TokenType::EscSingleQuote => "EscSingleQuote",
            TokenType::EscBackslash => "EscBackslash",
            TokenType::EscNewline => "EscNewline",
            TokenType::EscTab => "EscTab",
            TokenType::EscWhitespace => "EscWhitespace",
            TokenType::EscOpenSquareBracket => "EscOpenSquareBracket",
            TokenType::EscOpenBracket => "EscOpenBracket",
            TokenType::EscPercent => "EscPercent",
            TokenType::Comment => "Comment",
            TokenType::StringLiteral => "StringLiteral",
            TokenType::PythonLine => "PythonLine",
            TokenType::Unknown => "Unknown",
            TokenType::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
