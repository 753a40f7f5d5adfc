//! Abstract syntax tree for the supported Ren'Py statement subset
//!
//! Expressions are not evaluated or structured: an [`Expression`] keeps its source range, its text and the
//! identifiers it mentions, which is what definition and reference queries need.

use rpy_core::lang::tokens::TokenType;
use rpy_syntax::document::DocumentRange;

use crate::frontend::symbols::{ScopeId, SymbolId};

/// A name as written in source, possibly dotted (`config.name`, `start.loop`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub range: DocumentRange,
}

/// An unevaluated expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub text: String,
    pub range: DocumentRange,
    /// Root identifiers referenced by the expression, in source order
    pub identifiers: Vec<Identifier>,
}

/// A string literal, delimiters included in `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Body text between the delimiters, escapes left as written
    pub text: String,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Label(LabelStatement),
    Jump(JumpStatement),
    Call(CallStatement),
    Return(ReturnStatement),
    Pass(DocumentRange),
    Define(DefineStatement),
    PythonLine(PythonLineStatement),
    If(IfStatement),
    While(WhileStatement),
    Menu(MenuStatement),
    Image(ImageStatement),
    With(WithStatement),
    Pause(PauseStatement),
    Init(InitStatement),
    PythonBlock(PythonBlockStatement),
    Say(SayStatement),
    /// A recognised statement whose contents are not modelled (`image`, `screen`, `play`, ...)
    Other(OtherStatement),
}

impl Statement {
    pub fn range(&self) -> DocumentRange {
        match self {
            Statement::Label(s) => s.range,
            Statement::Jump(s) => s.range,
            Statement::Call(s) => s.range,
            Statement::Return(s) => s.range,
            Statement::Pass(range) => *range,
            Statement::Define(s) => s.range,
            Statement::PythonLine(s) => s.range,
            Statement::If(s) => s.range,
            Statement::While(s) => s.range,
            Statement::Menu(s) => s.range,
            Statement::Image(s) => s.range,
            Statement::With(s) => s.range,
            Statement::Pause(s) => s.range,
            Statement::Init(s) => s.range,
            Statement::PythonBlock(s) => s.range,
            Statement::Say(s) => s.range,
            Statement::Other(s) => s.range,
        }
    }

    /// Short lowercase name used in dumps
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Label(_) => "label",
            Statement::Jump(_) => "jump",
            Statement::Call(_) => "call",
            Statement::Return(_) => "return",
            Statement::Pass(_) => "pass",
            Statement::Define(s) => match s.kind {
                DefineKind::Define => "define",
                DefineKind::Default => "default",
            },
            Statement::PythonLine(_) => "python line",
            Statement::If(_) => "if",
            Statement::While(_) => "while",
            Statement::Menu(_) => "menu",
            Statement::Image(s) => match s.command {
                ImageCommand::Scene => "scene",
                ImageCommand::Show => "show",
                ImageCommand::Hide => "hide",
            },
            Statement::With(_) => "with",
            Statement::Pause(_) => "pause",
            Statement::Init(_) => "init",
            Statement::PythonBlock(_) => "python",
            Statement::Say(_) => "say",
            Statement::Other(s) => rpy_core::lang::keywords::as_str(s.keyword).unwrap_or("statement"),
        }
    }

    /// Nested statement blocks, in source order
    pub fn children(&self) -> Vec<&[Statement]> {
        match self {
            Statement::Label(s) => vec![&s.body],
            Statement::If(s) => s.branches.iter().map(|b| b.body.as_slice()).collect(),
            Statement::While(s) => vec![&s.body],
            Statement::Menu(s) => s
                .items
                .iter()
                .filter_map(|item| match item {
                    MenuItem::Choice(choice) => Some(choice.body.as_slice()),
                    MenuItem::Caption(_) => None,
                })
                .collect(),
            Statement::Init(s) => vec![&s.body],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStatement {
    /// Full label name; local labels are stored as `global.local`
    pub name: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Vec<Statement>,
    /// `None` when the definition was rejected
    pub symbol: Option<SymbolId>,
    pub scope: ScopeId,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JumpTarget {
    Label(Identifier),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpStatement {
    pub target: JumpTarget,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    pub target: JumpTarget,
    pub arguments: Option<Expression>,
    /// `from name` return-site label
    pub from: Option<Identifier>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineKind {
    Define,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefineStatement {
    pub kind: DefineKind,
    pub priority: Option<Expression>,
    pub name: Identifier,
    pub value: Option<Expression>,
    pub symbol: Option<SymbolId>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PythonLineStatement {
    pub code: Expression,
    pub range: DocumentRange,
}

/// One `if`/`elif`/`else` arm; `condition` is `None` for `else`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalBlock {
    pub condition: Option<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub branches: Vec<ConditionalBlock>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Vec<Statement>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuChoice {
    pub caption: StringLiteral,
    pub condition: Option<Expression>,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    /// A say statement shown while the menu is up
    Caption(SayStatement),
    Choice(MenuChoice),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuStatement {
    pub name: Option<Identifier>,
    pub items: Vec<MenuItem>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageCommand {
    Scene,
    Show,
    Hide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageStatement {
    pub command: ImageCommand,
    /// Space separated image name components (`eileen happy`)
    pub image: Vec<Identifier>,
    /// `show expression <expr>` form
    pub expression: Option<Expression>,
    /// Trailing `at`/`as`/`behind`/`onlayer`/`zorder`/`with` clauses, unparsed
    pub clauses: Option<Expression>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    pub transition: Expression,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PauseStatement {
    pub duration: Option<Expression>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitStatement {
    pub priority: Option<Expression>,
    /// `init python:` blocks hold raw python and have an empty body
    pub python: bool,
    pub body: Vec<Statement>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PythonBlockStatement {
    /// `early` / `hide` / `in store` modifiers, unparsed
    pub modifiers: Option<Expression>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SayStatement {
    pub who: Option<Identifier>,
    pub what: StringLiteral,
    /// Trailing arguments such as `with vpunch`, unparsed
    pub clauses: Option<Expression>,
    pub range: DocumentRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OtherStatement {
    pub keyword: TokenType,
    /// Rest of the header line
    pub rest: Option<Expression>,
    /// Whether a raw block (screen language, ATL, ...) followed and was skipped
    pub has_block: bool,
    pub range: DocumentRange,
}
