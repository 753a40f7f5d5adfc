//! Composable grammar rules and the statement rule table.

use rpy_core::lang::tokens::TokenType;

use super::DocumentParser;
use crate::frontend::ast::{Statement, StringLiteral};
use crate::frontend::diagnostics::ParseErrorType;

/// A composable unit of grammar.
///
/// ## Notes
/// - `test` inspects the lookahead only and must not move the cursor.
/// - `parse` may consume tokens, record errors and return `None`; it never unwinds.
pub trait GrammarRule {
    type Output;

    fn test(&self, parser: &DocumentParser<'_>) -> bool;

    fn parse(&self, parser: &mut DocumentParser<'_>) -> Option<Self::Output>;
}

impl<'a> DocumentParser<'a> {
    /// Parse `rule` if its test passes. Records nothing when it does not.
    pub fn optional<R: GrammarRule + ?Sized>(&mut self, rule: &R) -> Option<R::Output> {
        if !rule.test(self) {
            return None;
        }
        rule.parse(self)
    }

    /// Parse `rule` without testing it first. Failures are whatever the rule's `parse` records.
    pub fn require<R: GrammarRule + ?Sized>(&mut self, rule: &R) -> Option<R::Output> {
        rule.parse(self)
    }

    /// Parse the first rule whose test passes, recording an unexpected end of line when none does.
    pub fn any_of<T>(&mut self, rules: &[&dyn GrammarRule<Output = T>]) -> Option<T> {
        match rules.iter().find(|rule| rule.test(self)) {
            Some(rule) => rule.parse(self),
            None => {
                self.add_error(ParseErrorType::UnexpectedEndOfLine, None);
                None
            }
        }
    }
}

macro_rules! keyword_rule {
    ($rule:ident, [$($keyword:ident),+], $method:ident) => {
        struct $rule;

        impl GrammarRule for $rule {
            type Output = Statement;

            fn test(&self, parser: &DocumentParser<'_>) -> bool {
                $(parser.test(TokenType::$keyword))||+
            }

            fn parse(&self, parser: &mut DocumentParser<'_>) -> Option<Statement> {
                parser.$method()
            }
        }
    };
}

keyword_rule!(LabelRule, [Label], label_statement);
keyword_rule!(JumpRule, [Jump], jump_statement);
keyword_rule!(CallRule, [Call], call_statement);
keyword_rule!(ReturnRule, [Return], return_statement);
keyword_rule!(PassRule, [Pass], pass_statement);
keyword_rule!(DefineRule, [Define, Default], define_statement);
keyword_rule!(PythonLineRule, [Dollar], python_line_statement);
keyword_rule!(IfRule, [If], if_statement);
keyword_rule!(WhileRule, [While], while_statement);
keyword_rule!(MenuRule, [Menu], menu_statement);
keyword_rule!(ImageRule, [Scene, Show, Hide], image_statement);
keyword_rule!(WithRule, [With], with_statement);
keyword_rule!(PauseRule, [Pause], pause_statement);
keyword_rule!(InitRule, [Init], init_statement);
keyword_rule!(PythonBlockRule, [Python], python_block_statement);
keyword_rule!(
    OtherRule,
    [Image, Screen, Transform, Play, Stop, Queue, Voice, Nvl, Window, Style, Translate],
    other_statement
);

/// `who "what"` or a bare `"what"`
struct SayRule;

impl GrammarRule for SayRule {
    type Output = Statement;

    fn test(&self, parser: &DocumentParser<'_>) -> bool {
        parser.test(TokenType::StringLiteral) || parser.say_follows()
    }

    fn parse(&self, parser: &mut DocumentParser<'_>) -> Option<Statement> {
        parser.say_statement().map(Statement::Say)
    }
}

pub(super) struct StringRule;

impl GrammarRule for StringRule {
    type Output = StringLiteral;

    fn test(&self, parser: &DocumentParser<'_>) -> bool {
        parser.test(TokenType::StringLiteral)
    }

    fn parse(&self, parser: &mut DocumentParser<'_>) -> Option<StringLiteral> {
        parser.string_literal()
    }
}

/// Statement rules, tried in order
pub(super) const STATEMENT_RULES: &[&dyn GrammarRule<Output = Statement>] = &[
    &LabelRule,
    &JumpRule,
    &CallRule,
    &ReturnRule,
    &PassRule,
    &DefineRule,
    &PythonLineRule,
    &IfRule,
    &WhileRule,
    &MenuRule,
    &ImageRule,
    &WithRule,
    &PauseRule,
    &InitRule,
    &PythonBlockRule,
    &OtherRule,
    &SayRule,
];
