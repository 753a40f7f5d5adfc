//! Parser unit tests.

use rpy_core::lang::tokens::TokenType;

use super::*;
use crate::frontend::ast::*;
use crate::frontend::diagnostics::ParseErrorType;

async fn parse_str(source: &str) -> Program {
    let document = TextDocument::new("script.rpy", source);
    parse_document(&document).await.unwrap()
}

fn messages(program: &Program) -> Vec<String> {
    program.errors.iter().map(|e| e.headline().to_string()).collect()
}

async fn primed(document: &TextDocument) -> DocumentParser<'_> {
    let mut parser = DocumentParser::new(document);
    parser.initialize().await.unwrap();
    parser
}

// ========================================
// Cursor primitives
// ========================================

#[tokio::test]
async fn test_initialize_primes_lookahead() {
    let document = TextDocument::new("script.rpy", "  # comment\nlabel start:\n");
    let parser = primed(&document).await;

    assert!(parser.current().is(TokenType::Invalid));
    // whitespace and comments are filtered, the leading newline is not
    assert!(parser.peek().is(TokenType::NewLine));
    assert_eq!(parser.peek_nth(1).token_type, TokenType::Label);
    assert_eq!(parser.peek_nth(2).token_type, TokenType::Identifier);
}

#[tokio::test]
async fn test_initialize_twice_is_an_error() {
    let document = TextDocument::new("script.rpy", "pass\n");
    let mut parser = DocumentParser::new(&document);
    parser.initialize().await.unwrap();
    assert!(matches!(parser.initialize().await, Err(ParserError::AlreadyInitialized)));
}

#[test]
fn test_parse_before_initialize_is_an_error() {
    let document = TextDocument::new("script.rpy", "pass\n");
    let parser = DocumentParser::new(&document);
    assert!(matches!(parser.parse(), Err(ParserError::NotInitialized)));
}

#[tokio::test]
async fn test_require_token_failure_consumes_nothing() {
    let document = TextDocument::new("script.rpy", "label start:\n");
    let mut parser = primed(&document).await;

    assert!(!parser.require_token(TokenType::Jump));
    assert!(parser.peek().is(TokenType::Label));
    assert!(parser.current().is(TokenType::Invalid));
    assert_eq!(parser.errors().len(), 1);

    let error = parser.errors()[0].parse_error().unwrap();
    assert_eq!(error.error_type, ParseErrorType::UnexpectedToken);
    assert_eq!(error.expected, Some(TokenType::Jump));
    assert!(parser.errors()[0].message.starts_with("Expected token of type 'Jump', but got 'Label'"));
}

#[tokio::test]
async fn test_optional_and_any_of_token() {
    let document = TextDocument::new("script.rpy", "jump start\n");
    let mut parser = primed(&document).await;

    assert!(!parser.optional_token(TokenType::Call));
    assert!(parser.errors().is_empty());
    assert!(parser.any_of_token(&[TokenType::Call, TokenType::Jump]));
    assert!(parser.current().is(TokenType::Jump));
    assert_eq!(parser.current_value(), "jump");

    assert!(!parser.any_of_token(&[TokenType::Colon]));
    let error = parser.errors()[0].parse_error().unwrap();
    assert_eq!(error.expected, None);
    assert!(parser.errors()[0].message.starts_with("Expected token of type 'None', but got 'Identifier'"));
}

#[tokio::test]
async fn test_expect_eol_reports_once_and_stops_at_newline() {
    let document = TextDocument::new("script.rpy", "pass a b c\npass\n");
    let mut parser = primed(&document).await;

    parser.next();
    assert!(parser.expect_eol());
    assert!(parser.peek().is(TokenType::NewLine));
    assert_eq!(parser.errors().len(), 1);
    assert_eq!(
        parser.errors()[0].message,
        "Unexpected end of line.\n\tat: L1:C6"
    );
}

#[tokio::test]
async fn test_next_at_end_of_input_records_eof() {
    let document = TextDocument::new("script.rpy", "pass");
    let mut parser = primed(&document).await;

    parser.next();
    assert!(!parser.has_next());
    parser.next();
    assert!(parser.current().is(TokenType::Pass));
    assert_eq!(parser.errors().len(), 1);
    assert_eq!(parser.errors()[0].message, "Unexpected end of file");
    // end of input counts as end of line
    assert!(!parser.expect_eol());
    assert_eq!(parser.errors().len(), 1);
}

#[tokio::test]
async fn test_test_matches_meta() {
    let document = TextDocument::new("script.rpy", "\"hi\"\n");
    let parser = primed(&document).await;
    assert!(parser.test(TokenType::DoubleQuote));
    assert!(parser.test(TokenType::StringLiteral));
    assert!(!parser.test(TokenType::String));
    assert!(parser.test_value("\""));
}

#[tokio::test]
async fn test_rule_combinators() {
    let document = TextDocument::new("script.rpy", "\"caption\" pass\n");
    let mut parser = primed(&document).await;

    let string = parser.optional(&rules::StringRule).unwrap();
    assert_eq!(string.text, "caption");
    assert!(parser.optional(&rules::StringRule).is_none());
    assert!(parser.errors().is_empty());

    // the failure comes from the string rule's own parse, which consumes nothing
    assert!(parser.require(&rules::StringRule).is_none());
    assert_eq!(parser.errors().len(), 1);
    assert_eq!(
        parser.errors()[0].parse_error().unwrap().expected,
        Some(TokenType::StringLiteral)
    );
    assert!(parser.peek().is(TokenType::Pass));

    let empty: &[&dyn GrammarRule<Output = StringLiteral>] = &[];
    assert!(parser.any_of(empty).is_none());
    assert_eq!(
        parser.errors()[1].parse_error().unwrap().error_type,
        ParseErrorType::UnexpectedEndOfLine
    );
}

/// A rule whose test never passes but whose parse always succeeds.
struct Seven;

impl GrammarRule for Seven {
    type Output = u32;

    fn test(&self, _parser: &DocumentParser<'_>) -> bool {
        false
    }

    fn parse(&self, _parser: &mut DocumentParser<'_>) -> Option<u32> {
        Some(7)
    }
}

#[tokio::test]
async fn test_require_parses_without_testing() {
    let document = TextDocument::new("script.rpy", "pass\n");
    let mut parser = primed(&document).await;

    assert_eq!(parser.optional(&Seven), None);
    assert_eq!(parser.require(&Seven), Some(7));
    assert!(parser.errors().is_empty());
    assert!(parser.peek().is(TokenType::Pass));
}

// ========================================
// Labels and references
// ========================================

#[tokio::test]
async fn test_jump_references_label() {
    let program = parse_str("label start:\n    jump start\n").await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let start = program.global_scope().resolve_label("start").unwrap();
    assert_eq!(start.references.len(), 1);
    let reference = &start.references[0];
    assert_eq!(reference.range.start.line, 1);
    assert_eq!(reference.range.start.character, 9);
    assert_eq!(start.definition_location.range.start.character, 6);
}

#[tokio::test]
async fn test_forward_references_resolve() {
    let source = "label start:\n    call ending\n    return\n\nlabel ending:\n    return\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let ending = program.global_scope().resolve_label("ending").unwrap();
    assert_eq!(ending.references.len(), 1);
    assert_eq!(ending.references[0].range.start.line, 1);
}

#[tokio::test]
async fn test_unresolved_references_are_dropped() {
    let program = parse_str("label start:\n    jump nowhere\n").await;
    assert!(program.errors.is_empty());
    assert!(program.global_scope().resolve_label("nowhere").is_none());
}

#[tokio::test]
async fn test_duplicate_label() {
    let program = parse_str("label a:\n    pass\nlabel a:\n    pass\n").await;
    assert_eq!(program.errors.len(), 1);
    let dup = program.errors[0].duplicate_definition_error().unwrap();
    assert_eq!(dup.duplicate.identifier, "a");
    assert_eq!(dup.location.range.start.line, 2);
    assert_eq!(program.statements.len(), 2);
}

#[tokio::test]
async fn test_local_labels() {
    let source = "label start:\n    label .loop:\n        jump .loop\n    jump start.loop\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let local = program.global_scope().resolve_label("start.loop").unwrap();
    assert_eq!(local.references.len(), 2);
    let Statement::Label(start) = &program.statements[0] else {
        panic!("expected label");
    };
    let Statement::Label(inner) = &start.body[0] else {
        panic!("expected nested label");
    };
    assert_eq!(inner.name.name, "start.loop");
}

#[tokio::test]
async fn test_local_label_without_global_is_an_error() {
    let program = parse_str("label .orphan:\n    pass\n").await;
    assert_eq!(program.errors.len(), 1);
    assert_eq!(
        program.errors[0].parse_error().unwrap().error_type,
        ParseErrorType::UnexpectedToken
    );
    assert!(program.global_scope().resolve_label(".orphan").is_none());
}

#[tokio::test]
async fn test_label_parameters_are_scoped() {
    let source = "define name = 1\nlabel greet(name, times=2):\n    \"Hello [name]\"\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let Statement::Label(label) = &program.statements[1] else {
        panic!("expected label");
    };
    let names: Vec<_> = label.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["name", "times"]);

    // the interpolation resolves to the parameter, shadowing the global
    let parameter = program.scope(label.scope).resolve("name").unwrap();
    assert_eq!(parameter.kind, crate::frontend::symbols::SymbolKind::Parameter);
    assert_eq!(parameter.references.len(), 1);
    assert!(program.global_scope().resolve("name").unwrap().references.is_empty());
}

#[tokio::test]
async fn test_label_and_variable_may_share_a_name() {
    let program = parse_str("default start = 0\nlabel start:\n    pass\n").await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));
}

#[tokio::test]
async fn test_call_from_defines_label() {
    let program = parse_str("label start:\n    call sub from _call_sub_1\nlabel sub:\n    return\n").await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));
    assert!(program.global_scope().resolve_label("_call_sub_1").is_some());
}

// ========================================
// Definitions
// ========================================

#[tokio::test]
async fn test_duplicate_default() {
    let program = parse_str("default x = 1\ndefault x = 2\n").await;
    assert_eq!(program.errors.len(), 1);
    let dup = program.errors[0].duplicate_definition_error().unwrap();
    let first = program.global_scope().resolve("x").unwrap();
    assert_eq!(first.definition_location.range.start.line, 0);
    assert_eq!(dup.location.range.start.line, 1);
    assert_eq!(
        program.errors[0].message,
        "A symbol with the identifier \"x\" has already been defined."
    );
}

#[tokio::test]
async fn test_define_with_priority_and_dotted_name() {
    let program = parse_str("define -2 config.window = \"auto\"\n").await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));
    let Statement::Define(define) = &program.statements[0] else {
        panic!("expected define");
    };
    assert_eq!(define.kind, DefineKind::Define);
    assert_eq!(define.priority.as_ref().unwrap().text, "-2");
    assert_eq!(define.name.name, "config.window");
    assert_eq!(define.value.as_ref().unwrap().text, "\"auto\"");
}

#[tokio::test]
async fn test_define_without_value_is_an_error() {
    let program = parse_str("define x =\n").await;
    assert_eq!(program.errors.len(), 1);
    assert_eq!(
        program.errors[0].parse_error().unwrap().error_type,
        ParseErrorType::UnexpectedToken
    );
}

#[tokio::test]
async fn test_expression_references() {
    let source = "define e = Character(\"Eileen\", color=\"#fff\")\ndefault points = 0\nlabel start:\n    $ points += e.size\n    e \"You have [points] points.\"\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let e = program.global_scope().resolve("e").unwrap();
    assert_eq!(e.references.len(), 2);
    let points = program.global_scope().resolve("points").unwrap();
    assert_eq!(points.references.len(), 2);
}

// ========================================
// Statements and blocks
// ========================================

#[tokio::test]
async fn test_if_elif_else() {
    let source = "label start:\n    if x:\n        pass\n    elif y > 1:\n        pass\n    else:\n        return\n    \"after\"\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let Statement::Label(label) = &program.statements[0] else {
        panic!("expected label");
    };
    assert_eq!(label.body.len(), 2);
    let Statement::If(branches) = &label.body[0] else {
        panic!("expected if");
    };
    assert_eq!(branches.branches.len(), 3);
    assert_eq!(branches.branches[1].condition.as_ref().unwrap().text, "y > 1");
    assert!(branches.branches[2].condition.is_none());
    assert!(matches!(label.body[1], Statement::Say(_)));
}

#[tokio::test]
async fn test_menu() {
    let source = "label start:\n    menu choose:\n        e \"Pick one.\"\n        \"Left\" if brave:\n            jump left\n        \"Right\":\n            pass\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let Statement::Label(label) = &program.statements[0] else {
        panic!("expected label");
    };
    let Statement::Menu(menu) = &label.body[0] else {
        panic!("expected menu");
    };
    assert_eq!(menu.name.as_ref().unwrap().name, "choose");
    assert_eq!(menu.items.len(), 3);
    assert!(matches!(&menu.items[0], MenuItem::Caption(say) if say.who.as_ref().unwrap().name == "e"));
    let MenuItem::Choice(left) = &menu.items[1] else {
        panic!("expected choice");
    };
    assert_eq!(left.caption.text, "Left");
    assert_eq!(left.condition.as_ref().unwrap().text, "brave");
    assert_eq!(left.body.len(), 1);
    assert!(program.global_scope().resolve_label("choose").is_some());
}

#[tokio::test]
async fn test_scene_show_hide_with() {
    let source = "label start:\n    scene bg room\n    show eileen happy at left with dissolve\n    show expression \"x.png\" as x\n    hide eileen\n    with fade\n    pause 1.0\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let Statement::Label(label) = &program.statements[0] else {
        panic!("expected label");
    };
    let kinds: Vec<_> = label.body.iter().map(Statement::kind_name).collect();
    assert_eq!(kinds, ["scene", "show", "show", "hide", "with", "pause"]);

    let Statement::Image(show) = &label.body[1] else {
        panic!("expected show");
    };
    let image: Vec<_> = show.image.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(image, ["eileen", "happy"]);
    assert_eq!(show.clauses.as_ref().unwrap().text, "at left with dissolve");

    let Statement::Image(expression) = &label.body[2] else {
        panic!("expected show expression");
    };
    assert_eq!(expression.expression.as_ref().unwrap().text, "\"x.png\"");
}

#[tokio::test]
async fn test_python_blocks_are_skipped() {
    let source = "init python:\n    def f(x):\n        return x\n\n    y = f(1)\npython early hide:\n    z = 2\nlabel start:\n    pass\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let kinds: Vec<_> = program.statements.iter().map(Statement::kind_name).collect();
    assert_eq!(kinds, ["init", "python", "label"]);
    let Statement::Init(init) = &program.statements[0] else {
        panic!("expected init");
    };
    assert!(init.python);
    let Statement::PythonBlock(python) = &program.statements[1] else {
        panic!("expected python");
    };
    assert_eq!(python.modifiers.as_ref().unwrap().text, "early hide");
}

#[tokio::test]
async fn test_init_block_and_other_statements() {
    let source = "init 5:\n    define a = 1\nimage bg = \"bg.png\"\nscreen main():\n    text \"hi\"\nlabel start:\n    play music \"theme.ogg\"\n";
    let program = parse_str(source).await;
    assert!(program.errors.is_empty(), "{:?}", messages(&program));

    let Statement::Init(init) = &program.statements[0] else {
        panic!("expected init");
    };
    assert_eq!(init.priority.as_ref().unwrap().text, "5");
    assert_eq!(init.body.len(), 1);
    let Statement::Other(screen) = &program.statements[2] else {
        panic!("expected screen");
    };
    assert!(screen.has_block);
    assert_eq!(program.statements[2].kind_name(), "screen");
    assert_eq!(program.statements.len(), 4);
}

// ========================================
// Recovery
// ========================================

#[tokio::test]
async fn test_unknown_statement_recovers_at_next_line() {
    let program = parse_str("label start:\n    = oops\n    jump start\n").await;
    assert_eq!(program.errors.len(), 1);
    assert_eq!(
        program.errors[0].parse_error().unwrap().error_type,
        ParseErrorType::UnexpectedEndOfLine
    );
    let start = program.global_scope().resolve_label("start").unwrap();
    assert_eq!(start.references.len(), 1);
}

#[tokio::test]
async fn test_truncated_label_at_end_of_file() {
    let program = parse_str("label").await;
    assert_eq!(program.errors.len(), 1);
    let error = program.errors[0].parse_error().unwrap();
    assert_eq!(error.expected, Some(TokenType::Identifier));
    assert!(error.next_token.is(TokenType::Invalid));
}

#[tokio::test]
async fn test_unterminated_string_runs_to_end() {
    let program = parse_str("\"never closed\njump x\n").await;
    let Statement::Say(say) = &program.statements[0] else {
        panic!("expected say");
    };
    assert_eq!(say.what.text, "never closed\njump x\n");
    assert_eq!(program.statements.len(), 1);
}

#[tokio::test]
async fn test_empty_document() {
    let program = parse_str("").await;
    assert!(program.statements.is_empty());
    assert!(program.errors.is_empty());
    assert_eq!(program.symbols.scope_count(), 1);
}

#[tokio::test]
async fn test_dump_outline() {
    let program = parse_str("label start:\n    e \"Hi\"\n    jump start\n").await;
    insta::assert_snapshot!(program.dump(), @r#"
    label [L1:C1] start
      say [L2:C5] e "Hi"
      jump [L3:C5] start
    "#);
}
