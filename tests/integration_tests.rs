//! Integration tests for the Ren'Py front end
//!
//! These tests parse complete scripts end to end and check the program's statements, scopes, references and
//! errors together.

use std::sync::atomic::AtomicBool;

use rpy::ast::{MenuItem, Statement};
use rpy::diagnostics::{ParseErrorType, format_error};
use rpy::symbols::SymbolKind;
use rpy::{FrontendConfig, Program, find_definition, find_references, parse_document};
use rpy_syntax::document::{Position, TextDocument};

const THE_QUESTION: &str = r##"# The script of the game goes in this file.

define s = Character(_("Sylvie"), color="#c8ffc8")
define m = Character(_("Me"), color="#c8c8ff")

default book = False

label start:

    play music "illurock.opus"

    scene bg lecturehall
    with fade

    "It's only when I hear the sounds of shuffling feet and supplies being put away that I realize that the lecture's over."

    show sylvie green smile
    with dissolve

    s "Hi there! How was class?"

    m "Good..."

    menu:

        "As soon as she catches my eye, I decide..."

        "To ask her right away.":

            jump rightaway

        "To ask her later.":

            jump later


label rightaway:

    show sylvie green smile

    s "Sure, but what's a \"visual novel?\""

    menu:

        "It's a videogame.":
            jump game

        "It's an interactive book.":
            jump book

label game:

    m "It's a kind of videogame you can play on your computer or a console."

    jump marry

label book:

    $ book = True

    m "It's like an interactive book that you can read on a computer or a console."

    jump marry

label marry:

    scene black
    with dissolve

    "--- years later ---"

    if book:
        "Our first game is based on one of Sylvie's ideas, but afterwards I get to come up with stories of my own, too."

    "[s.name] and I made a great team."

    return

label later:

    "I can't get up the nerve to ask right away."

    return
"##;

async fn parse(source: &str) -> Program {
    let document = TextDocument::new("script.rpy", source);
    parse_document(&document).await.unwrap()
}

fn label_body<'p>(program: &'p Program, name: &str) -> &'p [Statement] {
    program
        .statements
        .iter()
        .find_map(|s| match s {
            Statement::Label(label) if label.name.name == name => Some(label.body.as_slice()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no label {name}"))
}

#[tokio::test]
async fn test_sample_game_parses_cleanly() {
    let program = parse(THE_QUESTION).await;
    let errors: Vec<_> = program.errors.iter().map(|e| e.to_string()).collect();
    assert!(errors.is_empty(), "{errors:#?}");

    let labels: Vec<_> = program
        .symbols
        .symbols()
        .iter()
        .filter(|s| s.kind == SymbolKind::Label)
        .map(|s| s.identifier.as_str())
        .collect();
    assert_eq!(labels, ["start", "rightaway", "game", "book", "marry", "later"]);

    let start = label_body(&program, "start");
    let kinds: Vec<_> = start.iter().map(Statement::kind_name).collect();
    assert_eq!(
        kinds,
        ["play", "scene", "with", "say", "show", "with", "say", "say", "menu"]
    );
    let Statement::Menu(menu) = &start[8] else {
        panic!("expected menu");
    };
    assert!(matches!(menu.items[0], MenuItem::Caption(_)));
    assert_eq!(menu.items.len(), 3);
}

#[tokio::test]
async fn test_sample_game_references() {
    let program = parse(THE_QUESTION).await;
    let global = program.global_scope();

    let marry = global.resolve_label("marry").unwrap();
    assert_eq!(marry.references.len(), 2);
    let later = global.resolve_label("later").unwrap();
    assert_eq!(later.references.len(), 1);

    // `book` is both a label and a variable; each namespace keeps its own references
    let book_label = global.resolve_label("book").unwrap();
    assert_eq!(book_label.kind, SymbolKind::Label);
    assert_eq!(book_label.references.len(), 1);
    let book_var = global.resolve("book").unwrap();
    assert_eq!(book_var.kind, SymbolKind::Variable);
    assert_eq!(book_var.references.len(), 2);

    // speakers and the `[s.name]` interpolation
    let sylvie = global.resolve("s").unwrap();
    assert_eq!(sylvie.references.len(), 3);
}

#[tokio::test]
async fn test_errors_do_not_stop_the_parse() {
    let source = "label start:\n    jump\n    define = 3\n    \"still parsed\"\nlabel start:\n    return\n";
    let program = parse(source).await;

    let kinds: Vec<_> = program
        .errors
        .iter()
        .map(|e| match e.parse_error() {
            Some(parse) => format!("{:?}", parse.error_type),
            None => "Duplicate".to_string(),
        })
        .collect();
    assert_eq!(kinds, ["UnexpectedToken", "UnexpectedToken", "Duplicate"]);

    let body = label_body(&program, "start");
    assert!(matches!(body.last(), Some(Statement::Say(_))));
    assert_eq!(program.statements.len(), 2);
}

#[tokio::test]
async fn test_diagnostic_rendering() {
    let source = "label start:\n    pass pass\n";
    let program = parse(source).await;
    assert_eq!(program.errors.len(), 1);
    let error = &program.errors[0];
    assert_eq!(
        error.parse_error().unwrap().error_type,
        ParseErrorType::UnexpectedEndOfLine
    );

    let rendered = format_error("script.rpy", source, error);
    assert!(rendered.contains("Unexpected end of line."), "{rendered}");
    assert!(rendered.contains("script.rpy"), "{rendered}");
}

#[tokio::test]
async fn test_crlf_script() {
    let program = parse("label start:\r\n    jump start\r\n").await;
    assert!(program.errors.is_empty());
    let start = program.global_scope().resolve_label("start").unwrap();
    assert_eq!(start.references[0].range.start.line, 1);
    assert_eq!(start.references[0].range.start.character, 9);
}

#[tokio::test]
async fn test_queries_over_sample_game() {
    let document = TextDocument::new("script.rpy", THE_QUESTION);
    let cancelled = AtomicBool::new(false);

    // `jump marry` inside label game
    let line = THE_QUESTION
        .lines()
        .position(|l| l.trim() == "jump marry")
        .unwrap();
    let definition = find_definition(
        &document,
        Position::new(line, 10, 0),
        &cancelled,
        FrontendConfig::default(),
    )
    .await
    .unwrap()
    .unwrap();
    let label_line = THE_QUESTION
        .lines()
        .position(|l| l == "label marry:")
        .unwrap();
    assert_eq!(definition.range.start.line, label_line);

    let references = find_references(
        &document,
        Position::new(label_line, 8, 0),
        &cancelled,
        FrontendConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(references.len(), 2);
}

#[tokio::test]
async fn test_concurrent_parses_are_isolated() {
    let a = TextDocument::new("a.rpy", "default x = 1\n");
    let b = TextDocument::new("b.rpy", "default x = 1\ndefault x = 2\n");
    let (pa, pb) = tokio::join!(parse_document(&a), parse_document(&b));
    let (pa, pb) = (pa.unwrap(), pb.unwrap());
    assert!(pa.errors.is_empty());
    assert_eq!(pb.errors.len(), 1);
    assert_eq!(pa.path(), std::path::Path::new("a.rpy"));
}
