#![no_main]

use libfuzzer_sys::fuzz_target;
use rpy::frontend::parser::parse_document;
use rpy_syntax::document::TextDocument;
use rpy_syntax::tokenizer::{RENPY_GRAMMAR, tokenize};

fuzz_target!(|data: &[u8]| {
    // Convert bytes to UTF-8 string (ignore invalid UTF-8)
    if let Ok(s) = std::str::from_utf8(data) {
        // Fuzz the tokenizer: every byte is covered by exactly one token
        let tokens = tokenize(s, &RENPY_GRAMMAR);
        let covered: usize = tokens.iter().map(|t| t.len()).sum();
        assert_eq!(covered, s.len());

        // Fuzz the parser: malformed input must only ever produce recorded errors
        let document = TextDocument::new("fuzz.rpy", s);
        let Ok(runtime) = tokio::runtime::Builder::new_current_thread().build() else {
            return;
        };
        let _ = runtime.block_on(parse_document(&document));
    }
});
