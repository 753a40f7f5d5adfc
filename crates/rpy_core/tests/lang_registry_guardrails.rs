use std::collections::{HashMap, HashSet};

use rpy_core::lang::keywords;
use rpy_core::lang::tokens::{TokenCategory, TokenType, boundaries};

#[test]
fn token_type_list_is_dense_and_ordered() {
    assert_eq!(TokenType::ALL.len(), usize::from(boundaries::END));
    for (i, ty) in TokenType::ALL.iter().enumerate() {
        assert_eq!(
            usize::from(ty.index()),
            i,
            "TokenType::ALL out of order at {:?}",
            ty
        );
    }
}

#[test]
fn every_token_type_belongs_to_exactly_one_category() {
    let predicates: [(TokenCategory, fn(TokenType) -> bool); 8] = [
        (TokenCategory::Keyword, TokenType::is_keyword),
        (TokenCategory::Entity, TokenType::is_entity),
        (TokenCategory::Constant, TokenType::is_constant),
        (TokenCategory::Operator, TokenType::is_operator),
        (TokenCategory::Character, TokenType::is_character),
        (TokenCategory::EscapedCharacter, TokenType::is_escaped_character),
        (TokenCategory::Meta, TokenType::is_meta),
        (TokenCategory::Unknown, TokenType::is_unknown),
    ];

    for &ty in TokenType::ALL {
        let hits: Vec<TokenCategory> = predicates
            .iter()
            .filter(|(_, pred)| pred(ty))
            .map(|(cat, _)| *cat)
            .collect();
        assert_eq!(hits, vec![ty.category()], "{:?} classified as {:?}", ty, hits);
    }
}

#[test]
fn categories_are_contiguous_and_non_empty() {
    let mut order: Vec<TokenCategory> = Vec::new();
    for &ty in TokenType::ALL {
        if order.last() != Some(&ty.category()) {
            assert!(
                !order.contains(&ty.category()),
                "category {:?} is split around {:?}",
                ty.category(),
                ty
            );
            order.push(ty.category());
        }
    }
    assert_eq!(
        order,
        vec![
            TokenCategory::Keyword,
            TokenCategory::Entity,
            TokenCategory::Constant,
            TokenCategory::Operator,
            TokenCategory::Character,
            TokenCategory::EscapedCharacter,
            TokenCategory::Meta,
            TokenCategory::Unknown,
        ]
    );
}

#[test]
fn token_names_are_unique() {
    let mut seen = HashSet::new();
    for &ty in TokenType::ALL {
        assert!(seen.insert(ty.name()), "duplicate token name {}", ty.name());
    }
}

#[test]
fn keywords_spellings_unique_and_resolvable() {
    let mut seen: HashMap<&'static str, TokenType> = HashMap::new();

    for info in keywords::KEYWORDS {
        assert!(info.token.is_keyword(), "{:?} registered outside the keyword range", info.token);
        assert_eq!(keywords::from_str(info.canonical), Some(info.token));
        assert_eq!(keywords::as_str(info.token), Some(info.canonical));

        if let Some(prev) = seen.insert(info.canonical, info.token) {
            panic!("duplicate keyword spelling {:?}: {:?} and {:?}", info.canonical, prev, info.token);
        }
    }
}

#[test]
fn every_keyword_token_type_is_registered() {
    for &ty in TokenType::ALL.iter().filter(|t| t.is_keyword()) {
        assert!(keywords::info_for(ty).is_some(), "keyword {:?} missing from KEYWORDS", ty);
    }
}
