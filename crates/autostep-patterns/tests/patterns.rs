//! Behavioural tests for step pattern compilation.
#![expect(clippy::expect_used, reason = "tests assert compile paths")]

use autostep_patterns::{
    ArgumentType, DefinitionPart, PatternError, SpecificityScore, StepTokenKind,
    compile_declaration, tokenise_statement,
};

#[test]
fn declaration_words_match_reference_token_text() {
    let pattern = compile_declaration("I click the \"Save\" button, then wait")
        .expect("declaration should compile");
    let reference = tokenise_statement("I click the \"Save\" button, then wait");

    let words: Vec<&str> = pattern
        .parts()
        .iter()
        .filter_map(|part| match part {
            DefinitionPart::Word(word) => Some(word.text.as_str()),
            DefinitionPart::Argument(_) => None,
        })
        .collect();
    let tokens: Vec<&str> = reference
        .tokens()
        .iter()
        .map(|token| reference.token_text(token))
        .collect();
    assert_eq!(words, tokens);
}

#[test]
fn quoted_placeholder_carries_hint_and_quote() {
    let pattern =
        compile_declaration("I wait '{secs:decimal}' seconds").expect("declaration should compile");
    let arg = pattern.arguments().next().expect("one argument");
    assert_eq!(arg.name, "secs");
    assert_eq!(arg.hint, Some(ArgumentType::NumericDecimal));
    assert_eq!(arg.quote, Some('\''));
    assert_eq!(pattern.literal_count(), 3);
    assert_eq!(pattern.text(), "I wait '{secs:decimal}' seconds");
}

#[test]
fn escaped_characters_survive_compilation() {
    let pattern = compile_declaration(r"it\'s {thing}").expect("declaration should compile");
    let reference = tokenise_statement(r"it\'s here");
    let first_escape = reference
        .tokens()
        .iter()
        .find(|token| matches!(token.kind, StepTokenKind::EscapedChar('\'')))
        .expect("escape token");
    let Some(DefinitionPart::Word(word)) = pattern.parts().get(1) else {
        panic!("expected escape as second part");
    };
    assert_eq!(word.text, reference.token_text(first_escape));
}

#[test]
fn exposes_placeholder_error_details() {
    let Err(err) = compile_declaration("{value:}") else {
        panic!("expected placeholder error");
    };
    let PatternError::Placeholder(info) = err else {
        panic!("expected placeholder error, got {err}");
    };
    assert_eq!(info.placeholder.as_deref(), Some("value"));
    assert!(info.to_string().contains("value"));
}

#[test]
fn specificity_prefers_literal_declarations() {
    let mut scores = [
        SpecificityScore::calculate("{a} {b}").expect("valid"),
        SpecificityScore::calculate("I have {n:int} apples").expect("valid"),
        SpecificityScore::calculate("I have {n} apples").expect("valid"),
        SpecificityScore::calculate("I have many apples").expect("valid"),
    ];
    scores.sort();
    assert_eq!(
        scores.iter().map(|s| s.literal_parts).collect::<Vec<_>>(),
        vec![0, 3, 3, 4]
    );
    assert_eq!(scores.get(1).map(|s| s.typed_argument_count), Some(0));
}
