//! Convert lexed declaration tokens into definition parts.

use std::collections::HashSet;

use crate::errors::{PatternError, placeholder_error};
use crate::hint::{ArgumentType, parse_type_hint};
use crate::token::StepTokenKind;
use crate::tokenizer::tokenise_statement;

use super::lexer::{Token, lex_declaration};
use super::{ArgumentPart, DeclarationPattern, DefinitionPart, WordPart};

enum Segment {
    Literal(String),
    Argument {
        name: String,
        hint: Option<ArgumentType>,
    },
}

/// Quote character that ends `text` with nothing after it.
fn tight_trailing_quote(text: &str) -> Option<char> {
    let tokenised = tokenise_statement(text);
    match tokenised.tokens().last() {
        Some(token) if token.end() == text.len() => match token.kind {
            StepTokenKind::Quote(q) => Some(q),
            _ => None,
        },
        _ => None,
    }
}

/// Quote character that starts `text` with nothing before it.
fn tight_leading_quote(text: &str) -> Option<char> {
    let tokenised = tokenise_statement(text);
    match tokenised.tokens().first() {
        Some(token) if token.start == 0 => match token.kind {
            StepTokenKind::Quote(q) => Some(q),
            _ => None,
        },
        _ => None,
    }
}

fn segments(declaration: &str) -> Result<Vec<Segment>, PatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut stray_depth = 0usize;
    let mut names = HashSet::new();

    for token in lex_declaration(declaration)? {
        match token {
            Token::Literal(text) => literal.push_str(&text),
            Token::OpenBrace { .. } => {
                stray_depth = stray_depth.saturating_add(1);
                literal.push('{');
            }
            Token::CloseBrace { index } => {
                if stray_depth == 0 {
                    return Err(placeholder_error(
                        "unmatched closing brace '}' in step declaration",
                        index,
                        None,
                    ));
                }
                stray_depth -= 1;
                literal.push('}');
            }
            Token::Placeholder { name, hint, .. } => {
                let hint = hint
                    .map(|raw| {
                        parse_type_hint(&raw).ok_or_else(|| PatternError::UnknownTypeHint {
                            placeholder: name.clone(),
                            hint: raw.clone(),
                        })
                    })
                    .transpose()?;
                if !names.insert(name.clone()) {
                    return Err(PatternError::DuplicateArgument(name));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Argument { name, hint });
            }
        }
    }

    if stray_depth != 0 {
        return Err(placeholder_error(
            "unbalanced braces in step declaration",
            declaration.len(),
            None,
        ));
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Compile declaration text into its ordered definition parts.
///
/// Literal text is tokenised with the statement tokenizer, one word part per
/// token. A placeholder wrapped tightly in matching quotes absorbs them.
pub(crate) fn compile(declaration: &str) -> Result<DeclarationPattern, PatternError> {
    let segments = segments(declaration)?;
    let mut parts = Vec::new();
    let mut open_quote: Option<char> = None;
    let mut strip_leading = false;
    let mut iter = segments.iter().peekable();

    while let Some(segment) = iter.next() {
        match segment {
            Segment::Literal(text) => {
                let tokenised = tokenise_statement(text);
                let skip = usize::from(strip_leading);
                let mut last_kept = None;
                for token in tokenised.tokens().iter().skip(skip) {
                    parts.push(DefinitionPart::Word(WordPart {
                        text: tokenised.token_text(token).to_string(),
                    }));
                    last_kept = Some(token);
                }
                open_quote = last_kept.and_then(|_| tight_trailing_quote(text));
                strip_leading = false;
            }
            Segment::Argument { name, hint } => {
                let close = match iter.peek() {
                    Some(Segment::Literal(next)) => tight_leading_quote(next),
                    _ => None,
                };
                let quote = match (open_quote, close) {
                    (Some(open), Some(close)) if open == close => Some(open),
                    _ => None,
                };
                if quote.is_some() {
                    parts.pop();
                }
                strip_leading = quote.is_some();
                open_quote = None;
                parts.push(DefinitionPart::Argument(ArgumentPart {
                    name: name.clone(),
                    hint: *hint,
                    quote,
                }));
            }
        }
    }

    if parts.is_empty() {
        return Err(PatternError::Empty);
    }
    Ok(DeclarationPattern {
        text: declaration.to_string(),
        parts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(declaration: &str) -> Vec<String> {
        match compile(declaration) {
            Ok(pattern) => pattern
                .parts()
                .iter()
                .map(|part| match part {
                    DefinitionPart::Word(word) => word.text.clone(),
                    DefinitionPart::Argument(arg) => match arg.quote {
                        Some(q) => format!("{q}{{{}}}{q}", arg.name),
                        None => format!("{{{}}}", arg.name),
                    },
                })
                .collect(),
            Err(err) => panic!("{declaration:?} should compile: {err}"),
        }
    }

    #[test]
    fn folds_tight_quotes_into_arguments() {
        assert_eq!(
            shape("I have passed '{arg}' to something"),
            vec!["I", "have", "passed", "'{arg}'", "to", "something"]
        );
    }

    #[test]
    fn leaves_loose_quotes_as_words() {
        assert_eq!(shape("say ' {x} '"), vec!["say", "'", "{x}", "'"]);
        assert_eq!(shape("say '{x}\""), vec!["say", "'", "{x}", "\""]);
    }

    #[test]
    fn shared_quote_folds_only_once() {
        assert_eq!(shape("'{a}'{b}'"), vec!["'{a}'", "{b}", "'"]);
    }

    #[test]
    fn stray_braces_become_text() {
        assert_eq!(shape("a { b }"), vec!["a", "{", "b", "}"]);
    }

    #[test]
    fn errors_on_unmatched_close() {
        let Err(err) = compile("broken}") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("unmatched closing brace"));
    }

    #[test]
    fn errors_on_unclosed_stray_brace() {
        let Err(err) = compile("broken { here") else {
            panic!("should fail");
        };
        assert!(err.to_string().contains("unbalanced braces"));
    }

    #[test]
    fn rejects_unknown_hints_and_duplicates() {
        assert_eq!(
            compile("on {day:date}").err(),
            Some(PatternError::UnknownTypeHint {
                placeholder: "day".into(),
                hint: "date".into(),
            })
        );
        assert_eq!(
            compile("{a} and {a}").err(),
            Some(PatternError::DuplicateArgument("a".into()))
        );
    }

    #[test]
    fn rejects_blank_declarations() {
        assert_eq!(compile("   ").err(), Some(PatternError::Empty));
        assert_eq!(compile("").err(), Some(PatternError::Empty));
    }
}
