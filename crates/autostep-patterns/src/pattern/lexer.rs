//! Declaration lexer splitting text into literal runs and placeholders.

use crate::errors::PatternError;

use super::placeholder::{PlaceholderSpec, parse_placeholder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Placeholder {
        start: usize,
        name: String,
        hint: Option<String>,
    },
    OpenBrace {
        index: usize,
    },
    CloseBrace {
        index: usize,
    },
}

/// Lex a declaration. Backslash escapes are kept verbatim in literal runs so
/// the statement tokenizer sees them exactly as it would in a step reference.
pub(crate) fn lex_declaration(declaration: &str) -> Result<Vec<Token>, PatternError> {
    let bytes = declaration.as_bytes();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut pos = 0;

    let flush_literal = |literal: &mut String, tokens: &mut Vec<Token>| {
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(literal)));
        }
    };

    while let Some(ch) = declaration.get(pos..).and_then(|rest| rest.chars().next()) {
        match ch {
            '\\' => {
                literal.push('\\');
                pos += 1;
                if let Some(next) = declaration.get(pos..).and_then(|rest| rest.chars().next()) {
                    literal.push(next);
                    pos += next.len_utf8();
                }
            }
            '{' => {
                if bytes.get(pos + 1) == Some(&b'{') {
                    literal.push('{');
                    pos += 2;
                    continue;
                }
                if bytes
                    .get(pos + 1)
                    .is_some_and(|next| next.is_ascii_alphabetic() || *next == b'_')
                {
                    flush_literal(&mut literal, &mut tokens);
                    let (next_pos, PlaceholderSpec { start, name, hint }) =
                        parse_placeholder(bytes, pos)?;
                    tokens.push(Token::Placeholder { start, name, hint });
                    pos = next_pos;
                    continue;
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::OpenBrace { index: pos });
                pos += 1;
            }
            '}' => {
                if bytes.get(pos + 1) == Some(&b'}') {
                    literal.push('}');
                    pos += 2;
                    continue;
                }
                flush_literal(&mut literal, &mut tokens);
                tokens.push(Token::CloseBrace { index: pos });
                pos += 1;
            }
            other => {
                literal.push(other);
                pos += other.len_utf8();
            }
        }
    }

    flush_literal(&mut literal, &mut tokens);
    Ok(tokens)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests exercise lexing fallibility")]
mod tests {
    use super::*;

    #[test]
    fn lexes_literals_and_placeholders() {
        let tokens = lex_declaration("I have {count:int} apples").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("I have ".into()),
                Token::Placeholder {
                    start: 7,
                    name: "count".into(),
                    hint: Some("int".into()),
                },
                Token::Literal(" apples".into()),
            ]
        );
    }

    #[test]
    fn doubled_braces_are_literal() {
        let tokens = lex_declaration("{{outer}} {inner}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("{outer} ".into()),
                Token::Placeholder {
                    start: 10,
                    name: "inner".into(),
                    hint: None,
                },
            ]
        );
    }

    #[test]
    fn keeps_escapes_verbatim() {
        let tokens = lex_declaration(r"it\'s \{x}").unwrap();
        assert_eq!(tokens, vec![Token::Literal(r"it\'s \{x".into()), Token::CloseBrace { index: 9 }]);
    }

    #[test]
    fn preserves_multibyte_literals() {
        let tokens = lex_declaration("café {name}").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Literal("café ".into()),
                Token::Placeholder {
                    start: 6,
                    name: "name".into(),
                    hint: None,
                },
            ]
        );
    }

    #[test]
    fn records_stray_braces() {
        let tokens = lex_declaration("{ literal }").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::OpenBrace { index: 0 },
                Token::Literal(" literal ".into()),
                Token::CloseBrace { index: 10 },
            ]
        );
    }
}
