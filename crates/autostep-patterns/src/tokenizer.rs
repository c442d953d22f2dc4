//! Statement tokenizer shared by step references and declarations.
//!
//! Whitespace separates tokens and never produces one. Quotes, escapes,
//! variable insertions (`<name>`), interpolation markers (`:name`) and
//! punctuation become single tokens; everything else is grouped into runs
//! that are classified as words or numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::token::{StepToken, StepTokenKind, TokenisedText};

static INT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+$").unwrap_or_else(|err| panic!("invalid integer pattern: {err}"))
});

static FLOAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?[0-9]+\.[0-9]+$")
        .unwrap_or_else(|err| panic!("invalid decimal pattern: {err}"))
});

/// Tokenise a step statement.
///
/// # Examples
/// ```
/// use autostep_patterns::{StepTokenKind, tokenise_statement};
///
/// let text = tokenise_statement("I have passed '1.5' to <target>");
/// let kinds: Vec<_> = text.tokens().iter().map(|t| t.kind.clone()).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         StepTokenKind::Word,
///         StepTokenKind::Word,
///         StepTokenKind::Word,
///         StepTokenKind::Quote('\''),
///         StepTokenKind::Float,
///         StepTokenKind::Quote('\''),
///         StepTokenKind::Word,
///         StepTokenKind::Variable("target".into()),
///     ]
/// );
/// ```
#[must_use]
pub fn tokenise_statement(text: &str) -> TokenisedText {
    let mut lexer = StatementLexer::new(text);
    lexer.run();
    TokenisedText::new(text, lexer.tokens)
}

/// Whether `c` is one of the characters that always lexes on its own.
pub(crate) fn is_punctuation(c: char) -> bool {
    matches!(
        c,
        ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '<' | '>'
    )
}

fn is_word_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '\'' | '"' | '\\') && !is_punctuation(c)
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

struct StatementLexer<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    tokens: Vec<StepToken>,
}

impl<'a> StatementLexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.char_indices().collect(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    /// Byte offset of the character at `index`, or the text length.
    fn offset(&self, index: usize) -> usize {
        self.chars.get(index).map_or(self.text.len(), |(b, _)| *b)
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).map(|(_, c)| *c)
    }

    fn push(&mut self, first: usize, next: usize, kind: StepTokenKind) {
        let start = self.offset(first);
        let end = self.offset(next);
        self.tokens.push(StepToken::new(start, end - start, kind));
        self.pos = next;
    }

    fn at_boundary(&self) -> bool {
        match self.pos.checked_sub(1).and_then(|prev| self.char_at(prev)) {
            None => true,
            Some(c) => c.is_whitespace() || matches!(c, '\'' | '"'),
        }
    }

    fn run(&mut self) {
        while let Some(ch) = self.char_at(self.pos) {
            let pos = self.pos;
            match ch {
                c if c.is_whitespace() => self.pos += 1,
                '\\' => match self.char_at(pos + 1) {
                    Some(escaped) => self.push(pos, pos + 2, StepTokenKind::EscapedChar(escaped)),
                    None => self.push(pos, pos + 1, StepTokenKind::Text),
                },
                '\'' | '"' => self.push(pos, pos + 1, StepTokenKind::Quote(ch)),
                '<' => match self.scan_variable() {
                    Some((next, name)) => self.push(pos, next, StepTokenKind::Variable(name)),
                    None => self.push(pos, pos + 1, StepTokenKind::Text),
                },
                ':' if self.at_boundary()
                    && self.char_at(pos + 1).is_some_and(is_identifier_start) =>
                {
                    self.push(pos, pos + 1, StepTokenKind::InterpolationStart);
                }
                c if is_punctuation(c) => self.push(pos, pos + 1, StepTokenKind::Text),
                _ => self.scan_run(),
            }
        }
    }

    /// Scan `<name>` starting at the current `<`.
    fn scan_variable(&self) -> Option<(usize, String)> {
        let first = self.pos + 1;
        if !self.char_at(first).is_some_and(is_identifier_start) {
            return None;
        }
        let mut index = first;
        while let Some(c) = self.char_at(index) {
            match c {
                '>' => {
                    let name = self.text.get(self.offset(first)..self.offset(index))?;
                    return Some((index + 1, name.trim().to_string()));
                }
                c if c.is_alphanumeric() || matches!(c, '_' | '-' | ' ') => index += 1,
                _ => return None,
            }
        }
        None
    }

    fn scan_run(&mut self) {
        let first = self.pos;
        let start = self.offset(first);
        let mut index = first;
        while let Some(c) = self.char_at(index) {
            if is_word_char(c) {
                index += 1;
                continue;
            }
            let numeric_so_far = self
                .text
                .get(start..self.offset(index))
                .is_some_and(|run| INT_RE.is_match(run));
            if c == '.'
                && numeric_so_far
                && self.char_at(index + 1).is_some_and(|d| d.is_ascii_digit())
            {
                index += 1;
                continue;
            }
            break;
        }
        let run = self.text.get(start..self.offset(index)).unwrap_or_default();
        let kind = if INT_RE.is_match(run) {
            StepTokenKind::Int
        } else if FLOAT_RE.is_match(run) {
            StepTokenKind::Float
        } else {
            StepTokenKind::Word
        };
        self.push(first, index, kind);
    }
}
