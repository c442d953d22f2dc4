//! Positional tokens produced for step statements and declarations.
//!
//! Tokens never own text. They carry a byte range into the statement text
//! held by [`TokenisedText`], which is immutable once built.

use std::sync::Arc;

use crate::hint::ArgumentType;

/// Variant-specific payload of a [`StepToken`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepTokenKind {
    /// A run of word characters that is not a number.
    Word,
    /// A quote mark (`'` or `"`).
    Quote(char),
    /// A backslash escape; holds the escaped character.
    EscapedChar(char),
    /// A whole number such as `42` or `-7`.
    Int,
    /// A decimal number such as `1.5`.
    Float,
    /// A variable insertion such as `<name>`; holds the trimmed name.
    Variable(String),
    /// The `:` introducing an interpolated value.
    InterpolationStart,
    /// A single punctuation character.
    Text,
}

impl StepTokenKind {
    /// Type a lone token of this kind represents, or `None` when the value is
    /// only known at run time.
    ///
    /// # Examples
    /// ```
    /// use autostep_patterns::{ArgumentType, StepTokenKind};
    ///
    /// assert_eq!(StepTokenKind::Int.inferred_type(), Some(ArgumentType::NumericInteger));
    /// assert_eq!(StepTokenKind::Variable("x".into()).inferred_type(), None);
    /// ```
    #[must_use]
    pub fn inferred_type(&self) -> Option<ArgumentType> {
        match self {
            Self::Word | Self::Quote(_) | Self::EscapedChar(_) | Self::Text => {
                Some(ArgumentType::Text)
            }
            Self::Int => Some(ArgumentType::NumericInteger),
            Self::Float => Some(ArgumentType::NumericDecimal),
            Self::Variable(_) | Self::InterpolationStart => None,
        }
    }

    /// Whether the token's value is resolved at run time.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Variable(_) | Self::InterpolationStart)
    }
}

/// A single token with its byte range in the statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StepToken {
    /// Byte offset of the first character.
    pub start: usize,
    /// Length in bytes.
    pub len: usize,
    /// Token variant.
    pub kind: StepTokenKind,
}

impl StepToken {
    /// Create a token.
    #[must_use]
    pub const fn new(start: usize, len: usize, kind: StepTokenKind) -> Self {
        Self { start, len, kind }
    }

    /// Byte offset one past the last character.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Statement text together with its frozen token sequence.
///
/// Cloning is cheap; the text and tokens are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenisedText {
    text: Arc<str>,
    tokens: Arc<[StepToken]>,
}

impl TokenisedText {
    pub(crate) fn new(text: &str, tokens: Vec<StepToken>) -> Self {
        Self {
            text: Arc::from(text),
            tokens: tokens.into(),
        }
    }

    /// The full statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All tokens in source order.
    #[must_use]
    pub fn tokens(&self) -> &[StepToken] {
        &self.tokens
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the statement has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepToken> {
        self.tokens.get(index)
    }

    /// Source text covered by `token`.
    ///
    /// # Examples
    /// ```
    /// use autostep_patterns::tokenise_statement;
    ///
    /// let text = tokenise_statement("I have 5 apples");
    /// let token = text.get(2).expect("third token");
    /// assert_eq!(text.token_text(token), "5");
    /// ```
    #[must_use]
    pub fn token_text(&self, token: &StepToken) -> &str {
        self.text.get(token.start..token.end()).unwrap_or_default()
    }

    /// Source text from the start of token `first` to the end of token `last`
    /// (both inclusive), including any whitespace between them.
    #[must_use]
    pub fn slice(&self, first: usize, last: usize) -> &str {
        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(a), Some(b)) if a.start <= b.end() => {
                self.text.get(a.start..b.end()).unwrap_or_default()
            }
            _ => "",
        }
    }

    /// Whether whitespace separates token `index` from the token after it.
    #[must_use]
    pub fn has_gap_after(&self, index: usize) -> bool {
        match (self.tokens.get(index), self.tokens.get(index + 1)) {
            (Some(a), Some(b)) => b.start > a.end(),
            _ => false,
        }
    }
}
