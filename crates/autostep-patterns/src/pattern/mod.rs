//! Step declaration lexing and compilation.
//!
//! A declaration such as `I have {count:int} apples` compiles into an ordered
//! list of [`DefinitionPart`]s: literal words that must match a reference
//! token exactly, and argument parts that consume one or more tokens.

mod compiler;
mod lexer;
mod placeholder;

use crate::errors::PatternError;
use crate::hint::ArgumentType;

/// A literal token of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordPart {
    /// Source text of the token, matched case-sensitively.
    pub text: String,
}

/// A named placeholder of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentPart {
    /// Placeholder name.
    pub name: String,
    /// Declared type hint, if any.
    pub hint: Option<ArgumentType>,
    /// Quote character wrapping the placeholder (`'{name}'`), if any.
    pub quote: Option<char>,
}

/// One segment of a compiled declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefinitionPart {
    /// Literal token.
    Word(WordPart),
    /// Placeholder.
    Argument(ArgumentPart),
}

impl DefinitionPart {
    /// The argument part, when this is a placeholder.
    #[must_use]
    pub fn as_argument(&self) -> Option<&ArgumentPart> {
        match self {
            Self::Argument(arg) => Some(arg),
            Self::Word(_) => None,
        }
    }
}

/// A compiled step declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationPattern {
    text: String,
    parts: Vec<DefinitionPart>,
}

impl DeclarationPattern {
    /// The declaration as written.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Ordered parts.
    #[must_use]
    pub fn parts(&self) -> &[DefinitionPart] {
        &self.parts
    }

    /// Argument parts in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &ArgumentPart> {
        self.parts.iter().filter_map(DefinitionPart::as_argument)
    }

    /// Number of literal word parts.
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, DefinitionPart::Word(_)))
            .count()
    }
}

/// Compile a step declaration into a [`DeclarationPattern`].
///
/// # Errors
/// Returns [`PatternError`] for malformed placeholders, unbalanced braces,
/// unknown type hints, duplicate placeholder names and empty declarations.
///
/// # Examples
/// ```
/// use autostep_patterns::{ArgumentType, DefinitionPart, compile_declaration};
///
/// let pattern = compile_declaration("I have {count:int} apples")
///     .expect("declaration compiles");
/// assert_eq!(pattern.parts().len(), 4);
/// let arg = pattern.arguments().next().expect("one argument");
/// assert_eq!(arg.name, "count");
/// assert_eq!(arg.hint, Some(ArgumentType::NumericInteger));
/// assert!(matches!(pattern.parts().first(), Some(DefinitionPart::Word(w)) if w.text == "I"));
/// ```
pub fn compile_declaration(declaration: &str) -> Result<DeclarationPattern, PatternError> {
    compiler::compile(declaration)
}
