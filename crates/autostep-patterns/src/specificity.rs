//! Declaration specificity used to rank competing matches.
//!
//! When several declarations could satisfy the same step text, the one with
//! more literal words and fewer placeholders is considered more specific.

use std::cmp::Ordering;

use crate::PatternError;
use crate::pattern::{DeclarationPattern, DefinitionPart, compile_declaration};

/// Specificity score for a compiled declaration.
///
/// # Ordering
///
/// Declarations are compared by:
/// 1. More literal parts → more specific
/// 2. Fewer arguments → more specific
/// 3. More typed arguments → more specific (tiebreaker)
///
/// # Examples
///
/// ```
/// use autostep_patterns::SpecificityScore;
///
/// let specific = SpecificityScore::calculate("the output is foo")
///     .expect("valid specific declaration");
/// let generic = SpecificityScore::calculate("the output is {value}")
///     .expect("valid generic declaration");
/// assert!(specific > generic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecificityScore {
    /// Number of literal word parts.
    pub literal_parts: usize,
    /// Number of argument parts.
    pub argument_count: usize,
    /// Number of arguments with a type hint (e.g. `{n:int}`).
    pub typed_argument_count: usize,
}

impl SpecificityScore {
    /// Score an already compiled declaration.
    #[must_use]
    pub fn of(pattern: &DeclarationPattern) -> Self {
        pattern
            .parts()
            .iter()
            .fold(Self::default(), |mut score, part| {
                match part {
                    DefinitionPart::Word(_) => score.literal_parts += 1,
                    DefinitionPart::Argument(arg) => {
                        score.argument_count += 1;
                        if arg.hint.is_some() {
                            score.typed_argument_count += 1;
                        }
                    }
                }
                score
            })
    }

    /// Compile `declaration` and score it.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the declaration does not compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use autostep_patterns::SpecificityScore;
    ///
    /// let score = SpecificityScore::calculate("I have {count:int} apples")
    ///     .expect("valid declaration");
    /// assert_eq!(score.literal_parts, 3);
    /// assert_eq!(score.argument_count, 1);
    /// assert_eq!(score.typed_argument_count, 1);
    /// ```
    pub fn calculate(declaration: &str) -> Result<Self, PatternError> {
        compile_declaration(declaration).map(|pattern| Self::of(&pattern))
    }
}

impl Ord for SpecificityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.literal_parts
            .cmp(&other.literal_parts)
            .then_with(|| other.argument_count.cmp(&self.argument_count))
            .then_with(|| self.typed_argument_count.cmp(&other.typed_argument_count))
    }
}

impl PartialOrd for SpecificityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(declaration: &str) -> SpecificityScore {
        match SpecificityScore::calculate(declaration) {
            Ok(s) => s,
            Err(e) => panic!("declaration {declaration:?} should score: {e}"),
        }
    }

    #[test]
    fn literal_only_declaration_is_most_specific() {
        let literal = score("overlap apples");
        let with_argument = score("overlap {item}");

        assert!(literal > with_argument);
        assert_eq!(literal.argument_count, 0);
        assert_eq!(with_argument.argument_count, 1);
    }

    #[test]
    fn more_literal_parts_wins() {
        assert!(score("the output is the workspace executable {path}") > score("the output is {x}"));
    }

    #[test]
    fn fewer_arguments_wins_with_equal_literals() {
        let a = score("ab {x}");
        let b = score("ab {x} {y}");

        assert_eq!(a.literal_parts, b.literal_parts);
        assert!(a > b, "fewer arguments should win when literals are equal");
    }

    #[test]
    fn typed_argument_wins_as_tiebreaker() {
        let typed = score("count is {n:int}");
        let untyped = score("count is {n}");

        assert_eq!(typed.literal_parts, untyped.literal_parts);
        assert!(typed > untyped);
    }

    #[test]
    fn quoted_arguments_do_not_count_quotes_as_literals() {
        let quoted = score("I have passed '{arg}' to something");
        assert_eq!(quoted.literal_parts, 5);
        assert_eq!(quoted.argument_count, 1);
    }

    #[test]
    fn invalid_declaration_reports_error() {
        assert!(SpecificityScore::calculate("{a:date}").is_err());
    }
}
