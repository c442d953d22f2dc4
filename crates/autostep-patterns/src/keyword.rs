//! Step type keyword and conjunction resolution.
//!
//! [`StepType`] is shared by step references and step definitions. Feature
//! parsing resolves `And` against the preceding `Given`/`When`/`Then` using
//! [`StepType::resolve`], so definitions are only ever indexed under the three
//! concrete types.

use gherkin::StepType as GherkinStepType;
use std::fmt;
use std::str::FromStr;

/// Keyword used to categorise a step reference or definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepType {
    /// Setup preconditions for a scenario.
    Given,
    /// Perform an action when testing behaviour.
    When,
    /// Assert the expected outcome of a scenario.
    Then,
    /// Additional step sharing the type of the previous step.
    And,
}

impl StepType {
    /// The three types a definition can be registered under.
    pub const CONCRETE: [Self; 3] = [Self::Given, Self::When, Self::Then];

    /// Return the keyword as a string slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use autostep_patterns::StepType;
    ///
    /// assert_eq!(StepType::Given.as_str(), "Given");
    /// assert_eq!(StepType::And.as_str(), "And");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
        }
    }

    /// Whether this is one of `Given`, `When` or `Then`.
    #[must_use]
    pub const fn is_concrete(self) -> bool {
        !matches!(self, Self::And)
    }

    /// Resolve `And` to the binding type of the previous step.
    ///
    /// When the current keyword is `And`, returns the value stored in `prev`
    /// (or `Given` when nothing precedes it). Concrete keywords update `prev`
    /// and are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use autostep_patterns::StepType;
    ///
    /// let mut prev = Some(StepType::Given);
    /// assert_eq!(StepType::And.resolve(&mut prev), StepType::Given);
    /// assert_eq!(StepType::When.resolve(&mut prev), StepType::When);
    /// assert_eq!(prev, Some(StepType::When));
    /// ```
    #[must_use]
    pub fn resolve(self, prev: &mut Option<Self>) -> Self {
        if self.is_concrete() {
            *prev = Some(self);
            self
        } else {
            prev.unwrap_or(Self::Given)
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`StepType`] from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid step type: {0}")]
pub struct StepTypeParseError(pub String);

impl FromStr for StepType {
    type Err = StepTypeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("given") {
            Ok(Self::Given)
        } else if trimmed.eq_ignore_ascii_case("when") {
            Ok(Self::When)
        } else if trimmed.eq_ignore_ascii_case("then") {
            Ok(Self::Then)
        } else if trimmed.eq_ignore_ascii_case("and") || trimmed.eq_ignore_ascii_case("but") {
            Ok(Self::And)
        } else {
            Err(StepTypeParseError(trimmed.to_string()))
        }
    }
}

impl TryFrom<&str> for StepType {
    type Error = StepTypeParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GherkinStepType> for StepType {
    fn from(ty: GherkinStepType) -> Self {
        match ty {
            GherkinStepType::Given => Self::Given,
            GherkinStepType::When => Self::When,
            GherkinStepType::Then => Self::Then,
        }
    }
}
