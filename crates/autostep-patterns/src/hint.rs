//! Placeholder type hints and the argument type lattice.

use std::fmt;

/// Concrete type of a step argument, ordered from least to most strict.
///
/// A value inferred as [`ArgumentType::NumericInteger`] satisfies every hint,
/// while [`ArgumentType::Text`] only satisfies a text hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgumentType {
    /// Free text.
    Text,
    /// A decimal number; integers qualify too.
    NumericDecimal,
    /// A whole number.
    NumericInteger,
}

impl ArgumentType {
    /// Whether a value of this inferred type can bind to a part hinted `hint`.
    ///
    /// # Examples
    /// ```
    /// use autostep_patterns::ArgumentType;
    ///
    /// assert!(ArgumentType::NumericInteger.satisfies(ArgumentType::Text));
    /// assert!(ArgumentType::NumericInteger.satisfies(ArgumentType::NumericDecimal));
    /// assert!(!ArgumentType::Text.satisfies(ArgumentType::NumericInteger));
    /// ```
    #[must_use]
    pub fn satisfies(self, hint: Self) -> bool {
        self >= hint
    }

    /// Whether this type describes a number.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::NumericDecimal | Self::NumericInteger)
    }

    /// Canonical hint name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::NumericDecimal => "decimal",
            Self::NumericInteger => "int",
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translate a placeholder type hint into an [`ArgumentType`].
///
/// Returns `None` for hints that are not recognised.
///
/// # Examples
/// ```
/// use autostep_patterns::{ArgumentType, parse_type_hint};
/// assert_eq!(parse_type_hint("u32"), Some(ArgumentType::NumericInteger));
/// assert_eq!(parse_type_hint("Decimal"), Some(ArgumentType::NumericDecimal));
/// assert_eq!(parse_type_hint("text"), Some(ArgumentType::Text));
/// assert_eq!(parse_type_hint("date"), None);
/// ```
#[must_use]
pub fn parse_type_hint(hint: &str) -> Option<ArgumentType> {
    match hint.to_ascii_lowercase().as_str() {
        "text" | "string" | "str" => Some(ArgumentType::Text),
        "int" | "integer" | "long" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "i8"
        | "i16" | "i32" | "i64" | "i128" | "isize" => Some(ArgumentType::NumericInteger),
        "decimal" | "float" | "double" | "number" | "f32" | "f64" => {
            Some(ArgumentType::NumericDecimal)
        }
        _ => None,
    }
}
