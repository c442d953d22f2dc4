//! Error types shared by the declaration compiling modules.

use std::fmt;
use thiserror::Error;

/// Additional context for placeholder-related parsing errors.
///
/// # Examples
/// ```
/// use autostep_patterns::PlaceholderErrorInfo;
/// let info = PlaceholderErrorInfo::new("invalid placeholder", 3, Some("value".into()));
/// assert_eq!(info.placeholder.as_deref(), Some("value"));
/// assert_eq!(info.position, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderErrorInfo {
    /// Human-readable reason for the failure.
    pub message: &'static str,
    /// Zero-based byte offset in the declaration where parsing failed.
    pub position: usize,
    /// Name of the placeholder, when known.
    pub placeholder: Option<String>,
}

impl PlaceholderErrorInfo {
    /// Create a new error description for a placeholder failure.
    #[must_use]
    pub fn new(message: &'static str, position: usize, placeholder: Option<String>) -> Self {
        Self {
            message,
            position,
            placeholder,
        }
    }
}

impl fmt::Display for PlaceholderErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.placeholder {
            Some(name) => write!(
                f,
                "{} for placeholder `{}` at byte {} (zero-based)",
                self.message, name, self.position
            ),
            None => write!(f, "{} at byte {} (zero-based)", self.message, self.position),
        }
    }
}

/// Errors surfaced while compiling a step declaration into a pattern.
///
/// # Examples
/// ```
/// use autostep_patterns::{PatternError, PlaceholderErrorInfo};
/// let info = PlaceholderErrorInfo::new("invalid", 2, Some("count".into()));
/// let err = PatternError::Placeholder(info.clone());
/// assert_eq!(err.to_string(), info.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A placeholder was malformed.
    #[error("{0}")]
    Placeholder(PlaceholderErrorInfo),
    /// A placeholder used a type hint that is not recognised.
    #[error("unknown type hint `{hint}` for placeholder `{placeholder}`")]
    UnknownTypeHint {
        /// Placeholder carrying the hint.
        placeholder: String,
        /// The hint as written.
        hint: String,
    },
    /// Two placeholders in one declaration share a name.
    #[error("placeholder `{0}` is declared more than once")]
    DuplicateArgument(String),
    /// The declaration contained no tokens at all.
    #[error("step declaration is empty")]
    Empty,
}

pub(crate) fn placeholder_error(
    message: &'static str,
    position: usize,
    placeholder: Option<String>,
) -> PatternError {
    PatternError::Placeholder(PlaceholderErrorInfo::new(message, position, placeholder))
}
