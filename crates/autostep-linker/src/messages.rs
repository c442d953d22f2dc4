//! Compiler messages reported by registration and linking.
//!
//! Every message carries a stable [`CompilerMessageCode`] whose numeric value
//! never changes between releases, so tools can filter or suppress specific
//! diagnostics.

use std::fmt;

use fluent::FluentArgs;
use serde::Serialize;
use thiserror::Error;

use crate::localisation::message_with_args;
use crate::location::TextRange;

/// Severity of a [`CompilerMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CompilerMessageLevel {
    /// Informational note.
    Info,
    /// Suspicious but valid input.
    Warning,
    /// The operation did not succeed.
    Error,
}

impl CompilerMessageLevel {
    /// Level name as displayed in rendered messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for CompilerMessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u32")]
#[repr(u32)]
pub enum CompilerMessageCode {
    /// A step definition's declaration failed to compile.
    StepDefinitionDeclarationInvalid = 10001,
    /// No definition matches a step reference.
    LinkerNoMatchingStepDefinition = 20001,
    /// More than one definition matches a step reference exactly.
    LinkerMultipleMatchingDefinitions = 20002,
    /// A numeric argument was bound to an empty value.
    TypeRequiresValueForArgument = 20003,
    /// An argument value does not satisfy its type hint.
    ArgumentTypeNotCompatible = 20004,
    /// A quoted argument has whitespace inside its quotes.
    ArgumentHasSurroundingWhitespace = 20005,
    /// The definition requires a table that the step does not provide.
    LinkerTableRequired = 20006,
    /// The step provides a table the definition does not accept.
    LinkerTableNotSupported = 20007,
}

impl CompilerMessageCode {
    /// Every code, in numeric order.
    pub const ALL: [Self; 8] = [
        Self::StepDefinitionDeclarationInvalid,
        Self::LinkerNoMatchingStepDefinition,
        Self::LinkerMultipleMatchingDefinitions,
        Self::TypeRequiresValueForArgument,
        Self::ArgumentTypeNotCompatible,
        Self::ArgumentHasSurroundingWhitespace,
        Self::LinkerTableRequired,
        Self::LinkerTableNotSupported,
    ];

    /// Numeric value of the code.
    #[must_use]
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Level a message with this code is reported at.
    #[must_use]
    pub const fn level(self) -> CompilerMessageLevel {
        match self {
            Self::ArgumentHasSurroundingWhitespace => CompilerMessageLevel::Warning,
            _ => CompilerMessageLevel::Error,
        }
    }

    /// Fluent message identifier for the code's text.
    #[must_use]
    pub const fn message_id(self) -> &'static str {
        match self {
            Self::StepDefinitionDeclarationInvalid => "step-definition-declaration-invalid",
            Self::LinkerNoMatchingStepDefinition => "linker-no-matching-step-definition",
            Self::LinkerMultipleMatchingDefinitions => "linker-multiple-matching-definitions",
            Self::TypeRequiresValueForArgument => "type-requires-value-for-argument",
            Self::ArgumentTypeNotCompatible => "argument-type-not-compatible",
            Self::ArgumentHasSurroundingWhitespace => "argument-has-surrounding-whitespace",
            Self::LinkerTableRequired => "linker-table-required",
            Self::LinkerTableNotSupported => "linker-table-not-supported",
        }
    }
}

impl From<CompilerMessageCode> for u32 {
    fn from(code: CompilerMessageCode) -> Self {
        code.value()
    }
}

/// Error returned when converting an unknown numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown compiler message code {0}")]
pub struct UnknownMessageCode(pub u32);

impl TryFrom<u32> for CompilerMessageCode {
    type Error = UnknownMessageCode;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.value() == value)
            .ok_or(UnknownMessageCode(value))
    }
}

/// A positioned diagnostic.
///
/// Lines and columns are 1-based; the end column is inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerMessage {
    /// Name of the file or source the message relates to.
    pub source_name: Option<String>,
    /// Severity.
    pub level: CompilerMessageLevel,
    /// Stable code.
    pub code: CompilerMessageCode,
    /// Rendered text.
    pub text: String,
    /// First line.
    pub start_line: usize,
    /// First column.
    pub start_column: usize,
    /// Last line.
    pub end_line: usize,
    /// Last column (inclusive).
    pub end_column: usize,
}

impl CompilerMessage {
    /// Create a message with pre-rendered text at the code's default level.
    #[must_use]
    pub fn new(
        source_name: Option<&str>,
        code: CompilerMessageCode,
        text: impl Into<String>,
        range: TextRange,
    ) -> Self {
        Self {
            source_name: source_name.map(str::to_string),
            level: code.level(),
            code,
            text: text.into(),
            start_line: range.start.line,
            start_column: range.start.column,
            end_line: range.end.line,
            end_column: range.end.column,
        }
    }

    /// Create a message whose text is rendered from the code's localised
    /// template, with arguments supplied by `configure`.
    #[must_use]
    pub fn localised<F>(
        source_name: Option<&str>,
        code: CompilerMessageCode,
        range: TextRange,
        configure: F,
    ) -> Self
    where
        F: FnOnce(&mut FluentArgs<'static>),
    {
        let text = message_with_args(code.message_id(), configure);
        Self::new(source_name, code, text, range)
    }

    /// Whether this message is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == CompilerMessageLevel::Error
    }
}

impl fmt::Display for CompilerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{},{},{}): {} ASC{:05}: {}",
            self.source_name.as_deref().unwrap_or_default(),
            self.start_line,
            self.start_column,
            self.end_line,
            self.end_column,
            self.level,
            self.code.value(),
            self.text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;
    use rstest::rstest;

    #[rstest]
    #[case(10001, CompilerMessageCode::StepDefinitionDeclarationInvalid)]
    #[case(20001, CompilerMessageCode::LinkerNoMatchingStepDefinition)]
    #[case(20002, CompilerMessageCode::LinkerMultipleMatchingDefinitions)]
    #[case(20003, CompilerMessageCode::TypeRequiresValueForArgument)]
    #[case(20004, CompilerMessageCode::ArgumentTypeNotCompatible)]
    #[case(20005, CompilerMessageCode::ArgumentHasSurroundingWhitespace)]
    #[case(20006, CompilerMessageCode::LinkerTableRequired)]
    #[case(20007, CompilerMessageCode::LinkerTableNotSupported)]
    fn codes_round_trip(#[case] value: u32, #[case] code: CompilerMessageCode) {
        assert_eq!(CompilerMessageCode::try_from(value), Ok(code));
        assert_eq!(u32::from(code), value);
    }

    #[test]
    fn rejects_unknown_codes() {
        assert_eq!(
            CompilerMessageCode::try_from(42),
            Err(UnknownMessageCode(42))
        );
    }

    #[test]
    fn only_whitespace_is_a_warning() {
        for code in CompilerMessageCode::ALL {
            let expected = if code == CompilerMessageCode::ArgumentHasSurroundingWhitespace {
                CompilerMessageLevel::Warning
            } else {
                CompilerMessageLevel::Error
            };
            assert_eq!(code.level(), expected, "{code:?}");
        }
    }

    #[test]
    fn displays_in_compiler_format() {
        let range = TextRange {
            start: SourceLocation::new(3, 5),
            end: SourceLocation::new(3, 12),
        };
        let message = CompilerMessage::new(
            Some("test.feature"),
            CompilerMessageCode::LinkerNoMatchingStepDefinition,
            "no match",
            range,
        );
        assert_eq!(
            message.to_string(),
            "test.feature(3,5,3,12): Error ASC20001: no match"
        );
        assert!(message.is_error());
    }

    #[test]
    fn serialises_code_as_number() {
        let message = CompilerMessage::new(
            None,
            CompilerMessageCode::ArgumentHasSurroundingWhitespace,
            "spaces",
            TextRange::default(),
        );
        let json = serde_json::to_value(&message).unwrap_or_else(|err| panic!("serialise: {err}"));
        assert_eq!(json["code"], 20005);
        assert_eq!(json["level"], "Warning");
        assert_eq!(json["sourceName"], serde_json::Value::Null);
        assert_eq!(json["startLine"], 0);
    }

    #[test]
    fn localised_messages_use_fluent_templates() {
        let message = CompilerMessage::localised(
            Some("a.feature"),
            CompilerMessageCode::TypeRequiresValueForArgument,
            TextRange::default(),
            |args| {
                args.set("hint", "int");
                args.set("name", "count");
            },
        );
        assert_eq!(message.text, "The int argument `count` requires a value.");
    }
}
