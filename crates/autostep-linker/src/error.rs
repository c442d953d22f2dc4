//! Error types for programming-contract violations.
//!
//! Data problems found while linking (missing or ambiguous bindings, type
//! mismatches) are reported as [`CompilerMessage`](crate::CompilerMessage)s.
//! The errors here signal caller bugs instead.

use autostep_patterns::{PatternError, StepType};
use thiserror::Error;

use crate::source::SourceUid;

/// Errors returned by [`Linker`](crate::Linker) source management.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkerError {
    /// The source was never registered with the linker.
    #[error("step definition source `{0}` is not registered with the linker")]
    SourceNotRegistered(SourceUid),
}

/// Reasons a step definition cannot be placed in the matching tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The declaration did not compile.
    #[error(transparent)]
    InvalidDeclaration(#[from] PatternError),
    /// Definitions must be `Given`, `When` or `Then`.
    #[error("step definitions cannot use the `{0}` keyword")]
    UnboundStepType(StepType),
}

/// Errors raised when invoking a step handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The bound definition has no native handler.
    #[error("step definition `{0}` has no native handler")]
    NotInvocable(String),
    /// The handler reported a failure.
    #[error("step handler failed: {0}")]
    Failed(String),
}
