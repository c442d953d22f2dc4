//! Step definitions and their identity rules.
//!
//! A [`StepDefinition`] pairs the fields every definition shares (owning
//! source, step type, declaration, table requirement) with a
//! [`DefinitionKind`] that holds what only one flavour needs.

use std::fmt;
use std::sync::{Arc, OnceLock};

use autostep_patterns::{DeclarationPattern, PatternError, StepType, compile_declaration};

use crate::error::InvocationError;
use crate::location::SourceLocation;
use crate::reference::ArgumentValue;
use crate::source::SourceUid;

/// Whether a definition accepts a table attached to the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableRequirement {
    /// A table is an error.
    NotSupported,
    /// A table may be supplied.
    #[default]
    Optional,
    /// A table must be supplied.
    Required,
}

/// Callable behaviour behind a native step definition.
pub trait Invocable: Send + Sync {
    /// Run the step with its bound argument values.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::Failed`] when the step fails.
    fn invoke(&self, arguments: &[ArgumentValue]) -> Result<(), InvocationError>;
}

impl<F> Invocable for F
where
    F: Fn(&[ArgumentValue]) -> Result<(), InvocationError> + Send + Sync,
{
    fn invoke(&self, arguments: &[ArgumentValue]) -> Result<(), InvocationError> {
        self(arguments)
    }
}

/// Variant-specific data of a [`StepDefinition`].
#[derive(Clone)]
pub enum DefinitionKind {
    /// Declared by a step definition element in a test file.
    File {
        /// Where the declaration appears.
        location: SourceLocation,
        /// Free text written under the declaration.
        description: Option<String>,
    },
    /// Backed by a native handler.
    Native {
        /// Stable identifier of the handler.
        handler: String,
        /// The handler itself.
        invocable: Arc<dyn Invocable>,
    },
    /// Produced by an interaction set for a component.
    Interaction {
        /// Components the step applies to, in resolution order.
        components: Vec<String>,
        /// Values substituted for the definition's placeholders.
        placeholders: Vec<(String, String)>,
    },
}

impl fmt::Debug for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File {
                location,
                description,
            } => f
                .debug_struct("File")
                .field("location", location)
                .field("description", description)
                .finish(),
            Self::Native { handler, .. } => f
                .debug_struct("Native")
                .field("handler", handler)
                .finish_non_exhaustive(),
            Self::Interaction {
                components,
                placeholders,
            } => f
                .debug_struct("Interaction")
                .field("components", components)
                .field("placeholders", placeholders)
                .finish(),
        }
    }
}

/// Key a source's definitions are diffed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature {
    /// Step type.
    pub step_type: StepType,
    /// Declaration text.
    pub declaration: String,
}

/// A step definition registered with the linker.
#[derive(Debug)]
pub struct StepDefinition {
    source: SourceUid,
    step_type: StepType,
    declaration: String,
    table: TableRequirement,
    pattern: OnceLock<Result<DeclarationPattern, PatternError>>,
    kind: DefinitionKind,
}

impl StepDefinition {
    /// Create a definition whose declaration is compiled on first use.
    #[must_use]
    pub fn new(
        source: SourceUid,
        step_type: StepType,
        declaration: impl Into<String>,
        kind: DefinitionKind,
    ) -> Self {
        Self {
            source,
            step_type,
            declaration: declaration.into(),
            table: TableRequirement::default(),
            pattern: OnceLock::new(),
            kind,
        }
    }

    /// Create a file definition.
    #[must_use]
    pub fn file(
        source: SourceUid,
        step_type: StepType,
        declaration: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::new(
            source,
            step_type,
            declaration,
            DefinitionKind::File {
                location,
                description: None,
            },
        )
    }

    /// Create a native definition from a closure.
    #[must_use]
    pub fn native<F>(
        source: SourceUid,
        step_type: StepType,
        declaration: impl Into<String>,
        handler: impl Into<String>,
        invocable: F,
    ) -> Self
    where
        F: Fn(&[ArgumentValue]) -> Result<(), InvocationError> + Send + Sync + 'static,
    {
        Self::new(
            source,
            step_type,
            declaration,
            DefinitionKind::Native {
                handler: handler.into(),
                invocable: Arc::new(invocable),
            },
        )
    }

    /// Set the table requirement.
    #[must_use]
    pub fn with_table(mut self, table: TableRequirement) -> Self {
        self.table = table;
        self
    }

    /// Supply an already compiled pattern so no compilation happens later.
    #[must_use]
    pub fn with_pattern(self, pattern: DeclarationPattern) -> Self {
        let _ = self.pattern.set(Ok(pattern));
        self
    }

    /// Owning source.
    #[must_use]
    pub fn source(&self) -> &SourceUid {
        &self.source
    }

    /// Step type the definition is registered under.
    #[must_use]
    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    /// Declaration text.
    #[must_use]
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    /// Table requirement.
    #[must_use]
    pub fn table(&self) -> TableRequirement {
        self.table
    }

    /// Variant data.
    #[must_use]
    pub fn kind(&self) -> &DefinitionKind {
        &self.kind
    }

    /// Location of the declaration, for definitions declared in a file.
    #[must_use]
    pub fn location(&self) -> Option<SourceLocation> {
        match &self.kind {
            DefinitionKind::File { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// Diffing key.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature {
            step_type: self.step_type,
            declaration: self.declaration.clone(),
        }
    }

    /// Compiled declaration, compiling it on first call.
    ///
    /// # Errors
    ///
    /// Returns the [`PatternError`] the declaration failed with.
    pub fn pattern(&self) -> Result<&DeclarationPattern, &PatternError> {
        self.pattern
            .get_or_init(|| compile_declaration(&self.declaration))
            .as_ref()
    }

    /// Whether `other` is a different instance of the same definition.
    ///
    /// File definitions compare source, type and declaration. Native
    /// definitions compare handler, type and declaration. Interaction
    /// definitions compare source, declaration and components. Definitions of
    /// different kinds are never the same.
    #[must_use]
    pub fn is_same_definition(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (DefinitionKind::File { .. }, DefinitionKind::File { .. }) => {
                self.source == other.source
                    && self.step_type == other.step_type
                    && self.declaration == other.declaration
            }
            (
                DefinitionKind::Native { handler: a, .. },
                DefinitionKind::Native { handler: b, .. },
            ) => a == b && self.step_type == other.step_type && self.declaration == other.declaration,
            (
                DefinitionKind::Interaction { components: a, .. },
                DefinitionKind::Interaction { components: b, .. },
            ) => self.source == other.source && self.declaration == other.declaration && a == b,
            _ => false,
        }
    }

    /// Run a native definition.
    ///
    /// # Errors
    ///
    /// Returns [`InvocationError::NotInvocable`] for definitions without a
    /// native handler, or whatever the handler reports.
    pub fn invoke(&self, arguments: &[ArgumentValue]) -> Result<(), InvocationError> {
        match &self.kind {
            DefinitionKind::Native { invocable, .. } => invocable.invoke(arguments),
            _ => Err(InvocationError::NotInvocable(self.declaration.clone())),
        }
    }
}
