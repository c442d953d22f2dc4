//! Step definition sources.
//!
//! A source is anything that supplies a batch of step definitions: native
//! handlers registered in code, `Step:` elements declared in a test file, or
//! steps generated from an interaction set. The linker only holds a source's
//! [`SourceUid`] between refreshes; the source itself stays with its owner.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use autostep_patterns::StepType;

use crate::built::BuiltFile;
use crate::definition::{DefinitionKind, StepDefinition, TableRequirement};
use crate::error::InvocationError;
use crate::reference::ArgumentValue;

/// Stable identity of a step definition source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceUid(Arc<str>);

impl SourceUid {
    /// Create a uid.
    #[must_use]
    pub fn new(uid: &str) -> Self {
        Self(Arc::from(uid))
    }

    /// The uid as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceUid {
    fn from(uid: &str) -> Self {
        Self::new(uid)
    }
}

impl From<String> for SourceUid {
    fn from(uid: String) -> Self {
        Self(Arc::from(uid))
    }
}

/// Provider of step definitions.
pub trait StepDefinitionSource {
    /// Stable identity. Registering another source with the same uid replaces
    /// this one.
    fn uid(&self) -> &SourceUid;

    /// Display name used in messages.
    fn name(&self) -> &str;

    /// The source's current definitions.
    fn step_definitions(&self) -> Vec<Arc<StepDefinition>>;
}

/// A source whose definitions change over time.
pub trait UpdatableStepDefinitionSource: StepDefinitionSource {
    /// When the definitions last changed. Callers use this to decide whether
    /// a refresh is needed at all.
    fn last_modified(&self) -> SystemTime;
}

/// Definitions backed by native closures.
///
/// # Examples
/// ```
/// use autostep_linker::{NativeStepSource, StepDefinitionSource};
/// use autostep_patterns::StepType;
///
/// let source = NativeStepSource::new("native", "Native steps")
///     .step(StepType::Given, "I have {count:int} apples", "apples", |_| Ok(()));
/// assert_eq!(source.step_definitions().len(), 1);
/// ```
#[derive(Debug)]
pub struct NativeStepSource {
    uid: SourceUid,
    name: String,
    definitions: Vec<Arc<StepDefinition>>,
}

impl NativeStepSource {
    /// Create an empty source.
    #[must_use]
    pub fn new(uid: &str, name: impl Into<String>) -> Self {
        Self {
            uid: SourceUid::new(uid),
            name: name.into(),
            definitions: Vec::new(),
        }
    }

    /// Register a closure under `declaration`.
    #[must_use]
    pub fn step<F>(
        self,
        step_type: StepType,
        declaration: &str,
        handler: &str,
        invocable: F,
    ) -> Self
    where
        F: Fn(&[ArgumentValue]) -> Result<(), InvocationError> + Send + Sync + 'static,
    {
        self.table_step(step_type, declaration, handler, TableRequirement::Optional, invocable)
    }

    /// Register a closure with an explicit table requirement.
    #[must_use]
    pub fn table_step<F>(
        mut self,
        step_type: StepType,
        declaration: &str,
        handler: &str,
        table: TableRequirement,
        invocable: F,
    ) -> Self
    where
        F: Fn(&[ArgumentValue]) -> Result<(), InvocationError> + Send + Sync + 'static,
    {
        let definition =
            StepDefinition::native(self.uid.clone(), step_type, declaration, handler, invocable)
                .with_table(table);
        self.definitions.push(Arc::new(definition));
        self
    }
}

impl StepDefinitionSource for NativeStepSource {
    fn uid(&self) -> &SourceUid {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn step_definitions(&self) -> Vec<Arc<StepDefinition>> {
        self.definitions.clone()
    }
}

/// Definitions declared by the step definition elements of a built file.
#[derive(Debug)]
pub struct FileStepDefinitionSource {
    uid: SourceUid,
    name: String,
    definitions: Vec<Arc<StepDefinition>>,
    last_modified: SystemTime,
}

impl FileStepDefinitionSource {
    /// Create a source for `file`, identified by its source name.
    #[must_use]
    pub fn new(file: &BuiltFile, last_modified: SystemTime) -> Self {
        let uid = SourceUid::new(&file.source_name);
        let definitions = Self::collect(&uid, file);
        Self {
            uid,
            name: file.source_name.clone(),
            definitions,
            last_modified,
        }
    }

    /// Replace the definitions with those of a newer build of the file.
    pub fn update(&mut self, file: &BuiltFile, last_modified: SystemTime) {
        self.definitions = Self::collect(&self.uid, file);
        self.last_modified = last_modified;
    }

    fn collect(uid: &SourceUid, file: &BuiltFile) -> Vec<Arc<StepDefinition>> {
        file.step_definitions
            .iter()
            .map(|element| {
                let mut definition = StepDefinition::new(
                    uid.clone(),
                    element.step_type,
                    element.declaration.clone(),
                    DefinitionKind::File {
                        location: element.location,
                        description: element.description.clone(),
                    },
                )
                .with_table(element.table);
                if let Some(pattern) = &element.pattern {
                    definition = definition.with_pattern(pattern.clone());
                }
                Arc::new(definition)
            })
            .collect()
    }
}

impl StepDefinitionSource for FileStepDefinitionSource {
    fn uid(&self) -> &SourceUid {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn step_definitions(&self) -> Vec<Arc<StepDefinition>> {
        self.definitions.clone()
    }
}

impl UpdatableStepDefinitionSource for FileStepDefinitionSource {
    fn last_modified(&self) -> SystemTime {
        self.last_modified
    }
}

/// A step produced by an interaction set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionStep {
    /// Step type.
    pub step_type: StepType,
    /// Declaration text.
    pub declaration: String,
    /// Components the step applies to.
    pub components: Vec<String>,
    /// Values substituted for placeholders, e.g. the component name.
    pub placeholders: Vec<(String, String)>,
    /// Table requirement.
    pub table: TableRequirement,
}

/// Definitions generated from an interaction set.
#[derive(Debug)]
pub struct InteractionStepSource {
    uid: SourceUid,
    name: String,
    definitions: Vec<Arc<StepDefinition>>,
    last_modified: SystemTime,
}

impl InteractionStepSource {
    /// Create an empty source.
    #[must_use]
    pub fn new(uid: &str, name: impl Into<String>) -> Self {
        Self {
            uid: SourceUid::new(uid),
            name: name.into(),
            definitions: Vec::new(),
            last_modified: SystemTime::UNIX_EPOCH,
        }
    }

    /// Replace the generated steps.
    pub fn set_steps(&mut self, steps: Vec<InteractionStep>, last_modified: SystemTime) {
        self.definitions = steps
            .into_iter()
            .map(|step| {
                Arc::new(
                    StepDefinition::new(
                        self.uid.clone(),
                        step.step_type,
                        step.declaration,
                        DefinitionKind::Interaction {
                            components: step.components,
                            placeholders: step.placeholders,
                        },
                    )
                    .with_table(step.table),
                )
            })
            .collect();
        self.last_modified = last_modified;
    }
}

impl StepDefinitionSource for InteractionStepSource {
    fn uid(&self) -> &SourceUid {
        &self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn step_definitions(&self) -> Vec<Arc<StepDefinition>> {
        self.definitions.clone()
    }
}

impl UpdatableStepDefinitionSource for InteractionStepSource {
    fn last_modified(&self) -> SystemTime {
        self.last_modified
    }
}
