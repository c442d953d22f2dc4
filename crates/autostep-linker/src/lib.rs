//! Step linker for AutoStep test files.
//!
//! The linker holds step definitions from any number of sources in a
//! matching tree and binds the step references of built test files to them.
//! Sources can be refreshed incrementally: only definitions whose step type
//! and declaration changed are touched. Problems found while linking are
//! returned as [`CompilerMessage`]s rather than errors, so one bad step never
//! stops the rest of a file from binding.

mod arguments;
mod built;
mod definition;
mod error;
mod linker;
mod localisation;
mod location;
mod matching;
mod messages;
mod reference;
mod result;
mod source;
mod tracking;

pub use built::{
    BackgroundElement, BuiltFile, ExamplesElement, FeatureElement, ScenarioElement,
    StepCollectionBuilder, StepDefinitionElement, TableElement,
};
pub use definition::{DefinitionKind, Invocable, Signature, StepDefinition, TableRequirement};
pub use error::{DefinitionError, InvocationError, LinkerError};
pub use linker::{Linker, LinkerOptions};
pub use localisation::{
    LocalisationError, Localisations, ScopedLocalisation, message_with_args, select_localisations,
    strip_directional_isolates,
};
pub use location::{SourceLocation, TextRange};
pub use matching::{ArgumentMatch, DefinitionKey, MatchResult, MatchingTree};
pub use messages::{
    CompilerMessage, CompilerMessageCode, CompilerMessageLevel, UnknownMessageCode,
};
pub use reference::{ArgumentBinding, ArgumentValue, StepReference, StepReferenceBinding};
pub use result::{LanguageOperationResult, LinkResult};
pub use source::{
    FileStepDefinitionSource, InteractionStep, InteractionStepSource, NativeStepSource, SourceUid,
    StepDefinitionSource, UpdatableStepDefinitionSource,
};
pub use tracking::RefreshSummary;
