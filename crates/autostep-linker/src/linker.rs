//! The linker: source registration and step binding.

use std::sync::atomic::{AtomicBool, Ordering};

use autostep_patterns::{StepType, tokenise_statement};
use tracing::{debug, info, instrument};

use crate::arguments::bind_argument;
use crate::built::BuiltFile;
use crate::definition::TableRequirement;
use crate::error::LinkerError;
use crate::location::TextRange;
use crate::matching::{MatchResult, MatchingTree};
use crate::messages::{CompilerMessage, CompilerMessageCode};
use crate::reference::{StepReference, StepReferenceBinding};
use crate::result::{LanguageOperationResult, LinkResult};
use crate::source::{SourceUid, StepDefinitionSource, UpdatableStepDefinitionSource};
use crate::tracking::{RefreshSummary, SourceTracker};

/// Behaviour switches for a [`Linker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkerOptions {
    /// Warn when a quoted argument has whitespace just inside its quotes.
    pub whitespace_warnings: bool,
}

impl Default for LinkerOptions {
    fn default() -> Self {
        Self {
            whitespace_warnings: true,
        }
    }
}

/// Binds step references to the definitions of registered sources.
///
/// Source management needs `&mut self`; linking only reads, so one linker
/// can serve many files in parallel between registrations.
///
/// # Examples
/// ```
/// use autostep_linker::{Linker, NativeStepSource, StepReference, SourceLocation};
/// use autostep_patterns::StepType;
///
/// let mut linker = Linker::new();
/// let source = NativeStepSource::new("native", "Native steps")
///     .step(StepType::Given, "I have {count:int} apples", "apples", |_| Ok(()));
/// assert!(linker.add_step_definition_source(&source).success());
///
/// let mut step = StepReference::new(
///     StepType::Given,
///     StepType::Given,
///     "I have 3 apples",
///     SourceLocation::new(1, 7),
/// );
/// assert!(linker.bind_single_step(&mut step, None).success());
/// assert!(step.is_bound());
/// ```
#[derive(Debug, Default)]
pub struct Linker {
    tree: MatchingTree,
    tracker: SourceTracker,
    options: LinkerOptions,
}

impl Linker {
    /// Create a linker with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a linker with `options`.
    #[must_use]
    pub fn with_options(options: LinkerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Active options.
    #[must_use]
    pub fn options(&self) -> LinkerOptions {
        self.options
    }

    /// The tree holding every registered definition.
    #[must_use]
    pub fn matching_tree(&self) -> &MatchingTree {
        &self.tree
    }

    /// Whether a source with `uid` is registered.
    #[must_use]
    pub fn is_registered(&self, uid: &SourceUid) -> bool {
        self.tracker.is_tracked(uid)
    }

    /// Number of registered sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.tracker.source_count()
    }

    /// Register `source`, discarding whatever a source with the same uid
    /// registered before.
    ///
    /// Declarations that fail to compile are reported and skipped; the rest
    /// of the source is still registered.
    #[instrument(skip_all, fields(source = %source.uid()))]
    pub fn add_step_definition_source<S>(
        &mut self,
        source: &S,
    ) -> LanguageOperationResult<RefreshSummary>
    where
        S: StepDefinitionSource + ?Sized,
    {
        if let Some(removed) = self.tracker.remove(&mut self.tree, source.uid()) {
            debug!(removed, "replacing registered source");
        }
        self.tracker.refresh(&mut self.tree, source)
    }

    /// Register `source`, or diff it against its previous registration so
    /// unchanged definitions keep their place in the tree.
    #[instrument(skip_all, fields(source = %source.uid()))]
    pub fn add_or_update_step_definition_source<S>(
        &mut self,
        source: &S,
    ) -> LanguageOperationResult<RefreshSummary>
    where
        S: UpdatableStepDefinitionSource + ?Sized,
    {
        self.tracker.refresh(&mut self.tree, source)
    }

    /// Unregister a source and drop its definitions.
    ///
    /// # Errors
    ///
    /// Returns [`LinkerError::SourceNotRegistered`] for unknown uids.
    pub fn remove_step_definition_source(&mut self, uid: &SourceUid) -> Result<usize, LinkerError> {
        self.tracker
            .remove(&mut self.tree, uid)
            .ok_or_else(|| LinkerError::SourceNotRegistered(uid.clone()))
    }

    /// Bind every step of `file`.
    ///
    /// Each step is bound independently, so one failure never prevents the
    /// others from binding. Existing bindings are replaced.
    #[instrument(skip_all, fields(file = %file.source_name))]
    pub fn link(&self, file: &mut BuiltFile) -> LinkResult {
        let mut result = LinkResult::new(&file.source_name);
        let source_name = file.source_name.clone();
        for step in file.steps_mut() {
            let (_, messages) = self.bind_single_step(step, Some(&source_name)).into_parts();
            let bound = step
                .binding()
                .map(|binding| binding.definition().source().clone());
            result.record_step(bound, messages);
        }
        debug!(
            bound = result.bound_steps(),
            total = result.total_steps(),
            success = result.success(),
            "linked file"
        );
        result
    }

    /// Link each file in turn, stopping early once `cancel` is set.
    /// Files skipped by cancellation produce no result.
    pub fn link_all(&self, files: &mut [BuiltFile], cancel: &AtomicBool) -> Vec<LinkResult> {
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            if cancel.load(Ordering::Relaxed) {
                info!(linked = results.len(), "linking cancelled");
                break;
            }
            results.push(self.link(file));
        }
        results
    }

    /// Bind one step reference, replacing any existing binding.
    ///
    /// The step stays unbound when no definition, or more than one, matches
    /// exactly. Argument diagnostics do not prevent binding.
    pub fn bind_single_step(
        &self,
        step: &mut StepReference,
        source_name: Option<&str>,
    ) -> LanguageOperationResult {
        let mut messages = Vec::new();
        let mut exact = self
            .tree
            .match_reference(step.binding_type(), step.tokenised(), false)
            .into_iter()
            .filter(|result| result.is_exact);
        let Some(found) = exact.next() else {
            step.set_binding(None);
            messages.push(CompilerMessage::localised(
                source_name,
                CompilerMessageCode::LinkerNoMatchingStepDefinition,
                step.range(),
                |args| args.set("step", step.text().to_string()),
            ));
            return LanguageOperationResult::new(None, messages);
        };
        let others: Vec<MatchResult> = exact.collect();
        if !others.is_empty() {
            step.set_binding(None);
            messages.push(ambiguity(step, source_name, &found, &others));
            return LanguageOperationResult::new(None, messages);
        }

        let mut arguments = Vec::with_capacity(found.arguments.len());
        for matched in &found.arguments {
            let (binding, argument_messages) =
                bind_argument(step, matched, self.options, source_name);
            arguments.push(binding);
            messages.extend(argument_messages);
        }
        let definition = &found.definition;
        if let Some(message) =
            table_check(step, source_name, definition.table(), definition.declaration())
        {
            messages.push(message);
        }
        step.set_binding(Some(StepReferenceBinding::new(found.definition, arguments)));
        LanguageOperationResult::new(None, messages)
    }

    /// Exact and, when `allow_partial` is set, partial matches for `text`.
    #[must_use]
    pub fn match_step(
        &self,
        step_type: StepType,
        text: &str,
        allow_partial: bool,
    ) -> Vec<MatchResult> {
        self.tree
            .match_reference(step_type, &tokenise_statement(text), allow_partial)
    }

    /// Definitions `text` could be completed to.
    #[must_use]
    pub fn completions(&self, step_type: StepType, text: &str) -> Vec<MatchResult> {
        self.tree.completions(step_type, &tokenise_statement(text))
    }
}

fn ambiguity(
    step: &StepReference,
    source_name: Option<&str>,
    first: &MatchResult,
    others: &[MatchResult],
) -> CompilerMessage {
    let definitions = std::iter::once(first)
        .chain(others)
        .map(|result| {
            let definition = &result.definition;
            format!("{} `{}`", definition.source(), definition.declaration())
        })
        .collect::<Vec<_>>()
        .join(", ");
    let count = others.len() + 1;
    CompilerMessage::localised(
        source_name,
        CompilerMessageCode::LinkerMultipleMatchingDefinitions,
        step.range(),
        |args| {
            args.set("count", count);
            args.set("step", step.text().to_string());
            args.set("definitions", definitions);
        },
    )
}

fn table_check(
    step: &StepReference,
    source_name: Option<&str>,
    requirement: TableRequirement,
    declaration: &str,
) -> Option<CompilerMessage> {
    let (code, range) = match (requirement, step.table()) {
        (TableRequirement::Required, None) => {
            (CompilerMessageCode::LinkerTableRequired, step.range())
        }
        (TableRequirement::NotSupported, Some(table)) => (
            CompilerMessageCode::LinkerTableNotSupported,
            TextRange::point(table.location),
        ),
        _ => return None,
    };
    Some(CompilerMessage::localised(source_name, code, range, |args| {
        args.set("declaration", declaration.to_string());
    }))
}
