//! Per-source bookkeeping that turns a refresh into a minimal tree diff.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::{debug, instrument, warn};

use crate::definition::{Signature, StepDefinition};
use crate::location::TextRange;
use crate::matching::{DefinitionKey, MatchingTree};
use crate::messages::{CompilerMessage, CompilerMessageCode};
use crate::result::LanguageOperationResult;
use crate::source::{SourceUid, StepDefinitionSource};

/// Counts of tree changes made by one source refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Definitions newly inserted.
    pub added: usize,
    /// Definitions swapped in place under an unchanged signature.
    pub updated: usize,
    /// Definitions the source no longer supplies.
    pub removed: usize,
    /// Definitions rejected with a diagnostic.
    pub rejected: usize,
}

#[derive(Debug)]
struct TrackedSource {
    name: String,
    signatures: HashMap<Signature, DefinitionKey>,
}

#[derive(Debug, Default)]
pub(crate) struct SourceTracker {
    sources: HashMap<SourceUid, TrackedSource>,
}

impl SourceTracker {
    pub(crate) fn is_tracked(&self, uid: &SourceUid) -> bool {
        self.sources.contains_key(uid)
    }

    pub(crate) fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Bring the tree in line with `source`'s current definitions.
    ///
    /// Definitions whose signature is unchanged are replaced in place; new
    /// signatures are inserted and vanished ones removed.
    #[instrument(level = "debug", skip_all, fields(source = %source.uid()))]
    pub(crate) fn refresh<S>(
        &mut self,
        tree: &mut MatchingTree,
        source: &S,
    ) -> LanguageOperationResult<RefreshSummary>
    where
        S: StepDefinitionSource + ?Sized,
    {
        let mut previous = self
            .sources
            .remove(source.uid())
            .map(|tracked| tracked.signatures)
            .unwrap_or_default();
        let mut next: HashMap<Signature, DefinitionKey> = HashMap::new();
        let mut summary = RefreshSummary::default();
        let mut messages = Vec::new();

        for definition in source.step_definitions() {
            if let Err(err) = definition.pattern() {
                messages.push(invalid_declaration(source.name(), &definition, &err.to_string()));
                summary.rejected += 1;
                continue;
            }
            let signature = definition.signature();
            let existing = previous
                .remove(&signature)
                .or_else(|| next.get(&signature).copied());
            let key = match existing {
                Some(key) if tree.replace(key, Arc::clone(&definition)).is_some() => {
                    summary.updated += 1;
                    key
                }
                _ => match tree.add_or_update(Arc::clone(&definition)) {
                    Ok(key) => {
                        summary.added += 1;
                        key
                    }
                    Err(err) => {
                        messages.push(invalid_declaration(
                            source.name(),
                            &definition,
                            &err.to_string(),
                        ));
                        summary.rejected += 1;
                        continue;
                    }
                },
            };
            next.insert(signature, key);
        }

        for (signature, key) in previous {
            if tree.remove(key).is_some() {
                summary.removed += 1;
            } else {
                warn!(declaration = %signature.declaration, "tracked definition missing from tree");
            }
        }

        debug!(
            added = summary.added,
            updated = summary.updated,
            removed = summary.removed,
            rejected = summary.rejected,
            "refreshed step definition source"
        );
        self.sources.insert(
            source.uid().clone(),
            TrackedSource {
                name: source.name().to_string(),
                signatures: next,
            },
        );
        LanguageOperationResult::new(Some(summary), messages)
    }

    /// Drop every definition of `uid`. Returns how many were removed, or
    /// `None` when the source is not tracked.
    pub(crate) fn remove(&mut self, tree: &mut MatchingTree, uid: &SourceUid) -> Option<usize> {
        let tracked = self.sources.remove(uid)?;
        let removed = tracked
            .signatures
            .into_values()
            .filter(|key| tree.remove(*key).is_some())
            .count();
        debug!(source = %uid, name = %tracked.name, removed, "removed step definition source");
        Some(removed)
    }
}

fn invalid_declaration(
    source_name: &str,
    definition: &StepDefinition,
    reason: &str,
) -> CompilerMessage {
    warn!(
        source = source_name,
        declaration = definition.declaration(),
        reason,
        "rejected step definition"
    );
    let range = definition
        .location()
        .map(|location| TextRange::of_text(location, definition.declaration()))
        .unwrap_or_default();
    CompilerMessage::localised(
        Some(source_name),
        CompilerMessageCode::StepDefinitionDeclarationInvalid,
        range,
        |args| {
            args.set("declaration", definition.declaration().to_string());
            args.set("reason", reason.to_string());
        },
    )
}
