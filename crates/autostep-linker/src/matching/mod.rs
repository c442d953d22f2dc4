//! Matching tree holding every registered step definition.
//!
//! Definitions are stored in a trie keyed by their compiled parts, one root
//! per concrete step type. Word edges match a reference token by exact text;
//! argument edges are keyed by hint and quoting, so declarations that differ
//! only in placeholder names share a path.

mod arena;
mod node;
mod search;

use std::ops::Range;
use std::sync::Arc;

use autostep_patterns::{ArgumentPart, SpecificityScore, StepType, TokenisedText};

use crate::definition::StepDefinition;
use crate::error::DefinitionError;
use crate::source::SourceUid;

use arena::{Arena, ArenaKey};
use node::{EdgeKey, Node, NodeId};
use search::Search;

/// Stable handle to a definition held by a [`MatchingTree`].
///
/// Keys are generational: once the definition is removed, the key never
/// resolves again, even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionKey(ArenaKey);

#[derive(Debug)]
struct DefinitionEntry {
    definition: Arc<StepDefinition>,
    node: NodeId,
    specificity: SpecificityScore,
}

#[derive(Debug, Clone, Copy)]
struct Roots {
    given: NodeId,
    when: NodeId,
    then: NodeId,
}

/// Tokens a reference supplied for one argument of a matched definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMatch {
    /// Declaration part the tokens were matched against.
    pub part: ArgumentPart,
    /// Matched token indices, quote boundaries included.
    pub tokens: Range<usize>,
    /// Whether the first token is an excluded opening quote.
    pub start_exclusive: bool,
    /// Whether the last token is an excluded closing quote.
    pub end_exclusive: bool,
}

/// A definition that matched some or all of a statement.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Key of the matched definition.
    pub key: DefinitionKey,
    /// The matched definition.
    pub definition: Arc<StepDefinition>,
    /// Arguments in declaration order. Partial matches may carry fewer
    /// entries than the declaration has placeholders.
    pub arguments: Vec<ArgumentMatch>,
    /// Whether every token was consumed and the declaration ended there.
    pub is_exact: bool,
    /// Number of declaration words matched.
    pub literals_matched: usize,
    /// Specificity of the definition's declaration.
    pub specificity: SpecificityScore,
}

/// Trie of compiled step declarations.
#[derive(Debug)]
pub struct MatchingTree {
    nodes: Arena<Node>,
    roots: Roots,
    definitions: Arena<DefinitionEntry>,
}

impl Default for MatchingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Arena::default();
        let roots = Roots {
            given: NodeId(nodes.insert(Node::default())),
            when: NodeId(nodes.insert(Node::default())),
            then: NodeId(nodes.insert(Node::default())),
        };
        Self {
            nodes,
            roots,
            definitions: Arena::default(),
        }
    }

    fn root(&self, step_type: StepType) -> Option<NodeId> {
        match step_type {
            StepType::Given => Some(self.roots.given),
            StepType::When => Some(self.roots.when),
            StepType::Then => Some(self.roots.then),
            StepType::And => None,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of definitions held.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Number of nodes, roots included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Definition stored under `key`.
    #[must_use]
    pub fn get(&self, key: DefinitionKey) -> Option<&Arc<StepDefinition>> {
        self.definitions.get(key.0).map(|entry| &entry.definition)
    }

    /// Definitions registered by `source`.
    #[must_use]
    pub fn definitions_for_source(&self, source: &SourceUid) -> Vec<Arc<StepDefinition>> {
        self.definitions
            .iter()
            .filter(|(_, entry)| entry.definition.source() == source)
            .map(|(_, entry)| Arc::clone(&entry.definition))
            .collect()
    }

    /// Insert `definition`, or replace a definition from the same source with
    /// an identical step type and declaration in place.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnboundStepType`] for `And` definitions and
    /// [`DefinitionError::InvalidDeclaration`] when the declaration does not
    /// compile.
    pub fn add_or_update(
        &mut self,
        definition: Arc<StepDefinition>,
    ) -> Result<DefinitionKey, DefinitionError> {
        let root = self
            .root(definition.step_type())
            .ok_or(DefinitionError::UnboundStepType(definition.step_type()))?;
        let pattern = definition.pattern().map_err(Clone::clone)?;
        let specificity = SpecificityScore::of(pattern);

        let mut current = root;
        for part in pattern.parts() {
            let edge = EdgeKey::from(part);
            let existing = self.node(current).and_then(|node| node.child(&edge));
            current = match existing {
                Some(child) => child,
                None => self.create_child(current, edge),
            };
        }

        if let Some(key) = self.find_at(current, &definition) {
            if let Some(entry) = self.definitions.get_mut(key.0) {
                entry.definition = definition;
                entry.specificity = specificity;
            }
            return Ok(key);
        }

        let key = DefinitionKey(self.definitions.insert(DefinitionEntry {
            definition,
            node: current,
            specificity,
        }));
        if let Some(node) = self.nodes.get_mut(current.0) {
            node.definitions.push(key);
        }
        Ok(key)
    }

    fn create_child(&mut self, parent: NodeId, edge: EdgeKey) -> NodeId {
        let child = NodeId(self.nodes.insert(Node {
            parent: Some((parent, edge.clone())),
            ..Node::default()
        }));
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.attach(edge, child);
        }
        child
    }

    fn find_at(&self, node: NodeId, definition: &StepDefinition) -> Option<DefinitionKey> {
        self.node(node)?.definitions.iter().copied().find(|key| {
            self.definitions.get(key.0).is_some_and(|entry| {
                entry.definition.source() == definition.source()
                    && entry.definition.is_same_definition(definition)
            })
        })
    }

    /// Swap the definition held under `key` for `definition`, returning the
    /// previous one. `definition` must share the step type and declaration.
    pub fn replace(
        &mut self,
        key: DefinitionKey,
        definition: Arc<StepDefinition>,
    ) -> Option<Arc<StepDefinition>> {
        let entry = self.definitions.get_mut(key.0)?;
        Some(std::mem::replace(&mut entry.definition, definition))
    }

    /// Remove the definition under `key` and prune nodes left empty.
    pub fn remove(&mut self, key: DefinitionKey) -> Option<Arc<StepDefinition>> {
        let entry = self.definitions.remove(key.0)?;
        if let Some(node) = self.nodes.get_mut(entry.node.0) {
            node.definitions.retain(|candidate| *candidate != key);
        }
        self.prune(entry.node);
        Some(entry.definition)
    }

    /// Remove a definition by identity. Returns whether one was found.
    pub fn remove_definition(&mut self, definition: &StepDefinition) -> bool {
        let Some(mut current) = self.root(definition.step_type()) else {
            return false;
        };
        let Ok(pattern) = definition.pattern() else {
            return false;
        };
        for part in pattern.parts() {
            let edge = EdgeKey::from(part);
            match self.node(current).and_then(|node| node.child(&edge)) {
                Some(child) => current = child,
                None => return false,
            }
        }
        self.find_at(current, definition)
            .and_then(|key| self.remove(key))
            .is_some()
    }

    fn prune(&mut self, start: NodeId) {
        let mut current = start;
        loop {
            let Some(node) = self.nodes.get(current.0) else {
                return;
            };
            if !node.is_dead() {
                return;
            }
            let Some((parent, edge)) = node.parent.clone() else {
                return;
            };
            self.nodes.remove(current.0);
            if let Some(parent_node) = self.nodes.get_mut(parent.0) {
                parent_node.detach(&edge);
            }
            current = parent;
        }
    }

    /// Match `text` against definitions of `step_type`.
    ///
    /// Exact matches come first, then partial matches by words matched, with
    /// ties broken by declaration specificity. Partial matches are only
    /// produced when `allow_partial` is set.
    #[must_use]
    pub fn match_reference(
        &self,
        step_type: StepType,
        text: &TokenisedText,
        allow_partial: bool,
    ) -> Vec<MatchResult> {
        let Some(root) = self.root(step_type) else {
            return Vec::new();
        };
        let mut results: Vec<MatchResult> = Search::run(self, root, text, allow_partial)
            .into_iter()
            .filter_map(|raw| {
                let entry = self.definitions.get(raw.key.0)?;
                let pattern = entry.definition.pattern().ok()?;
                let arguments = pattern
                    .arguments()
                    .zip(raw.spans)
                    .map(|(part, span)| ArgumentMatch {
                        part: part.clone(),
                        tokens: span.tokens,
                        start_exclusive: span.start_exclusive,
                        end_exclusive: span.end_exclusive,
                    })
                    .collect();
                Some(MatchResult {
                    key: raw.key,
                    definition: Arc::clone(&entry.definition),
                    arguments,
                    is_exact: raw.is_exact,
                    literals_matched: raw.literals,
                    specificity: entry.specificity,
                })
            })
            .collect();
        results.sort_by(|a, b| {
            b.is_exact
                .cmp(&a.is_exact)
                .then_with(|| b.literals_matched.cmp(&a.literals_matched))
                .then_with(|| b.specificity.cmp(&a.specificity))
        });
        results
    }

    /// Definitions that `text` could be the beginning of.
    #[must_use]
    pub fn completions(&self, step_type: StepType, text: &TokenisedText) -> Vec<MatchResult> {
        self.match_reference(step_type, text, true)
            .into_iter()
            .filter(|result| !result.is_exact)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SourceLocation;
    use autostep_patterns::tokenise_statement;
    use rstest::rstest;

    fn def(step_type: StepType, declaration: &str) -> Arc<StepDefinition> {
        Arc::new(StepDefinition::file(
            SourceUid::new("test"),
            step_type,
            declaration,
            SourceLocation::new(1, 1),
        ))
    }

    fn add(tree: &mut MatchingTree, step_type: StepType, declaration: &str) -> DefinitionKey {
        match tree.add_or_update(def(step_type, declaration)) {
            Ok(key) => key,
            Err(err) => panic!("{declaration:?} should be accepted: {err}"),
        }
    }

    fn declarations(results: &[MatchResult]) -> Vec<&str> {
        results
            .iter()
            .map(|result| result.definition.declaration())
            .collect()
    }

    #[test]
    fn same_shape_declarations_share_nodes() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I have {a} apples");
        let nodes = tree.node_count();
        add(&mut tree, StepType::Given, "I have {b} apples");
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.definition_count(), 2);
    }

    #[test]
    fn re_adding_replaces_in_place() {
        let mut tree = MatchingTree::new();
        let first = add(&mut tree, StepType::Given, "I log in");
        let second = add(&mut tree, StepType::Given, "I log in");
        assert_eq!(first, second);
        assert_eq!(tree.definition_count(), 1);
    }

    #[test]
    fn rejects_and_definitions() {
        let mut tree = MatchingTree::new();
        let result = tree.add_or_update(def(StepType::And, "anything"));
        assert_eq!(
            result.err(),
            Some(DefinitionError::UnboundStepType(StepType::And))
        );
    }

    #[test]
    fn removal_prunes_back_to_roots() {
        let mut tree = MatchingTree::new();
        let empty = tree.node_count();
        let key = add(&mut tree, StepType::When, "I press {key} twice");
        assert!(tree.node_count() > empty);
        assert!(tree.remove(key).is_some());
        assert_eq!(tree.node_count(), empty);
        assert!(tree.get(key).is_none());
        assert!(tree.remove(key).is_none());
    }

    #[test]
    fn removal_keeps_shared_prefixes() {
        let mut tree = MatchingTree::new();
        let short = add(&mut tree, StepType::Given, "I have");
        add(&mut tree, StepType::Given, "I have apples");
        tree.remove(short);
        let results = tree.match_reference(
            StepType::Given,
            &tokenise_statement("I have apples"),
            false,
        );
        assert_eq!(declarations(&results), vec!["I have apples"]);
    }

    #[test]
    fn remove_definition_locates_by_identity() {
        let mut tree = MatchingTree::new();
        let definition = def(StepType::Then, "it works");
        assert!(tree.add_or_update(Arc::clone(&definition)).is_ok());
        assert!(tree.remove_definition(&definition));
        assert_eq!(tree.definition_count(), 0);
        assert!(!tree.remove_definition(&definition));
    }

    #[rstest]
    #[case("I have 5 apples", true)]
    #[case("I have many red apples", true)]
    #[case("I have apples", false)]
    #[case("I have 5 pears", false)]
    fn unconstrained_argument_spans_tokens(#[case] text: &str, #[case] matched: bool) {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I have {count} apples");
        let results = tree.match_reference(StepType::Given, &tokenise_statement(text), false);
        assert_eq!(!results.is_empty(), matched, "{text}");
    }

    #[test]
    fn quoted_argument_runs_to_closing_quote() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I type '{value}' here");
        let text = tokenise_statement("I type 'hello big world' here");
        let results = tree.match_reference(StepType::Given, &text, false);
        let Some(result) = results.first() else {
            panic!("expected a match");
        };
        let Some(argument) = result.arguments.first() else {
            panic!("expected an argument");
        };
        assert_eq!(argument.part.name, "value");
        assert_eq!(argument.tokens, 2..7);
        assert!(argument.start_exclusive && argument.end_exclusive);
    }

    #[test]
    fn empty_quotes_still_bind() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I type '{value}'");
        let text = tokenise_statement("I type ''");
        let results = tree.match_reference(StepType::Given, &text, false);
        let tokens = results
            .first()
            .and_then(|result| result.arguments.first())
            .map(|argument| argument.tokens.clone());
        assert_eq!(tokens, Some(2..4));
    }

    #[test]
    fn numeric_argument_takes_single_number() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I wait {n:int} seconds");
        let matches = |text: &str| {
            !tree
                .match_reference(StepType::Given, &tokenise_statement(text), false)
                .is_empty()
        };
        assert!(matches("I wait 10 seconds"));
        assert!(matches("I wait <delay> seconds"));
        assert!(!matches("I wait ten seconds"));
        assert!(!matches("I wait 1 2 seconds"));
    }

    #[test]
    fn step_types_are_isolated() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "a thing");
        let text = tokenise_statement("a thing");
        assert!(tree.match_reference(StepType::When, &text, false).is_empty());
        assert!(tree.match_reference(StepType::And, &text, false).is_empty());
    }

    #[test]
    fn ambiguous_shapes_return_every_exact_match() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I have {a} apples");
        add(&mut tree, StepType::Given, "I have {b} apples");
        let results = tree.match_reference(
            StepType::Given,
            &tokenise_statement("I have 3 apples"),
            false,
        );
        assert_eq!(results.iter().filter(|r| r.is_exact).count(), 2);
        let names: Vec<_> = results
            .iter()
            .filter_map(|r| r.arguments.first().map(|a| a.part.name.clone()))
            .collect();
        assert!(names.contains(&"a".to_string()));
        assert!(names.contains(&"b".to_string()));
    }

    #[test]
    fn partial_matches_follow_exact_ones() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I click");
        add(&mut tree, StepType::Given, "I click the button");
        add(&mut tree, StepType::Given, "I click {target}");
        add(&mut tree, StepType::Given, "I clone the repo");
        let results = tree.match_reference(StepType::Given, &tokenise_statement("I click"), true);
        let Some(first) = results.first() else {
            panic!("expected results");
        };
        assert!(first.is_exact);
        assert_eq!(first.definition.declaration(), "I click");
        assert!(results.iter().skip(1).all(|r| !r.is_exact));
        let partial = declarations(&results);
        assert!(partial.contains(&"I click the button"));
        assert!(partial.contains(&"I click {target}"));
        assert!(!partial.contains(&"I clone the repo"));
    }

    #[test]
    fn completions_extend_trailing_word_prefix() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::When, "I press enter");
        add(&mut tree, StepType::When, "I print the page");
        add(&mut tree, StepType::When, "I open the menu");
        let results = tree.completions(StepType::When, &tokenise_statement("I pr"));
        let mut found = declarations(&results);
        found.sort_unstable();
        assert_eq!(found, vec!["I press enter", "I print the page"]);
    }

    #[test]
    fn partial_ranking_prefers_more_literals() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "I {verb} the door");
        add(&mut tree, StepType::Given, "I open the window");
        let results = tree.completions(StepType::Given, &tokenise_statement("I open"));
        assert_eq!(
            results.first().map(|r| r.definition.declaration()),
            Some("I open the window")
        );
    }

    #[test]
    fn definitions_for_source_filters_by_uid() {
        let mut tree = MatchingTree::new();
        add(&mut tree, StepType::Given, "one");
        let other = Arc::new(StepDefinition::file(
            SourceUid::new("other"),
            StepType::Given,
            "two",
            SourceLocation::new(1, 1),
        ));
        assert!(tree.add_or_update(other).is_ok());
        assert_eq!(tree.definitions_for_source(&SourceUid::new("other")).len(), 1);
        assert_eq!(tree.definitions_for_source(&SourceUid::new("test")).len(), 1);
    }
}
