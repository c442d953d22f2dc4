//! Depth-first walk of the matching tree against a tokenised statement.

use std::ops::Range;

use autostep_patterns::{StepTokenKind, TokenisedText};
use hashbrown::{HashMap, HashSet};

use super::node::{ArgumentEdge, Node, NodeId};
use super::{DefinitionKey, MatchingTree};

/// Tokens an argument edge consumed on the current path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArgumentSpan {
    pub tokens: Range<usize>,
    pub start_exclusive: bool,
    pub end_exclusive: bool,
}

#[derive(Debug)]
pub(crate) struct RawMatch {
    pub key: DefinitionKey,
    pub spans: Vec<ArgumentSpan>,
    pub is_exact: bool,
    pub literals: usize,
}

pub(crate) struct Search<'t> {
    tree: &'t MatchingTree,
    text: &'t TokenisedText,
    allow_partial: bool,
    visited: HashSet<(NodeId, usize)>,
    path: Vec<ArgumentSpan>,
    found: HashMap<DefinitionKey, usize>,
    results: Vec<RawMatch>,
}

impl<'t> Search<'t> {
    pub(crate) fn run(
        tree: &'t MatchingTree,
        root: NodeId,
        text: &'t TokenisedText,
        allow_partial: bool,
    ) -> Vec<RawMatch> {
        let mut search = Self {
            tree,
            text,
            allow_partial,
            visited: HashSet::new(),
            path: Vec::new(),
            found: HashMap::new(),
            results: Vec::new(),
        };
        search.visit(root, 0, 0);
        search.results
    }

    fn kind(&self, index: usize) -> Option<&'t StepTokenKind> {
        self.text.get(index).map(|token| &token.kind)
    }

    fn token_text(&self, index: usize) -> Option<&'t str> {
        self.text.get(index).map(|token| self.text.token_text(token))
    }

    // The literal count reaching a node is fixed by its depth, so a state is
    // fully described by (node, position).
    fn visit(&mut self, id: NodeId, pos: usize, literals: usize) {
        if !self.visited.insert((id, pos)) {
            return;
        }
        let tree = self.tree;
        let Some(node) = tree.node(id) else {
            return;
        };
        let len = self.text.len();
        if pos >= len {
            for key in &node.definitions {
                self.record(*key, true, literals);
            }
            if self.allow_partial {
                self.collect_partial(id, literals, true);
            }
            return;
        }

        if let Some(word) = self.token_text(pos) {
            if let Some(child) = node.words.get(word) {
                self.visit(*child, pos + 1, literals + 1);
            }
            if self.allow_partial && pos + 1 == len {
                for (candidate, child) in &node.words {
                    if candidate.len() > word.len() && candidate.starts_with(word) {
                        self.collect_partial(*child, literals, false);
                    }
                }
            }
        }

        for (edge, child) in &node.arguments {
            self.visit_argument(*edge, *child, pos, literals);
        }
    }

    fn visit_argument(&mut self, edge: ArgumentEdge, child: NodeId, pos: usize, literals: usize) {
        let len = self.text.len();
        if let Some(quote) = edge.quote {
            if !matches!(self.kind(pos), Some(StepTokenKind::Quote(q)) if *q == quote) {
                return;
            }
            let close = (pos + 1..len)
                .find(|&i| matches!(self.kind(i), Some(StepTokenKind::Quote(q)) if *q == quote));
            match close {
                Some(end) => self.descend(
                    child,
                    ArgumentSpan {
                        tokens: pos..end + 1,
                        start_exclusive: true,
                        end_exclusive: true,
                    },
                    literals,
                ),
                None if self.allow_partial => {
                    self.path.push(ArgumentSpan {
                        tokens: pos..len,
                        start_exclusive: true,
                        end_exclusive: false,
                    });
                    self.collect_partial(child, literals, false);
                    self.path.pop();
                }
                None => {}
            }
            return;
        }

        if edge.is_numeric() {
            if matches!(
                self.kind(pos),
                Some(StepTokenKind::Int | StepTokenKind::Float | StepTokenKind::Variable(_))
            ) {
                self.descend(child, unquoted(pos..pos + 1), literals);
            }
            return;
        }

        let tree = self.tree;
        let Some(child_node) = tree.node(child) else {
            return;
        };
        for end in pos + 1..=len {
            if self.can_stop_at(child_node, end) {
                self.descend(child, unquoted(pos..end), literals);
            }
        }
    }

    /// Whether an unconstrained argument ending before token `end` leaves the
    /// walk anywhere to go.
    fn can_stop_at(&self, next: &Node, end: usize) -> bool {
        let len = self.text.len();
        if end >= len || !next.arguments.is_empty() {
            return true;
        }
        if self.allow_partial && end + 1 == len {
            return true;
        }
        self.token_text(end)
            .is_some_and(|word| next.words.contains_key(word))
    }

    fn descend(&mut self, child: NodeId, span: ArgumentSpan, literals: usize) {
        let next = span.tokens.end;
        self.path.push(span);
        self.visit(child, next, literals);
        self.path.pop();
    }

    fn collect_partial(&mut self, start: NodeId, literals: usize, skip_start: bool) {
        let tree = self.tree;
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(node) = tree.node(id) else {
                continue;
            };
            if !(skip_start && id == start) {
                for key in &node.definitions {
                    self.record(*key, false, literals);
                }
            }
            stack.extend(node.children());
        }
    }

    fn record(&mut self, key: DefinitionKey, is_exact: bool, literals: usize) {
        if let Some(&index) = self.found.get(&key) {
            if let Some(existing) = self.results.get_mut(index) {
                if is_exact && !existing.is_exact {
                    existing.spans.clone_from(&self.path);
                    existing.is_exact = true;
                    existing.literals = literals;
                }
            }
            return;
        }
        self.found.insert(key, self.results.len());
        self.results.push(RawMatch {
            key,
            spans: self.path.clone(),
            is_exact,
            literals,
        });
    }
}

fn unquoted(tokens: Range<usize>) -> ArgumentSpan {
    ArgumentSpan {
        tokens,
        start_exclusive: false,
        end_exclusive: false,
    }
}
