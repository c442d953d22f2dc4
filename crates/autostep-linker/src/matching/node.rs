//! Trie nodes and edge keys.

use autostep_patterns::{ArgumentPart, ArgumentType, DefinitionPart};
use hashbrown::HashMap;

use super::DefinitionKey;
use super::arena::ArenaKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) ArenaKey);

/// Shape of an argument edge. Arguments with different names but the same
/// hint and quoting share an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ArgumentEdge {
    pub hint: Option<ArgumentType>,
    pub quote: Option<char>,
}

impl ArgumentEdge {
    pub(crate) fn is_numeric(self) -> bool {
        self.hint.is_some_and(ArgumentType::is_numeric)
    }
}

impl From<&ArgumentPart> for ArgumentEdge {
    fn from(part: &ArgumentPart) -> Self {
        Self {
            hint: part.hint,
            quote: part.quote,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum EdgeKey {
    Word(Box<str>),
    Argument(ArgumentEdge),
}

impl From<&DefinitionPart> for EdgeKey {
    fn from(part: &DefinitionPart) -> Self {
        match part {
            DefinitionPart::Word(word) => Self::Word(word.text.as_str().into()),
            DefinitionPart::Argument(arg) => Self::Argument(arg.into()),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Node {
    /// Parent and the edge leading here; `None` for roots.
    pub parent: Option<(NodeId, EdgeKey)>,
    pub words: HashMap<Box<str>, NodeId>,
    pub arguments: Vec<(ArgumentEdge, NodeId)>,
    /// Definitions whose declaration ends at this node.
    pub definitions: Vec<DefinitionKey>,
}

impl Node {
    pub(crate) fn child(&self, edge: &EdgeKey) -> Option<NodeId> {
        match edge {
            EdgeKey::Word(text) => self.words.get(text).copied(),
            EdgeKey::Argument(shape) => self
                .arguments
                .iter()
                .find(|(candidate, _)| candidate == shape)
                .map(|(_, id)| *id),
        }
    }

    pub(crate) fn attach(&mut self, edge: EdgeKey, child: NodeId) {
        match edge {
            EdgeKey::Word(text) => {
                self.words.insert(text, child);
            }
            EdgeKey::Argument(shape) => self.arguments.push((shape, child)),
        }
    }

    pub(crate) fn detach(&mut self, edge: &EdgeKey) {
        match edge {
            EdgeKey::Word(text) => {
                self.words.remove(text);
            }
            EdgeKey::Argument(shape) => self.arguments.retain(|(candidate, _)| candidate != shape),
        }
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.words
            .values()
            .copied()
            .chain(self.arguments.iter().map(|(_, id)| *id))
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.definitions.is_empty() && self.words.is_empty() && self.arguments.is_empty()
    }
}
