//! Result wrappers for registration and linking operations.

use std::collections::BTreeSet;

use crate::messages::CompilerMessage;
use crate::source::SourceUid;

/// Outcome of a language operation: an optional output plus the messages
/// produced along the way.
///
/// The operation succeeded when no message is an error. Warnings and
/// informational messages never affect success.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageOperationResult<T = ()> {
    output: Option<T>,
    messages: Vec<CompilerMessage>,
}

impl<T> Default for LanguageOperationResult<T> {
    fn default() -> Self {
        Self {
            output: None,
            messages: Vec::new(),
        }
    }
}

impl<T> LanguageOperationResult<T> {
    /// Create a result.
    #[must_use]
    pub fn new(output: Option<T>, messages: Vec<CompilerMessage>) -> Self {
        Self { output, messages }
    }

    /// Result carrying `output` and no messages.
    #[must_use]
    pub fn with_output(output: T) -> Self {
        Self::new(Some(output), Vec::new())
    }

    /// Whether no error was reported.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.messages.iter().any(CompilerMessage::is_error)
    }

    /// Operation output, if any.
    #[must_use]
    pub fn output(&self) -> Option<&T> {
        self.output.as_ref()
    }

    /// Messages in the order they were produced.
    #[must_use]
    pub fn messages(&self) -> &[CompilerMessage] {
        &self.messages
    }

    /// Append a message.
    pub fn push(&mut self, message: CompilerMessage) {
        self.messages.push(message);
    }

    /// Append every message from `messages`.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = CompilerMessage>) {
        self.messages.extend(messages);
    }

    /// Split into output and messages.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, Vec<CompilerMessage>) {
        (self.output, self.messages)
    }
}

/// Result of linking one built file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkResult {
    source_name: String,
    messages: Vec<CompilerMessage>,
    referenced_sources: BTreeSet<SourceUid>,
    bound_steps: usize,
    total_steps: usize,
}

impl LinkResult {
    pub(crate) fn new(source_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn record_step(&mut self, bound: Option<SourceUid>, messages: Vec<CompilerMessage>) {
        self.total_steps += 1;
        if let Some(source) = bound {
            self.bound_steps += 1;
            self.referenced_sources.insert(source);
        }
        self.messages.extend(messages);
    }

    /// Name of the linked file.
    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether every step reference bound without an error.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.messages.iter().any(CompilerMessage::is_error)
    }

    /// Messages in document order.
    #[must_use]
    pub fn messages(&self) -> &[CompilerMessage] {
        &self.messages
    }

    /// Sources that supplied at least one successful binding. The file needs
    /// relinking when any of them changes.
    #[must_use]
    pub fn referenced_sources(&self) -> &BTreeSet<SourceUid> {
        &self.referenced_sources
    }

    /// Number of step references that are now bound.
    #[must_use]
    pub fn bound_steps(&self) -> usize {
        self.bound_steps
    }

    /// Number of step references visited.
    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.total_steps
    }
}
