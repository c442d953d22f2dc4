//! Step references and the bindings the linker attaches to them.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

use autostep_patterns::{
    ArgumentPart, ArgumentType, StepToken, StepType, TokenisedText, tokenise_statement,
};

use crate::built::TableElement;
use crate::definition::{DefinitionKind, StepDefinition};
use crate::error::InvocationError;
use crate::location::{SourceLocation, TextRange};

/// Value of a bound argument, coerced from its inferred type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// Text with escapes resolved.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Decimal(f64),
    /// Value containing variables or interpolation, resolved at run time.
    Deferred(String),
}

/// The tokens a step reference supplied for one argument part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentBinding {
    part: ArgumentPart,
    tokens: Range<usize>,
    start_exclusive: bool,
    end_exclusive: bool,
    determined_type: Option<ArgumentType>,
    raw_text: String,
}

impl ArgumentBinding {
    pub(crate) fn new(
        part: ArgumentPart,
        tokens: Range<usize>,
        start_exclusive: bool,
        end_exclusive: bool,
        determined_type: Option<ArgumentType>,
        raw_text: String,
    ) -> Self {
        Self {
            part,
            tokens,
            start_exclusive,
            end_exclusive,
            determined_type,
            raw_text,
        }
    }

    /// Declaration part the value is bound to.
    #[must_use]
    pub fn part(&self) -> &ArgumentPart {
        &self.part
    }

    /// Placeholder name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.part.name
    }

    /// Indices of every matched token, quote boundaries included.
    #[must_use]
    pub fn tokens(&self) -> Range<usize> {
        self.tokens.clone()
    }

    /// Whether the first matched token is a boundary excluded from the value.
    #[must_use]
    pub fn start_exclusive(&self) -> bool {
        self.start_exclusive
    }

    /// Whether the last matched token is a boundary excluded from the value.
    #[must_use]
    pub fn end_exclusive(&self) -> bool {
        self.end_exclusive
    }

    /// Indices of the tokens forming the value.
    #[must_use]
    pub fn content_tokens(&self) -> Range<usize> {
        content_range(&self.tokens, self.start_exclusive, self.end_exclusive)
    }

    /// Inferred type, or `None` when only known at run time.
    #[must_use]
    pub fn determined_type(&self) -> Option<ArgumentType> {
        self.determined_type
    }

    /// Source text of the value, without quote boundaries.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Coerce the raw text according to the inferred type. Values whose
    /// number does not fit the target type fall back to text.
    #[must_use]
    pub fn value(&self) -> ArgumentValue {
        match self.determined_type {
            Some(ArgumentType::NumericInteger) => self
                .raw_text
                .parse()
                .map_or_else(|_| ArgumentValue::Text(self.raw_text.clone()), ArgumentValue::Integer),
            Some(ArgumentType::NumericDecimal) => self
                .raw_text
                .parse()
                .map_or_else(|_| ArgumentValue::Text(self.raw_text.clone()), ArgumentValue::Decimal),
            Some(ArgumentType::Text) => ArgumentValue::Text(unescape(&self.raw_text)),
            None => ArgumentValue::Deferred(self.raw_text.clone()),
        }
    }
}

pub(crate) fn content_range(
    tokens: &Range<usize>,
    start_exclusive: bool,
    end_exclusive: bool,
) -> Range<usize> {
    let start = tokens.start + usize::from(start_exclusive);
    let end = tokens.end.saturating_sub(usize::from(end_exclusive)).max(start);
    start..end
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

/// The definition a step reference is bound to, with its argument values.
#[derive(Debug, Clone)]
pub struct StepReferenceBinding {
    definition: Arc<StepDefinition>,
    arguments: Vec<ArgumentBinding>,
    placeholders: Option<BTreeMap<String, String>>,
}

impl StepReferenceBinding {
    pub(crate) fn new(definition: Arc<StepDefinition>, arguments: Vec<ArgumentBinding>) -> Self {
        let placeholders = match definition.kind() {
            DefinitionKind::Interaction { placeholders, .. } if !placeholders.is_empty() => {
                Some(placeholders.iter().cloned().collect())
            }
            _ => None,
        };
        Self {
            definition,
            arguments,
            placeholders,
        }
    }

    /// Bound definition.
    #[must_use]
    pub fn definition(&self) -> &Arc<StepDefinition> {
        &self.definition
    }

    /// Argument bindings in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &[ArgumentBinding] {
        &self.arguments
    }

    /// Argument bound to placeholder `name`.
    #[must_use]
    pub fn argument(&self, name: &str) -> Option<&ArgumentBinding> {
        self.arguments.iter().find(|arg| arg.name() == name)
    }

    /// Placeholder values supplied by an interaction definition.
    #[must_use]
    pub fn placeholders(&self) -> Option<&BTreeMap<String, String>> {
        self.placeholders.as_ref()
    }

    /// Coerced argument values in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<ArgumentValue> {
        self.arguments.iter().map(ArgumentBinding::value).collect()
    }

    /// Invoke the bound definition with the coerced argument values.
    ///
    /// # Errors
    ///
    /// Propagates [`StepDefinition::invoke`] failures.
    pub fn invoke(&self) -> Result<(), InvocationError> {
        self.definition.invoke(&self.values())
    }
}

/// A step used inside a test file.
#[derive(Debug, Clone)]
pub struct StepReference {
    step_type: StepType,
    binding_type: StepType,
    text: TokenisedText,
    location: SourceLocation,
    table: Option<TableElement>,
    binding: Option<StepReferenceBinding>,
}

impl StepReference {
    /// Create an unbound reference. `location` is the position of the first
    /// character of `text`.
    #[must_use]
    pub fn new(
        step_type: StepType,
        binding_type: StepType,
        text: &str,
        location: SourceLocation,
    ) -> Self {
        Self {
            step_type,
            binding_type,
            text: tokenise_statement(text),
            location,
            table: None,
            binding: None,
        }
    }

    /// Attach a table.
    #[must_use]
    pub fn with_table(mut self, table: TableElement) -> Self {
        self.table = Some(table);
        self
    }

    /// Keyword as written.
    #[must_use]
    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    /// Concrete type used for binding.
    #[must_use]
    pub fn binding_type(&self) -> StepType {
        self.binding_type
    }

    /// Statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.text()
    }

    /// Frozen tokens of the statement.
    #[must_use]
    pub fn tokenised(&self) -> &TokenisedText {
        &self.text
    }

    /// Position of the statement text.
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Attached table, if any.
    #[must_use]
    pub fn table(&self) -> Option<&TableElement> {
        self.table.as_ref()
    }

    /// Current binding, if the last link succeeded.
    #[must_use]
    pub fn binding(&self) -> Option<&StepReferenceBinding> {
        self.binding.as_ref()
    }

    /// Whether the reference is bound.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub(crate) fn set_binding(&mut self, binding: Option<StepReferenceBinding>) {
        self.binding = binding;
    }

    /// Range covering the whole statement text.
    #[must_use]
    pub fn range(&self) -> TextRange {
        TextRange::of_text(self.location, self.text.text())
    }

    /// Range covering tokens `tokens`, or the whole statement when empty.
    #[must_use]
    pub fn token_range(&self, tokens: Range<usize>) -> TextRange {
        let first = self.text.get(tokens.start);
        let last = tokens.end.checked_sub(1).and_then(|i| self.text.get(i));
        match (first, last) {
            (Some(first), Some(last)) if tokens.start < tokens.end => TextRange {
                start: self.column_of(first),
                end: self.column_of(last).advance(
                    self.text.token_text(last).chars().count().saturating_sub(1),
                ),
            },
            _ => self.range(),
        }
    }

    fn column_of(&self, token: &StepToken) -> SourceLocation {
        let before = self.text.text().get(..token.start).unwrap_or_default();
        self.location.advance(before.chars().count())
    }
}
