//! Built-file model consumed by the linker.
//!
//! A front end parses a test file into a [`BuiltFile`]: an optional feature
//! with its background and scenarios, plus any step definitions declared in
//! the file. Step text is tokenised when each [`StepReference`] is created.

use autostep_patterns::{DeclarationPattern, StepType};

use crate::definition::TableRequirement;
use crate::location::SourceLocation;
use crate::reference::StepReference;

/// A table attached to a step or an examples block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableElement {
    /// Position of the first row.
    pub location: SourceLocation,
    /// Header cells.
    pub header: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
}

/// Steps shared by every scenario of a feature.
#[derive(Debug, Clone, Default)]
pub struct BackgroundElement {
    /// Position of the `Background:` keyword.
    pub location: SourceLocation,
    /// Steps in document order.
    pub steps: Vec<StepReference>,
}

/// An `Examples:` block of a scenario outline.
#[derive(Debug, Clone, Default)]
pub struct ExamplesElement {
    /// Position of the `Examples:` keyword.
    pub location: SourceLocation,
    /// Example values.
    pub table: Option<TableElement>,
}

/// A scenario or scenario outline.
#[derive(Debug, Clone, Default)]
pub struct ScenarioElement {
    /// Scenario title.
    pub name: String,
    /// Position of the scenario keyword.
    pub location: SourceLocation,
    /// Steps in document order.
    pub steps: Vec<StepReference>,
    /// Example blocks; non-empty for outlines.
    pub examples: Vec<ExamplesElement>,
}

impl ScenarioElement {
    /// Whether the scenario is an outline.
    #[must_use]
    pub fn is_outline(&self) -> bool {
        !self.examples.is_empty()
    }
}

/// A feature and its scenarios.
#[derive(Debug, Clone, Default)]
pub struct FeatureElement {
    /// Feature title.
    pub name: String,
    /// Position of the `Feature:` keyword.
    pub location: SourceLocation,
    /// Free text under the title.
    pub description: Option<String>,
    /// Background, if declared.
    pub background: Option<BackgroundElement>,
    /// Scenarios in document order.
    pub scenarios: Vec<ScenarioElement>,
}

/// A step definition declared inside a test file.
#[derive(Debug, Clone)]
pub struct StepDefinitionElement {
    /// Step type the definition is registered under.
    pub step_type: StepType,
    /// Declaration text.
    pub declaration: String,
    /// Compiled declaration, when the front end compiled it already.
    pub pattern: Option<DeclarationPattern>,
    /// Position of the declaration.
    pub location: SourceLocation,
    /// Table requirement.
    pub table: TableRequirement,
    /// Free text under the declaration.
    pub description: Option<String>,
    /// Steps making up the definition's body.
    pub steps: Vec<StepReference>,
}

impl StepDefinitionElement {
    /// Create an element with an empty body.
    #[must_use]
    pub fn new(step_type: StepType, declaration: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            step_type,
            declaration: declaration.into(),
            pattern: None,
            location,
            table: TableRequirement::default(),
            description: None,
            steps: Vec::new(),
        }
    }
}

/// Parsed content of one test file.
#[derive(Debug, Clone, Default)]
pub struct BuiltFile {
    /// Name used in messages, usually the file path.
    pub source_name: String,
    /// Feature, if the file declares one.
    pub feature: Option<FeatureElement>,
    /// Step definitions declared in the file.
    pub step_definitions: Vec<StepDefinitionElement>,
}

impl BuiltFile {
    /// Create an empty file.
    #[must_use]
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    /// Every step reference in link order: background, scenarios, then
    /// step definition bodies.
    pub fn steps(&self) -> impl Iterator<Item = &StepReference> {
        let feature = self.feature.iter().flat_map(|feature| {
            feature
                .background
                .iter()
                .flat_map(|background| background.steps.iter())
                .chain(feature.scenarios.iter().flat_map(|scenario| scenario.steps.iter()))
        });
        feature.chain(self.step_definitions.iter().flat_map(|def| def.steps.iter()))
    }

    /// Mutable counterpart of [`BuiltFile::steps`].
    pub fn steps_mut(&mut self) -> impl Iterator<Item = &mut StepReference> {
        let feature = self.feature.iter_mut().flat_map(|feature| {
            feature
                .background
                .iter_mut()
                .flat_map(|background| background.steps.iter_mut())
                .chain(
                    feature
                        .scenarios
                        .iter_mut()
                        .flat_map(|scenario| scenario.steps.iter_mut()),
                )
        });
        feature.chain(
            self.step_definitions
                .iter_mut()
                .flat_map(|def| def.steps.iter_mut()),
        )
    }
}

/// Accumulates step references, resolving `And` against the previous
/// concrete keyword.
#[derive(Debug, Default)]
pub struct StepCollectionBuilder {
    steps: Vec<StepReference>,
    previous: Option<StepType>,
}

impl StepCollectionBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    pub fn add(
        &mut self,
        step_type: StepType,
        text: &str,
        location: SourceLocation,
        table: Option<TableElement>,
    ) -> &mut Self {
        let binding_type = step_type.resolve(&mut self.previous);
        let mut step = StepReference::new(step_type, binding_type, text, location);
        if let Some(table) = table {
            step = step.with_table(table);
        }
        self.steps.push(step);
        self
    }

    /// Finish and return the steps.
    #[must_use]
    pub fn build(self) -> Vec<StepReference> {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(entries: &[(StepType, &str)]) -> Vec<StepReference> {
        let mut builder = StepCollectionBuilder::new();
        for (line, (ty, text)) in entries.iter().enumerate() {
            builder.add(*ty, text, SourceLocation::new(line + 1, 5), None);
        }
        builder.build()
    }

    #[test]
    fn builder_resolves_and() {
        let built = steps(&[
            (StepType::And, "first"),
            (StepType::When, "act"),
            (StepType::And, "act again"),
            (StepType::Then, "check"),
        ]);
        let types: Vec<_> = built.iter().map(StepReference::binding_type).collect();
        assert_eq!(
            types,
            vec![StepType::Given, StepType::When, StepType::When, StepType::Then]
        );
        assert_eq!(built.get(2).map(StepReference::step_type), Some(StepType::And));
    }

    #[test]
    fn steps_are_visited_in_link_order() {
        let mut file = BuiltFile::new("a.feature");
        let mut definition =
            StepDefinitionElement::new(StepType::Given, "a macro", SourceLocation::new(20, 7));
        definition.steps = steps(&[(StepType::Given, "body")]);
        file.step_definitions.push(definition);
        file.feature = Some(FeatureElement {
            background: Some(BackgroundElement {
                steps: steps(&[(StepType::Given, "background")]),
                ..BackgroundElement::default()
            }),
            scenarios: vec![
                ScenarioElement {
                    steps: steps(&[(StepType::When, "one")]),
                    ..ScenarioElement::default()
                },
                ScenarioElement {
                    steps: steps(&[(StepType::Then, "two")]),
                    ..ScenarioElement::default()
                },
            ],
            ..FeatureElement::default()
        });

        let order: Vec<_> = file.steps().map(StepReference::text).collect();
        assert_eq!(order, vec!["background", "one", "two", "body"]);
        assert_eq!(file.steps_mut().count(), 4);
    }
}
