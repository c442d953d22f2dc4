//! Loading Gherkin `.feature` files into the linker's built-file model.

use std::path::Path;
use std::str::FromStr;

use autostep_linker::{
    BackgroundElement, BuiltFile, ExamplesElement, FeatureElement, ScenarioElement,
    SourceLocation, StepCollectionBuilder, StepReference, TableElement,
};
use autostep_patterns::StepType;
use gherkin::GherkinEnv;

use crate::error::CliError;

/// Maps byte offsets in a source text to 1-based line and column positions.
#[derive(Debug)]
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self { text, starts }
    }

    fn location(&self, offset: usize) -> SourceLocation {
        let line = self.starts.partition_point(|start| *start <= offset).max(1);
        let start = line
            .checked_sub(1)
            .and_then(|index| self.starts.get(index))
            .copied()
            .unwrap_or_default();
        let column = self
            .text
            .get(start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        SourceLocation::new(line, column + 1)
    }

    /// Location of the first occurrence of `needle` at or after `from`.
    fn find(&self, from: usize, needle: &str) -> Option<SourceLocation> {
        let rest = self.text.get(from..)?;
        rest.find(needle).map(|offset| self.location(from + offset))
    }
}

fn normalise_trailing_newline(text: &mut String) {
    if !text.ends_with('\n') {
        text.push('\n');
    }
}

/// Parse and convert a `.feature` file from disk. The path, as given, becomes
/// the file's source name.
///
/// # Errors
///
/// Returns an error when the file cannot be read or is not valid Gherkin.
pub fn load_feature(path: &Path) -> Result<BuiltFile, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature(path, text)
}

/// Convert feature text into a built file named after `path`.
///
/// Rule scenarios are flattened into the feature's scenario list. A rule's
/// background becomes a scenario of its own so its steps are linked once.
///
/// # Errors
///
/// Returns [`CliError::Feature`] when the text is not valid Gherkin.
pub fn parse_feature(path: &Path, mut text: String) -> Result<BuiltFile, CliError> {
    normalise_trailing_newline(&mut text);
    let feature =
        gherkin::Feature::parse(text.as_str(), GherkinEnv::default()).map_err(|err| {
            CliError::Feature {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        })?;
    let index = LineIndex::new(&text);

    let mut scenarios: Vec<ScenarioElement> = feature
        .scenarios
        .iter()
        .map(|scenario| convert_scenario(&index, scenario))
        .collect();
    for rule in &feature.rules {
        if let Some(background) = &rule.background {
            scenarios.push(ScenarioElement {
                name: format!("{} (background)", rule.name),
                location: index.location(background.span.start),
                steps: convert_steps(&index, &background.steps),
                examples: Vec::new(),
            });
        }
        scenarios.extend(
            rule.scenarios
                .iter()
                .map(|scenario| convert_scenario(&index, scenario)),
        );
    }

    let mut built = BuiltFile::new(path.display().to_string());
    built.feature = Some(FeatureElement {
        name: feature.name.clone(),
        location: index.location(feature.span.start),
        description: feature.description.clone(),
        background: feature.background.as_ref().map(|background| BackgroundElement {
            location: index.location(background.span.start),
            steps: convert_steps(&index, &background.steps),
        }),
        scenarios,
    });
    Ok(built)
}

fn convert_scenario(index: &LineIndex<'_>, scenario: &gherkin::Scenario) -> ScenarioElement {
    ScenarioElement {
        name: scenario.name.clone(),
        location: index.location(scenario.span.start),
        steps: convert_steps(index, &scenario.steps),
        examples: scenario
            .examples
            .iter()
            .map(|examples| ExamplesElement {
                location: index.location(examples.span.start),
                table: examples.table.as_ref().map(|table| convert_table(index, table)),
            })
            .collect(),
    }
}

fn convert_steps(
    index: &LineIndex<'_>,
    steps: &[gherkin::Step],
) -> Vec<StepReference> {
    let mut builder = StepCollectionBuilder::new();
    for step in steps {
        // `And`/`But` stay visible here; the builder resolves them again.
        let written = StepType::from_str(step.keyword.trim()).unwrap_or_else(|_| step.ty.into());
        let location = index
            .find(step.span.start, &step.value)
            .unwrap_or_else(|| index.location(step.span.start));
        let table = step.table.as_ref().map(|table| convert_table(index, table));
        builder.add(written, &step.value, location, table);
    }
    builder.build()
}

fn convert_table(index: &LineIndex<'_>, table: &gherkin::Table) -> TableElement {
    let mut rows = table.rows.iter().cloned();
    TableElement {
        location: index
            .find(table.span.start, "|")
            .unwrap_or_else(|| index.location(table.span.start)),
        header: rows.next().unwrap_or_default(),
        rows: rows.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURE: &str = "\
Feature: Shopping
  Background:
    Given a shop

  Scenario: Buying apples
    Given I have 3 apples
    And a basket
    When I buy 2 apples
      | name  | price |
      | apple | 0.5   |
    Then I have 5 apples

  Scenario Outline: Selling
    When I sell <count> apples

    Examples:
      | count |
      | 1     |";

    fn parse(text: &str) -> BuiltFile {
        match parse_feature(Path::new("shop.feature"), text.to_string()) {
            Ok(file) => file,
            Err(err) => panic!("feature should parse: {err}"),
        }
    }

    #[test]
    fn records_step_text_positions() {
        let file = parse(FEATURE);
        let first = file
            .steps()
            .find(|step| step.text() == "I have 3 apples")
            .map(StepReference::location);
        assert_eq!(first, Some(SourceLocation::new(6, 11)));
        assert_eq!(file.source_name, "shop.feature");
    }

    #[test]
    fn resolves_and_and_keeps_written_keyword() {
        let file = parse(FEATURE);
        let basket = file.steps().find(|step| step.text() == "a basket");
        assert_eq!(basket.map(StepReference::step_type), Some(StepType::And));
        assert_eq!(basket.map(StepReference::binding_type), Some(StepType::Given));
    }

    #[test]
    fn converts_background_tables_and_examples() {
        let file = parse(FEATURE);
        let Some(feature) = file.feature.as_ref() else {
            panic!("feature expected");
        };
        assert_eq!(feature.name, "Shopping");
        assert_eq!(
            feature.background.as_ref().map(|background| background.steps.len()),
            Some(1)
        );
        assert_eq!(feature.scenarios.len(), 2);

        let table = file.steps().find_map(StepReference::table);
        let Some(table) = table else {
            panic!("table expected");
        };
        assert_eq!(table.header, vec!["name", "price"]);
        assert_eq!(table.rows, vec![vec!["apple", "0.5"]]);
        assert_eq!(table.location, SourceLocation::new(9, 7));

        let outline = feature.scenarios.get(1);
        assert_eq!(outline.map(ScenarioElement::is_outline), Some(true));
    }

    #[test]
    fn orders_steps_for_linking() {
        let file = parse(FEATURE);
        let texts: Vec<&str> = file.steps().map(StepReference::text).collect();
        assert_eq!(
            texts,
            vec![
                "a shop",
                "I have 3 apples",
                "a basket",
                "I buy 2 apples",
                "I have 5 apples",
                "I sell <count> apples",
            ]
        );
    }

    #[test]
    fn rejects_invalid_gherkin() {
        let Err(err) = parse_feature(Path::new("bad.feature"), "not gherkin at all".into())
        else {
            panic!("expected a parse error");
        };
        assert!(err.to_string().contains("bad.feature"));
    }

    #[test]
    fn line_index_counts_characters() {
        let index = LineIndex::new("ab\nçd\n");
        assert_eq!(index.location(0), SourceLocation::new(1, 1));
        assert_eq!(index.location(3), SourceLocation::new(2, 1));
        assert_eq!(index.find(0, "d"), Some(SourceLocation::new(2, 2)));
    }
}
