//! JSON step manifests: file-declared step definitions for the linker.
//!
//! A manifest lists step definitions the way a test file would declare them:
//!
//! ```json
//! {
//!   "steps": [
//!     { "type": "Given", "declaration": "I have {count:int} apples" },
//!     { "type": "When", "declaration": "I fill the form", "table": "required", "line": 4 }
//!   ]
//! }
//! ```

use std::path::Path;
use std::str::FromStr;
use std::time::SystemTime;

use autostep_linker::{BuiltFile, SourceLocation, StepDefinitionElement, TableRequirement};
use autostep_patterns::StepType;
use serde::Deserialize;

use crate::error::CliError;

/// Top-level manifest document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepManifest {
    /// Declared steps.
    pub steps: Vec<ManifestStep>,
}

/// One declared step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ManifestStep {
    /// `Given`, `When` or `Then`.
    #[serde(rename = "type")]
    pub step_type: String,
    /// Declaration text with `{name}` or `{name:hint}` placeholders.
    pub declaration: String,
    /// Whether the step takes a table.
    #[serde(default)]
    pub table: ManifestTable,
    /// Free text describing the step.
    #[serde(default)]
    pub description: Option<String>,
    /// Line the step is reported at; defaults to its position in the list.
    #[serde(default)]
    pub line: Option<usize>,
}

/// Table requirement as written in a manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestTable {
    /// A table may be attached.
    #[default]
    Optional,
    /// A table must be attached.
    Required,
    /// No table may be attached.
    NotSupported,
}

impl From<ManifestTable> for TableRequirement {
    fn from(table: ManifestTable) -> Self {
        match table {
            ManifestTable::Optional => Self::Optional,
            ManifestTable::Required => Self::Required,
            ManifestTable::NotSupported => Self::NotSupported,
        }
    }
}

/// Read a manifest and its modification time.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub fn load_manifest(path: &Path) -> Result<(BuiltFile, SystemTime), CliError> {
    let read_error = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    let text = std::fs::read_to_string(path).map_err(read_error)?;
    let modified = std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    Ok((parse_manifest(path, &text)?, modified))
}

/// Convert manifest JSON into a built file holding only step definitions.
///
/// # Errors
///
/// Returns [`CliError::Manifest`] for malformed JSON and
/// [`CliError::UnknownStepType`] for unrecognised step types.
pub fn parse_manifest(path: &Path, text: &str) -> Result<BuiltFile, CliError> {
    let manifest: StepManifest =
        serde_json::from_str(text).map_err(|source| CliError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
    let mut built = BuiltFile::new(path.display().to_string());
    for (index, step) in manifest.steps.into_iter().enumerate() {
        let step_type =
            StepType::from_str(&step.step_type).map_err(|_| CliError::UnknownStepType {
                path: path.to_path_buf(),
                value: step.step_type.clone(),
            })?;
        let line = step.line.unwrap_or(index + 1);
        let mut element =
            StepDefinitionElement::new(step_type, step.declaration, SourceLocation::new(line, 1));
        element.table = step.table.into();
        element.description = step.description;
        built.step_definitions.push(element);
    }
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<BuiltFile, CliError> {
        parse_manifest(Path::new("steps.json"), text)
    }

    #[test]
    fn converts_steps_to_definition_elements() {
        let Ok(file) = parse(
            r#"{"steps": [
                {"type": "Given", "declaration": "I have {n:int} apples"},
                {"type": "when", "declaration": "I fill the form", "table": "required", "line": 9}
            ]}"#,
        ) else {
            panic!("manifest should parse");
        };
        assert_eq!(file.source_name, "steps.json");
        let [first, second] = file.step_definitions.as_slice() else {
            panic!("expected two definitions");
        };
        assert_eq!(first.step_type, StepType::Given);
        assert_eq!(first.location, SourceLocation::new(1, 1));
        assert_eq!(first.table, TableRequirement::Optional);
        assert_eq!(second.step_type, StepType::When);
        assert_eq!(second.table, TableRequirement::Required);
        assert_eq!(second.location, SourceLocation::new(9, 1));
    }

    #[test]
    fn rejects_unknown_step_types() {
        let result = parse(r#"{"steps": [{"type": "Whenever", "declaration": "x"}]}"#);
        assert!(matches!(
            result,
            Err(CliError::UnknownStepType { ref value, .. }) if value == "Whenever"
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let result = parse(r#"{"steps": [], "extra": true}"#);
        assert!(matches!(result, Err(CliError::Manifest { .. })));
    }

    #[test]
    fn parses_table_requirements() {
        let Ok(file) = parse(
            r#"{"steps": [{"type": "Then", "declaration": "x", "table": "not-supported"}]}"#,
        ) else {
            panic!("manifest should parse");
        };
        let table = file.step_definitions.first().map(|step| step.table);
        assert_eq!(table, Some(TableRequirement::NotSupported));
    }
}
