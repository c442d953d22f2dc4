//! Helpers for rendering link reports.

use std::io::Write;

use autostep_linker::{CompilerMessage, LinkResult};
use eyre::{Context, Result};
use serde::Serialize;

/// Report format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One line per diagnostic, followed by a per-file summary.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Everything produced by one run.
#[derive(Debug, Default)]
pub struct Report {
    /// Messages raised while registering step manifests.
    pub definition_messages: Vec<CompilerMessage>,
    /// One result per linked feature file.
    pub files: Vec<LinkResult>,
}

impl Report {
    /// Whether registration and every link pass reported no errors.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.definition_messages.iter().any(CompilerMessage::is_error)
            && self.files.iter().all(LinkResult::success)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonFile<'a> {
    source: &'a str,
    success: bool,
    bound_steps: usize,
    total_steps: usize,
    referenced_sources: Vec<&'a str>,
    messages: &'a [CompilerMessage],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    success: bool,
    definition_messages: &'a [CompilerMessage],
    files: Vec<JsonFile<'a>>,
}

/// Write `report` in `format`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report(writer: &mut dyn Write, report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => write_text(writer, report),
        OutputFormat::Json => write_json(writer, report),
    }
}

fn write_text(writer: &mut dyn Write, report: &Report) -> Result<()> {
    for message in &report.definition_messages {
        writeln!(writer, "{message}").wrap_err("failed to write definition message")?;
    }
    for file in &report.files {
        for message in file.messages() {
            writeln!(writer, "{message}").wrap_err("failed to write link message")?;
        }
        writeln!(
            writer,
            "{}: {}/{} steps bound",
            file.source_name(),
            file.bound_steps(),
            file.total_steps()
        )
        .wrap_err_with(|| format!("failed to write summary for {}", file.source_name()))?;
    }
    Ok(())
}

fn write_json(writer: &mut dyn Write, report: &Report) -> Result<()> {
    let document = JsonReport {
        success: report.success(),
        definition_messages: &report.definition_messages,
        files: report
            .files
            .iter()
            .map(|file| JsonFile {
                source: file.source_name(),
                success: file.success(),
                bound_steps: file.bound_steps(),
                total_steps: file.total_steps(),
                referenced_sources: file
                    .referenced_sources()
                    .iter()
                    .map(autostep_linker::SourceUid::as_str)
                    .collect(),
                messages: file.messages(),
            })
            .collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &document).wrap_err("failed to write JSON report")?;
    writeln!(writer).wrap_err("failed to terminate JSON report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use autostep_linker::{CompilerMessageCode, SourceLocation, TextRange};

    fn report() -> Report {
        Report {
            definition_messages: vec![CompilerMessage::new(
                Some("steps.json"),
                CompilerMessageCode::StepDefinitionDeclarationInvalid,
                "bad declaration",
                TextRange::of_text(SourceLocation::new(2, 1), "x {"),
            )],
            files: Vec::new(),
        }
    }

    fn render(format: OutputFormat) -> String {
        let mut buffer = Vec::new();
        if let Err(err) = write_report(&mut buffer, &report(), format) {
            panic!("report should render: {err}");
        }
        String::from_utf8(buffer).unwrap_or_else(|err| panic!("utf8 output: {err}"))
    }

    #[test]
    fn text_lists_messages_one_per_line() {
        assert_eq!(
            render(OutputFormat::Text),
            "steps.json(2,1,2,3): Error ASC10001: bad declaration\n"
        );
    }

    #[test]
    fn json_includes_success_flag_and_codes() {
        let value: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json))
            .unwrap_or_else(|err| panic!("valid JSON: {err}"));
        assert_eq!(value["success"], serde_json::Value::Bool(false));
        assert_eq!(value["definitionMessages"][0]["code"], 10001);
        assert_eq!(value["definitionMessages"][0]["startLine"], 2);
    }

    #[test]
    fn empty_report_succeeds() {
        assert!(Report::default().success());
    }
}
