//! Wire manifests and feature files through the linker.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use autostep_linker::{FileStepDefinitionSource, Linker};
use eyre::Result;
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::feature::load_feature;
use crate::manifest::load_manifest;
use crate::output::{OutputFormat, Report, write_report};

/// Inputs for a single link run.
#[derive(Debug, Clone, Default)]
pub struct LinkRequest {
    /// Step manifest files, registered in order.
    pub manifests: Vec<PathBuf>,
    /// Feature files to link.
    pub features: Vec<PathBuf>,
    /// Report format.
    pub format: OutputFormat,
}

/// Register every manifest, link every feature and collect the results.
///
/// # Errors
///
/// Returns an error if an input file cannot be read or parsed.
pub fn link_files(config: &CliConfig, request: &LinkRequest) -> Result<Report> {
    let mut linker = Linker::with_options(config.linker_options());
    let mut report = Report::default();

    for path in &request.manifests {
        let (file, modified) = load_manifest(path)?;
        let source = FileStepDefinitionSource::new(&file, modified);
        let (summary, messages) = linker.add_step_definition_source(&source).into_parts();
        if let Some(summary) = summary {
            debug!(
                manifest = %path.display(),
                added = summary.added,
                rejected = summary.rejected,
                "registered manifest"
            );
        }
        report.definition_messages.extend(messages);
    }

    let mut files = request
        .features
        .iter()
        .map(|path| load_feature(path))
        .collect::<Result<Vec<_>, _>>()?;
    let cancel = AtomicBool::new(false);
    report.files = linker.link_all(&mut files, &cancel);
    info!(
        sources = linker.source_count(),
        files = report.files.len(),
        success = report.success(),
        "link complete"
    );
    Ok(report)
}

/// Link the requested files and write the report.
///
/// Returns whether every step bound without errors.
///
/// # Errors
///
/// Returns an error if an input cannot be loaded or the report cannot be
/// written.
pub fn run(config: &CliConfig, request: &LinkRequest, writer: &mut dyn Write) -> Result<bool> {
    let report = link_files(config, request)?;
    write_report(writer, &report, request.format)?;
    Ok(report.success())
}
