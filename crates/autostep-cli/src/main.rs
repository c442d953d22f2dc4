//! Command line front end for the AutoStep linker.
//!
//! Registers the step definitions declared in JSON manifests, links Gherkin
//! feature files against them and writes a report to stdout. The process
//! exits with 0 when every step bound cleanly, 1 when linking reported
//! errors and 2 when configuration or input files are invalid.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use autostep_cli::app::{LinkRequest, run};
use autostep_cli::config::{CliConfig, LogLevel};
use autostep_cli::error::CliError;
use autostep_cli::logging::init_logging;
use autostep_cli::output::OutputFormat;

/// Link Gherkin feature files against declared step definitions.
#[derive(Parser, Debug)]
#[command(name = "autostep-link", version, about)]
struct Args {
    /// Step manifest to register; may be repeated.
    #[arg(short = 's', long = "steps", value_name = "MANIFEST")]
    manifests: Vec<PathBuf>,

    /// Feature files to link.
    #[arg(required = true, value_name = "FEATURE")]
    features: Vec<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Do not warn about whitespace inside quoted arguments.
    #[arg(long)]
    no_whitespace_warnings: bool,
}

fn main() {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&CliConfig::default());
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        features = args.features.len(),
        "starting autostep-link"
    );

    let request = LinkRequest {
        manifests: args.manifests,
        features: args.features,
        format: args.format,
    };
    let mut out = io::stdout().lock();
    let outcome = run(&config, &request, &mut out);
    let _ = out.flush();
    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %e, "link run failed");
            let _ = writeln!(io::stderr(), "error: {e:#}");
            std::process::exit(2);
        }
    }
}

fn build_config(args: &Args) -> Result<CliConfig, CliError> {
    let config = CliConfig::from_env()?;
    let whitespace = args.no_whitespace_warnings.then_some(false);
    Ok(config.apply_overrides(args.log_level, whitespace))
}
