//! Error types for the command line front end.

use std::path::PathBuf;

use thiserror::Error;

/// Failures loading configuration or input files.
#[derive(Debug, Error)]
pub enum CliError {
    /// An invalid configuration value was provided.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A step manifest is not valid JSON or does not have the expected shape.
    #[error("invalid step manifest {}: {source}", path.display())]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Deserialisation error.
        #[source]
        source: serde_json::Error,
    },

    /// A manifest step names an unknown step type.
    #[error("unknown step type `{value}` in {}", path.display())]
    UnknownStepType {
        /// Manifest path.
        path: PathBuf,
        /// Offending value.
        value: String,
    },

    /// A feature file could not be parsed as Gherkin.
    #[error("failed to parse feature file {}: {message}", path.display())]
    Feature {
        /// Feature path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_error_displays_message() {
        let error = CliError::InvalidConfig("unknown log level".to_string());
        assert_eq!(error.to_string(), "invalid configuration: unknown log level");
    }

    #[test]
    fn read_error_names_the_file() {
        let error = CliError::Read {
            path: PathBuf::from("missing.feature"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let text = error.to_string();
        assert!(text.contains("missing.feature"));
        assert!(text.contains("file not found"));
    }

    #[test]
    fn unknown_step_type_error_displays_value() {
        let error = CliError::UnknownStepType {
            path: PathBuf::from("steps.json"),
            value: "Whenever".into(),
        };
        assert_eq!(error.to_string(), "unknown step type `Whenever` in steps.json");
    }
}
