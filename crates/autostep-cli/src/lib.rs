//! Command line front end for the AutoStep linker.
//!
//! The binary reads step definitions from JSON manifests and test files from
//! Gherkin feature files, converts both into the linker's built-file model
//! and reports the outcome of linking.
//!
//! # Configuration
//!
//! - `AUTOSTEP_LOG_LEVEL`: log verbosity (trace, debug, info, warn, error)
//! - `AUTOSTEP_WHITESPACE_WARNINGS`: set to `false` to silence warnings about
//!   padded quoted arguments
//!
//! Command line flags take precedence over the environment.

pub mod app;
pub mod config;
pub mod error;
pub mod feature;
pub mod logging;
pub mod manifest;
pub mod output;
