//! Error types for run-plotter
//!
//! Validation failures carry enough context to fix the offending run
//! directory or declaration without re-reading the source.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// run-plotter error types
#[derive(Error, Debug)]
pub enum Error {
    /// A run directory lacks its metrics table or parameter document
    #[error("Run file missing: {}\nEvery run directory needs metrics.csv and params.yaml", path.display())]
    MissingRunFile {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// Runs under comparison reference different scenarios
    #[error("Scenario files are not the same: {expected} != {found} (run {run})")]
    ScenarioMismatch {
        /// Scenario of the first run
        expected: String,
        /// Scenario of the offending run
        found: String,
        /// Offending run directory name
        run: String,
    },

    /// A column, grouping, plot-kind or aggregator key outside its allow-list
    #[error("Invalid {kind} key: {key}")]
    InvalidKey {
        /// Which allow-list was consulted
        kind: &'static str,
        /// The rejected key
        key: String,
    },

    /// Caller supplied an unusable argument
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Episode table error (schema mismatch, missing or mistyped column)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration or environment is incomplete
    #[error("Configuration error: {0}")]
    Config(String),

    /// A stored value could not be parsed
    #[error("Parse error in column {column}: {message}")]
    Parse {
        /// Column being parsed
        column: String,
        /// Parser message
        message: String,
    },

    /// Drawing a figure failed
    #[error("Render error: {0}")]
    Render(String),

    /// Completion notification was rejected
    #[error("Completion notification failed: {0}")]
    Notify(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Shorthand for [`Error::InvalidKey`].
    #[must_use]
    pub fn invalid_key(kind: &'static str, key: impl Into<String>) -> Self {
        Self::InvalidKey {
            kind,
            key: key.into(),
        }
    }

    /// Shorthand for [`Error::Parse`].
    #[must_use]
    pub fn parse(column: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            column: column.into(),
            message: message.to_string(),
        }
    }
}
