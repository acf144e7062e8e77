//! Defines custom error types for the application.

use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
/// Error type returned when loading, validating or replaying statements fails.
pub enum SpemuError {
    #[error("failed to read file {}: {error}", path.display())]
    ReadFile {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("invalid DML statement: {0}")]
    InvalidStatement(String),

    #[error("{0} is required")]
    MissingSetting(&'static str),

    #[error("{0} must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Failed to parse config file {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("failed to create Spanner client: {0}")]
    Connect(String),

    #[error("failed to execute statement {index}: {message}\nStatement: {statement}")]
    Statement {
        index: usize,
        statement: String,
        message: String,
    },

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("{context}: {message}")]
    Admin {
        context: &'static str,
        message: String,
    },

    #[error("{0} timed out after {1} seconds")]
    Timeout(&'static str, u64),
}

impl SpemuError {
    /// Adapter for `map_err` on admin API calls.
    pub(crate) fn admin<E: Display>(context: &'static str) -> impl FnOnce(E) -> Self {
        move |err| SpemuError::Admin {
            context,
            message: err.to_string(),
        }
    }
}
