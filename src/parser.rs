//! Splits a DML script into individual statements and validates them.
//!
//! The scan is purely textual. Comment markers and semicolons inside string
//! literals are not recognised as part of the literal.

use crate::error::SpemuError;
use std::fmt;
use std::fs;
use std::path::Path;

/// Number of characters of an offending statement quoted in errors.
pub const ERROR_PREVIEW_CHARS: usize = 50;

const COMMENT_MARKER: &str = "--";

/// The statement keywords accepted for replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DmlKind {
    Insert,
    Update,
    Delete,
}

impl DmlKind {
    const ALL: [DmlKind; 3] = [DmlKind::Insert, DmlKind::Update, DmlKind::Delete];

    pub fn keyword(self) -> &'static str {
        match self {
            DmlKind::Insert => "INSERT",
            DmlKind::Update => "UPDATE",
            DmlKind::Delete => "DELETE",
        }
    }

    /// Reports which keyword `stmt` starts with, ignoring case and
    /// surrounding whitespace.
    pub fn detect(stmt: &str) -> Option<DmlKind> {
        let upper = stmt.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|kind| upper.starts_with(kind.keyword()))
    }
}

impl fmt::Display for DmlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Reads `path` and parses its content with [`parse_dml_content`].
pub fn parse_dml_file(path: impl AsRef<Path>) -> Result<Vec<String>, SpemuError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|error| SpemuError::ReadFile {
        path: path.to_path_buf(),
        error,
    })?;

    parse_dml_content(&content)
}

/// Strips comments, splits on `;` and validates every statement.
///
/// Statements come back trimmed, in file order, without their terminator.
pub fn parse_dml_content(content: &str) -> Result<Vec<String>, SpemuError> {
    let content = remove_comments(content);

    let mut statements = Vec::new();
    for stmt in split_statements(&content) {
        if !is_valid_dml_statement(&stmt) {
            return Err(SpemuError::InvalidStatement(
                preview(&stmt, ERROR_PREVIEW_CHARS).to_string(),
            ));
        }
        statements.push(stmt);
    }

    log::debug!("parsed {} DML statements", statements.len());
    Ok(statements)
}

/// Drops everything from the first `--` to the end of each line.
pub fn remove_comments(content: &str) -> String {
    content
        .split('\n')
        .map(|line| match line.find(COMMENT_MARKER) {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn split_statements(content: &str) -> Vec<String> {
    content
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_valid_dml_statement(stmt: &str) -> bool {
    DmlKind::detect(stmt).is_some()
}

/// Returns at most `max_chars` leading characters of `stmt`.
pub fn preview(stmt: &str, max_chars: usize) -> &str {
    match stmt.char_indices().nth(max_chars) {
        Some((idx, _)) => &stmt[..idx],
        None => stmt,
    }
}
