//! Reads DDL schema files used to create the emulator database.

use crate::error::SpemuError;
use std::fs;
use std::path::Path;

pub fn parse_ddl_file(path: impl AsRef<Path>) -> Result<Vec<String>, SpemuError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|error| SpemuError::ReadFile {
        path: path.to_path_buf(),
        error,
    })?;

    Ok(parse_ddl_statements(&content))
}

/// Splits a schema into DDL statements.
///
/// Blank lines and lines starting with `--` are dropped. The remaining lines
/// are trimmed, joined with a single space and split on every `;`, so several
/// statements may share one line. Empty pieces are discarded.
pub fn parse_ddl_statements(content: &str) -> Vec<String> {
    let joined = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("--"))
        .collect::<Vec<_>>()
        .join(" ");

    joined
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    const SCHEMA: &str = "-- Test schema
CREATE TABLE users (
  id INT64 NOT NULL,
  name STRING(100),
) PRIMARY KEY (id);

CREATE TABLE posts (
  id INT64 NOT NULL,
  user_id INT64 NOT NULL,
) PRIMARY KEY (id);
";

    #[test]
    fn joins_multi_line_statements() {
        let statements = parse_ddl_statements(SCHEMA);
        insta::assert_debug_snapshot!(statements, @r###"
        [
            "CREATE TABLE users ( id INT64 NOT NULL, name STRING(100), ) PRIMARY KEY (id)",
            "CREATE TABLE posts ( id INT64 NOT NULL, user_id INT64 NOT NULL, ) PRIMARY KEY (id)",
        ]
        "###);
    }

    #[test]
    fn keeps_unterminated_trailing_statement() {
        let statements = parse_ddl_statements(
            "CREATE TABLE a (id INT64) PRIMARY KEY (id);\nCREATE INDEX a_by_id\nON a (id)",
        );
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (id INT64) PRIMARY KEY (id)",
                "CREATE INDEX a_by_id ON a (id)",
            ]
        );
    }

    #[test]
    fn splits_statements_sharing_one_line() {
        let statements = parse_ddl_statements(
            "CREATE TABLE a (id INT64) PRIMARY KEY (id); CREATE INDEX a_by_id ON a (id);\n",
        );
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (id INT64) PRIMARY KEY (id)",
                "CREATE INDEX a_by_id ON a (id)",
            ]
        );
    }

    #[test]
    fn repeated_terminators_leave_no_empty_statements() {
        let statements = parse_ddl_statements("CREATE TABLE a (id INT64) PRIMARY KEY (id);;\n;");
        assert_eq!(statements, vec!["CREATE TABLE a (id INT64) PRIMARY KEY (id)"]);
    }

    #[test]
    fn skips_comments_blank_lines_and_empty_statements() {
        let statements = parse_ddl_statements("-- nothing here\n\n   \n;\n-- still nothing");
        assert!(statements.is_empty());
    }

    #[test]
    fn reads_schema_from_disk() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("schema.sql");
        file.write_str(SCHEMA).unwrap();

        assert_eq!(parse_ddl_file(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn missing_schema_file_is_an_error() {
        let err = parse_ddl_file("does-not-exist.sql").unwrap_err();
        assert!(err.to_string().contains("does-not-exist.sql"));
    }
}
