use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

fn seeded_cmd(dml: &assert_fs::fixture::ChildPath) -> Command {
    let mut cmd = cmd();
    cmd.args([
        "-p",
        "test-project",
        "-i",
        "test-instance",
        "-d",
        "test-database",
        "--dry-run",
    ])
    .arg(dml.path());
    cmd
}

#[test]
fn dry_run_lists_statements_without_connecting() {
    let temp = assert_fs::TempDir::new().unwrap();
    let seed = temp.child("seed.sql");
    seed.write_str(
        "-- Seed users
INSERT INTO users (id, name, email, created_at) VALUES (1, 'John Doe', 'john@example.com', '2024-01-01T00:00:00Z');
UPDATE users SET name = 'Jane' WHERE id = 1; -- rename
delete from users where id = 2;
",
    )
    .unwrap();

    let output = seeded_cmd(&seed).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    insta::assert_snapshot!(stdout, @r###"
    Dry run: 3 statements would be executed
    Statement 1: INSERT INTO users (id, name, email, created_at) VA...
    Statement 2: UPDATE users SET name = 'Jane' WHERE id = 1...
    Statement 3: delete from users where id = 2...
    "###);
}

#[test]
fn dry_run_with_only_comments_reports_zero_statements() {
    let temp = assert_fs::TempDir::new().unwrap();
    let seed = temp.child("empty.sql");
    seed.write_str("-- nothing to seed yet\n").unwrap();

    seeded_cmd(&seed)
        .assert()
        .success()
        .stdout("Dry run: 0 statements would be executed\n");
}

#[test]
fn dry_run_rejects_non_dml_statements() {
    let temp = assert_fs::TempDir::new().unwrap();
    let seed = temp.child("seed.sql");
    seed.write_str("INSERT INTO users (id) VALUES (1);\nSELECT * FROM users;\n")
        .unwrap();

    seeded_cmd(&seed)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Failed to parse DML file"))
        .stderr(predicate::str::contains(
            "invalid DML statement: SELECT * FROM users",
        ));
}

#[test]
fn dry_run_reports_schema_statement_count() {
    let temp = assert_fs::TempDir::new().unwrap();
    let seed = temp.child("seed.sql");
    seed.write_str("INSERT INTO users (id) VALUES (1);").unwrap();
    let schema = temp.child("schema.sql");
    schema
        .write_str(
            "-- schema
CREATE TABLE users (
  id INT64 NOT NULL,
) PRIMARY KEY (id);
CREATE INDEX users_by_id ON users (id);
",
        )
        .unwrap();

    seeded_cmd(&seed)
        .arg("--schema")
        .arg(schema.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Schema: 2 DDL statements would be applied",
        ));
}

#[test]
fn verbose_dry_run_logs_configuration_to_stderr() {
    let temp = assert_fs::TempDir::new().unwrap();
    let seed = temp.child("seed.sql");
    seed.write_str("INSERT INTO users (id) VALUES (1);").unwrap();

    seeded_cmd(&seed)
        .arg("--verbose")
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("Parsed 1 DML statements"))
        .stderr(predicate::str::contains("localhost:9010"));
}
