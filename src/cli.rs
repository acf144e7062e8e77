//! Defines the command-line interface for the application.

use clap::Parser;
use spemu::Overrides;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  spemu -p test-project -i test-instance -d test-database ./seed.sql
  spemu --project=my-proj --instance=my-inst --database=my-db --dry-run ./test.sql
  spemu -p test -i test -d test --port=9020 ./users.sql";

#[derive(Parser, Debug)]
#[command(
    name = "spemu",
    version,
    about = "Spanner Emulator DML Inserter: seed an emulator database from a DML file.",
    after_help = EXAMPLES
)]
pub struct Cli {
    /// File of semicolon-terminated INSERT/UPDATE/DELETE statements.
    #[arg(value_name = "DML_FILE")]
    pub dml_file: PathBuf,

    /// Spanner project ID (required)
    #[arg(short, long, value_name = "PROJECT_ID")]
    pub project: Option<String>,

    /// Spanner instance ID (required)
    #[arg(short, long, value_name = "INSTANCE_ID")]
    pub instance: Option<String>,

    /// Spanner database ID (required)
    #[arg(short, long, value_name = "DATABASE_ID")]
    pub database: Option<String>,

    /// Spanner emulator port [default: 9010]
    #[arg(short = 'P', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Spanner emulator host [default: localhost]
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Parse and validate DML without executing.
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Create the instance and database from this DDL file before seeding.
    #[arg(long, value_name = "SCHEMA_FILE")]
    pub schema: Option<PathBuf>,

    /// Read default settings from a TOML, YAML or JSON file.
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seconds allowed for each phase (connect, schema setup, transaction) [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            project: self.project.clone(),
            instance: self.instance.clone(),
            database: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            timeout_secs: self.timeout,
        }
    }
}
