//! Core library for spemu: loads DML scripts and replays them against a
//! Cloud Spanner emulator inside a single read-write transaction.
//!
//! ```no_run
//! use spemu::config::EmulatorConfig;
//! use spemu::executor::{point_at_emulator, Executor};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let statements = spemu::parser::parse_dml_file("seed.sql")?;
//!     let config = EmulatorConfig {
//!         emulator_host: "localhost:9010".to_string(),
//!         project_id: "test-project".to_string(),
//!         instance_id: "test-instance".to_string(),
//!         database_id: "test-database".to_string(),
//!     };
//!
//!     // Before any runtime threads exist.
//!     point_at_emulator(&config);
//!
//!     let runtime = tokio::runtime::Runtime::new()?;
//!     runtime.block_on(async {
//!         let executor = Executor::connect(&config, Duration::from_secs(30)).await?;
//!         executor.execute_statements(&statements).await?;
//!         executor.close().await;
//!         Ok::<_, spemu::SpemuError>(())
//!     })?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod parser;
pub mod schema;

pub use config::{EmulatorConfig, FileConfig, Overrides, Settings};
pub use error::SpemuError;
pub use executor::{initialize_schema, Executor};
pub use parser::{parse_dml_content, parse_dml_file, DmlKind};
