//! Connection settings for the Spanner emulator.
//!
//! Values come from three layers, highest precedence first: command line
//! flags, an optional settings file, and built-in defaults.

use crate::error::SpemuError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9010;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Identifies the emulator endpoint and the database to seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub emulator_host: String,
    pub project_id: String,
    pub instance_id: String,
    pub database_id: String,
}

impl EmulatorConfig {
    pub fn project_path(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    pub fn instance_path(&self) -> String {
        format!("projects/{}/instances/{}", self.project_id, self.instance_id)
    }

    /// Fully qualified database name, e.g.
    /// `projects/p/instances/i/databases/d`.
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project_id, self.instance_id, self.database_id
        )
    }
}

/// Optional settings file. Every key may be omitted.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Loads a settings file. `.toml` files are read as TOML; anything else
    /// as YAML, which also covers JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SpemuError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|error| SpemuError::ReadFile {
            path: path.to_path_buf(),
            error,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed = if is_toml {
            toml::from_str(&data).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&data).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| SpemuError::ConfigParse {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub project: Option<String>,
    pub instance: Option<String>,
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub emulator: EmulatorConfig,
    pub timeout: Duration,
}

impl Settings {
    pub fn resolve(cli: Overrides, file: FileConfig) -> Result<Self, SpemuError> {
        let project = non_empty(cli.project.or(file.project))
            .ok_or(SpemuError::MissingSetting("--project (or -p)"))?;
        let instance = non_empty(cli.instance.or(file.instance))
            .ok_or(SpemuError::MissingSetting("--instance (or -i)"))?;
        let database = non_empty(cli.database.or(file.database))
            .ok_or(SpemuError::MissingSetting("--database (or -d)"))?;

        let host = cli
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let timeout_secs = match (cli.timeout_secs, file.timeout_secs) {
            (Some(0), _) => return Err(SpemuError::InvalidTimeout("--timeout")),
            (Some(secs), _) => secs,
            (None, Some(0)) => return Err(SpemuError::InvalidTimeout("timeout_secs")),
            (None, Some(secs)) => secs,
            (None, None) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Settings {
            emulator: EmulatorConfig {
                emulator_host: format!("{host}:{port}"),
                project_id: project,
                instance_id: instance,
                database_id: database,
            },
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
