//! Replays validated statements against the Spanner emulator.
//!
//! All transactional behaviour (retry on abort, session reuse, commit) is
//! provided by the Spanner client. This module only feeds it statements in
//! order and reports which one failed.

use crate::config::EmulatorConfig;
use crate::error::SpemuError;
use crate::parser::preview;
use crate::schema::parse_ddl_file;
use google_cloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseRequest,
};
use google_cloud_googleapis::spanner::admin::instance::v1::{CreateInstanceRequest, Instance};
use google_cloud_spanner::admin::client::Client as AdminClient;
use google_cloud_spanner::admin::AdminClientConfig;
use google_cloud_spanner::client::{Client, ClientConfig, Error as ClientError};
use google_cloud_spanner::statement::Statement;
use google_cloud_spanner::transaction_rw::ReadWriteTransaction;
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable the Spanner client libraries read to find the emulator.
pub const EMULATOR_HOST_ENV: &str = "SPANNER_EMULATOR_HOST";

/// Characters of each statement shown in the per-statement log line.
pub const LOG_PREVIEW_CHARS: usize = 100;

const EMULATOR_INSTANCE_CONFIG: &str = "emulator-config";

/// Something that can run a single DML statement and report the row count.
pub trait StatementSink {
    type Error;

    fn execute_update(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<i64, Self::Error>> + Send;
}

impl StatementSink for ReadWriteTransaction {
    type Error = ClientError;

    fn execute_update(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<i64, Self::Error>> + Send {
        let stmt = Statement::new(sql);
        async move {
            ReadWriteTransaction::update(self, stmt)
                .await
                .map_err(ClientError::from)
        }
    }
}

/// Runs `statements` in order against `sink`, stopping at the first failure.
///
/// `failed_at` is reset at the start of every attempt and holds the 1-based
/// index of the failing statement afterwards, or 0 when all succeeded.
pub async fn apply_statements<S: StatementSink>(
    sink: &mut S,
    statements: &[String],
    failed_at: &AtomicUsize,
) -> Result<(), S::Error> {
    failed_at.store(0, Ordering::SeqCst);

    let total = statements.len();
    for (i, stmt) in statements.iter().enumerate() {
        log::info!(
            "Executing statement {}/{}: {}...",
            i + 1,
            total,
            preview(stmt, LOG_PREVIEW_CHARS)
        );

        if let Err(err) = sink.execute_update(stmt).await {
            failed_at.store(i + 1, Ordering::SeqCst);
            return Err(err);
        }
    }

    Ok(())
}

/// Builds the error reported when the replay transaction fails.
///
/// `failed_at` is the value left behind by [`apply_statements`].
pub fn transaction_error(statements: &[String], failed_at: usize, cause: &str) -> SpemuError {
    let message = match failed_at.checked_sub(1).and_then(|i| statements.get(i)) {
        Some(statement) => SpemuError::Statement {
            index: failed_at,
            statement: statement.clone(),
            message: cause.to_string(),
        }
        .to_string(),
        None => cause.to_string(),
    };

    SpemuError::Transaction(message)
}

/// The environment variable assignment that routes the Spanner clients to
/// the emulator, or `None` when no emulator host is configured.
pub fn emulator_env(config: &EmulatorConfig) -> Option<(&'static str, &str)> {
    let host = config.emulator_host.as_str();
    (!host.is_empty()).then_some((EMULATOR_HOST_ENV, host))
}

/// Points the Spanner client libraries at the emulator.
///
/// Mutates the process environment, so call it before the async runtime
/// (or any other thread) is started. [`Executor::connect`] and
/// [`initialize_schema`] build their client configs from this variable.
pub fn point_at_emulator(config: &EmulatorConfig) {
    if let Some((key, host)) = emulator_env(config) {
        log::debug!("{key}={host}");
        std::env::set_var(key, host);
    }
}

async fn within<F: Future>(
    phase: &'static str,
    limit: Duration,
    fut: F,
) -> Result<F::Output, SpemuError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| SpemuError::Timeout(phase, limit.as_secs()))
}

/// A connected Spanner data client for one database.
pub struct Executor {
    client: Client,
    timeout: Duration,
}

impl Executor {
    /// Opens a data client for the configured database. Expects
    /// [`point_at_emulator`] to have run first.
    pub async fn connect(config: &EmulatorConfig, timeout: Duration) -> Result<Self, SpemuError> {
        let database = config.database_path();
        log::debug!("connecting to {database}");

        let client = within("connect", timeout, Client::new(database, ClientConfig::default()))
            .await?
            .map_err(|e| SpemuError::Connect(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Executes every statement inside one read-write transaction.
    ///
    /// Either all statements are committed or none are. Returns the number
    /// of statements executed.
    pub async fn execute_statements(&self, statements: &[String]) -> Result<usize, SpemuError> {
        let shared: Arc<Vec<String>> = Arc::new(statements.to_vec());
        let failed_at = Arc::new(AtomicUsize::new(0));
        let tracker = Arc::clone(&failed_at);

        let transaction = self.client.read_write_transaction(move |tx| {
            let statements = Arc::clone(&shared);
            let failed_at = Arc::clone(&tracker);
            Box::pin(async move {
                apply_statements(tx, &statements, &failed_at).await?;
                Ok::<(), ClientError>(())
            })
        });

        let result: Result<(_, ()), ClientError> =
            within("transaction", self.timeout, transaction).await?;

        match result {
            Ok(_) => Ok(statements.len()),
            Err(err) => Err(transaction_error(
                statements,
                failed_at.load(Ordering::SeqCst),
                &err.to_string(),
            )),
        }
    }

    /// Closes the client and deletes its sessions.
    pub async fn close(self) {
        self.client.close().await;
    }
}

/// Creates the instance and the database (with the DDL from `schema_file`)
/// unless they already exist.
///
/// Like [`Executor::connect`], relies on [`point_at_emulator`].
pub async fn initialize_schema(
    config: &EmulatorConfig,
    schema_file: &Path,
    timeout: Duration,
) -> Result<(), SpemuError> {
    within("schema setup", timeout, async {
        let admin = AdminClient::new(AdminClientConfig::default())
            .await
            .map_err(SpemuError::admin("failed to create admin client"))?;

        ensure_instance(&admin, config).await;
        ensure_database(&admin, config, schema_file).await
    })
    .await?
}

async fn ensure_instance(admin: &AdminClient, config: &EmulatorConfig) {
    let request = CreateInstanceRequest {
        parent: config.project_path(),
        instance_id: config.instance_id.clone(),
        instance: Some(Instance {
            name: config.instance_path(),
            config: EMULATOR_INSTANCE_CONFIG.to_string(),
            display_name: config.instance_id.clone(),
            node_count: 1,
            ..Default::default()
        }),
        ..Default::default()
    };

    match admin.instance().create_instance(request, None).await {
        Ok(mut op) => match op.wait(None).await {
            Ok(_) => log::info!("Instance created: {}", config.instance_path()),
            Err(status) => log::warn!("Failed to wait for instance creation: {status}"),
        },
        Err(status) if status.to_string().contains("already exists") => {
            log::info!("Instance already exists: {}", config.instance_id)
        }
        Err(status) => log::warn!("Failed to create instance (may already exist): {status}"),
    }
}

async fn ensure_database(
    admin: &AdminClient,
    config: &EmulatorConfig,
    schema_file: &Path,
) -> Result<(), SpemuError> {
    let database_path = config.database_path();

    let existing = admin
        .database()
        .get_database(
            GetDatabaseRequest {
                name: database_path.clone(),
            },
            None,
        )
        .await;

    if existing.is_ok() {
        log::info!("Database already exists: {}", config.database_id);
        return Ok(());
    }

    log::info!("Creating database: {database_path}");

    let ddl_statements = parse_ddl_file(schema_file)?;
    log::info!("Found {} DDL statements", ddl_statements.len());

    let request = CreateDatabaseRequest {
        parent: config.instance_path(),
        create_statement: format!("CREATE DATABASE `{}`", config.database_id),
        extra_statements: ddl_statements,
        ..Default::default()
    };

    let mut op = admin
        .database()
        .create_database(request, None)
        .await
        .map_err(SpemuError::admin("failed to create database"))?;

    op.wait(None)
        .await
        .map_err(SpemuError::admin("database creation failed"))?;

    log::info!("Database created successfully: {}", config.database_id);
    Ok(())
}
