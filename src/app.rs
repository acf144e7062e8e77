use crate::cli::Cli;
use anyhow::Context;
use clap::Parser;
use spemu::executor::{initialize_schema, point_at_emulator, Executor};
use spemu::parser::{parse_dml_file, preview};
use spemu::schema::parse_ddl_file;
use spemu::{DmlKind, FileConfig, Settings};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

/// Characters of each statement echoed by `--dry-run`.
const DRY_RUN_PREVIEW_CHARS: usize = 50;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;
    log::info!("Configuration: {settings:?}");
    log::info!("DML file: {}", cli.dml_file.display());

    let statements = parse_dml_file(&cli.dml_file).context("Failed to parse DML file")?;
    log::info!(
        "Parsed {} DML statements ({})",
        statements.len(),
        kind_summary(&statements)
    );

    if cli.dry_run {
        let mut stdout = io::stdout().lock();
        write_dry_run_report(&mut stdout, &statements)?;
        if let Some(schema) = &cli.schema {
            let ddl = parse_ddl_file(schema).context("Failed to parse schema file")?;
            writeln!(stdout, "Schema: {} DDL statements would be applied", ddl.len())?;
        }
        return Ok(());
    }

    // Still single-threaded here.
    point_at_emulator(&settings.emulator);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let executed = runtime.block_on(seed(&settings, cli.schema.as_deref(), &statements))?;

    println!("Successfully executed {executed} statements");
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,spemu=info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    Ok(Settings::resolve(cli.overrides(), file)?)
}

async fn seed(
    settings: &Settings,
    schema: Option<&Path>,
    statements: &[String],
) -> anyhow::Result<usize> {
    if let Some(schema) = schema {
        initialize_schema(&settings.emulator, schema, settings.timeout)
            .await
            .context("Failed to initialize schema")?;
    }

    let executor = Executor::connect(&settings.emulator, settings.timeout)
        .await
        .context("Failed to create executor")?;

    let result = executor.execute_statements(statements).await;
    executor.close().await;

    result.context("Failed to execute statements")
}

/// Counts statements per keyword, e.g. `2 INSERT, 1 DELETE`.
fn kind_summary(statements: &[String]) -> String {
    let mut counts: BTreeMap<DmlKind, usize> = BTreeMap::new();
    for kind in statements.iter().filter_map(|stmt| DmlKind::detect(stmt)) {
        *counts.entry(kind).or_default() += 1;
    }

    counts
        .iter()
        .map(|(kind, n)| format!("{n} {kind}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_dry_run_report(out: &mut impl Write, statements: &[String]) -> io::Result<()> {
    writeln!(
        out,
        "Dry run: {} statements would be executed",
        statements.len()
    )?;
    for (i, stmt) in statements.iter().enumerate() {
        writeln!(
            out,
            "Statement {}: {}...",
            i + 1,
            preview(stmt, DRY_RUN_PREVIEW_CHARS)
        )?;
    }
    Ok(())
}
