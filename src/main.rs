use clap::Parser;
use tracing::{error, info};

use neo4j_csv_loader::{
    config::{Args, LogFormat},
    ingest, GraphDriver, IngestError, Neo4jDriver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // ── Tracing ───────────────────────────────────────────────────────────────
    init_tracing(args.log_format)?;

    // ── Config ────────────────────────────────────────────────────────────────
    let config = args.into_config().map_err(|e| {
        error!("Configuration error: {}", e);
        e
    })?;

    // ── Driver ────────────────────────────────────────────────────────────────
    let driver = Neo4jDriver::connect(&config.connection)?;
    driver.ping().await.map_err(|e| {
        error!(uri = %config.connection.uri, "Cannot reach Neo4j: {}", e);
        e
    })?;

    // ── Load ──────────────────────────────────────────────────────────────────
    let result = ingest(&driver, &config).await;
    match &result {
        Ok(summary) => {
            driver.close().await?;
            info!(batches = summary.batches, rows = summary.rows, "load finished");
        }
        // Already logged with the query text by the executor.
        Err(IngestError::Batch { .. }) => {}
        Err(e) => error!("{}", e),
    }

    match exit_code(&result) {
        0 => Ok(()),
        code => std::process::exit(code),
    }
}

/// Process exit status for a finished load: 0 only if every batch committed.
fn exit_code<T>(result: &neo4j_csv_loader::Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
