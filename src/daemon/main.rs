//! Disposition Engine Daemon
//!
//! Loads the configuration once, then answers receipt events: either a single
//! event read from a file, or newline-delimited events read from stdin. Each
//! answer is printed to stdout as one JSON line; logs and audit lines go to
//! stderr.

use mail_disposition_engine::api::{answer_line, serve_lines};
use mail_disposition_engine::config::{env_vars, CHECKS_KEY};
use mail_disposition_engine::{Config, DispositionEngine, Error, Result};

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Disposition Engine Daemon
#[derive(Parser, Debug)]
#[command(name = "disposition-engine")]
#[command(about = "Inbound mail disposition engine: blocklist, DMARC, spam and virus checks")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Receipt event file to evaluate; reads newline-delimited events from
    /// stdin when omitted
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Comma-separated checks to run, overriding CHECKS
    #[arg(long)]
    checks: Option<String>,

    /// Print the full batch report instead of the bare disposition
    #[arg(long)]
    report: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON log format
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Disable telemetry
    #[arg(long)]
    no_telemetry: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting Disposition Engine v{}", mail_disposition_engine::VERSION);

    // Load configuration; command line overrides win over the environment
    let mut vars = env_vars();
    if let Some(checks) = &args.checks {
        vars.push((CHECKS_KEY.to_string(), checks.clone()));
    }
    let config = Config::load_from(args.config.as_deref(), vars)?;

    let engine = DispositionEngine::builder()
        .with_config(config)
        .with_telemetry_enabled(!args.no_telemetry)
        .build()?;

    let metrics = engine.metrics();
    for kind in &metrics.enabled_checks {
        match engine.config().mode_for(*kind) {
            Some(mode) => info!(check = kind.log_tag(), mode = %mode, "Check enabled"),
            None => info!(
                check = kind.log_tag(),
                entries = metrics.blocklist_entries,
                blocking = engine.config().blocklist.blocking_count(),
                "Check enabled"
            ),
        }
    }
    info!("Disposition Engine ready");

    match &args.event {
        Some(path) => {
            info!("Evaluating event file: {:?}", path);
            let json = tokio::fs::read_to_string(path).await?;
            let answer = answer_line(&engine, &json, 1, args.report)?;
            if answer.is_rejected() {
                return Err(Error::parse(format!("invalid receipt event in {:?}", path)));
            }

            let mut stdout = tokio::io::stdout();
            stdout.write_all(answer.as_str().as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        None => {
            let mut stdout = tokio::io::stdout();
            let summary =
                serve_lines(&engine, BufReader::new(tokio::io::stdin()), &mut stdout, args.report).await?;
            if summary.lines == 0 {
                warn!("No events received on stdin");
            }
            info!(
                lines = summary.lines,
                answered = summary.answered,
                rejected = summary.rejected,
                "Input stream closed"
            );
        }
    }

    if let Some(telemetry) = engine.metrics().telemetry {
        info!(
            batches = telemetry.total_batches,
            halted = telemetry.batches_halt,
            records = telemetry.records,
            skipped_addresses = telemetry.skipped_addresses,
            avg_evaluation_time_ms = telemetry.avg_evaluation_time_ms,
            "Shutting down Disposition Engine"
        );
    }

    Ok(())
}

/// Initialize the logging system. `RUST_LOG` takes precedence over the level
/// argument.
fn init_logging(level: &str, json_format: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json_format {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::internal(format!("Failed to set logging subscriber: {}", e)))
}
