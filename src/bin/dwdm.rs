//! `dwdm`: classify, store and analyse DWDM export archives.

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dwdm_monitor::analysis::{build_analyzers, run_analyzers};
use dwdm_monitor::classify::Classifier;
use dwdm_monitor::config::MonitorConfig;
use dwdm_monitor::core::ClassificationResult;
use dwdm_monitor::io::{read_archive, IOLimits};
use dwdm_monitor::logging::{init_tracing, init_tracing_json};
use dwdm_monitor::report::SummaryReport;
use dwdm_monitor::storage::{LocalUploadStore, UploadStore};
use dwdm_monitor::timeout::classify_with_timeout;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "dwdm")]
#[command(about = "DWDM network health report classifier and analyzer")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify archives and print which report kinds were found
    Classify {
        #[arg(required = true)]
        archives: Vec<PathBuf>,
    },

    /// Store archives under an upload date
    Upload {
        /// Upload date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(required = true)]
        archives: Vec<PathBuf>,
    },

    /// List uploads for a date, newest first
    List {
        #[arg(long)]
        date: NaiveDate,
    },

    /// Show upload dates with their counts
    Dates,

    /// Delete a stored upload
    Delete { id: Uuid },

    /// Classify stored uploads, run the configured analyzers and print the report
    Analyze {
        #[arg(required = true)]
        ids: Vec<Uuid>,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "debug" } else { "info" };
    if cli.json_logs {
        init_tracing_json(directive);
    } else {
        init_tracing(directive);
    }

    let config = match &cli.config {
        Some(path) => MonitorConfig::from_path(path)?,
        None => MonitorConfig::default(),
    };

    match cli.command {
        Commands::Classify { archives } => cmd_classify(&config, &archives).await,
        Commands::Upload { date, archives } => cmd_upload(&config, date, &archives),
        Commands::List { date } => cmd_list(&config, date),
        Commands::Dates => cmd_dates(&config),
        Commands::Delete { id } => cmd_delete(&config, id),
        Commands::Analyze { ids, json } => cmd_analyze(&config, &ids, json).await,
    }
}

fn open_store(config: &MonitorConfig) -> Result<LocalUploadStore> {
    LocalUploadStore::open(&config.storage.root)
        .with_context(|| format!("opening upload store {}", config.storage.root.display()))
}

async fn cmd_classify(config: &MonitorConfig, archives: &[PathBuf]) -> Result<()> {
    let classifier = Arc::new(Classifier::new(config.classifier.clone())?);
    for path in archives {
        let bytes = read_archive(path, &IOLimits::default())
            .with_context(|| format!("reading {}", path.display()))?;
        let result = classify_with_timeout(classifier.clone(), bytes, config.timeout_seconds)
            .await
            .with_context(|| format!("classifying {}", path.display()))?;
        let summary = serde_json::json!({
            "archive": path.display().to_string(),
            "kinds": result.summary().kinds,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn cmd_upload(config: &MonitorConfig, date: NaiveDate, archives: &[PathBuf]) -> Result<()> {
    let store = open_store(config)?;
    for path in archives {
        let bytes = read_archive(path, &IOLimits::default())
            .with_context(|| format!("reading {}", path.display()))?;
        let record = store.save(date, &file_name(path), &bytes)?;
        println!("{}\t{}\t{}", record.id, record.upload_date, record.orig_filename);
    }
    Ok(())
}

fn cmd_list(config: &MonitorConfig, date: NaiveDate) -> Result<()> {
    let store = open_store(config)?;
    let records = store.list_by_date(date)?;
    if records.is_empty() {
        println!("No uploads on {}", date);
    }
    for r in records {
        println!(
            "{}\t{}\t{}\t{} bytes",
            r.id,
            r.created_at.format("%H:%M:%S"),
            r.orig_filename,
            r.size
        );
    }
    Ok(())
}

fn cmd_dates(config: &MonitorConfig) -> Result<()> {
    let store = open_store(config)?;
    for (date, count) in store.dates_with_counts()? {
        println!("{}\t{}", date, count);
    }
    Ok(())
}

fn cmd_delete(config: &MonitorConfig, id: Uuid) -> Result<()> {
    let store = open_store(config)?;
    if !store.delete(id)? {
        bail!("no upload with id {}", id);
    }
    println!("Deleted {}", id);
    Ok(())
}

async fn cmd_analyze(config: &MonitorConfig, ids: &[Uuid], json: bool) -> Result<()> {
    let store = open_store(config)?;
    let classifier = Arc::new(Classifier::new(config.classifier.clone())?);
    let analyzers = build_analyzers(&config.analyzers)?;

    // Later uploads replace kinds found in earlier ones.
    let mut merged = ClassificationResult::default();
    let mut archives = Vec::with_capacity(ids.len());
    for &id in ids {
        let record = store
            .find(id)?
            .with_context(|| format!("no upload with id {}", id))?;
        let bytes: Bytes = store.fetch(id)?;
        let result = classify_with_timeout(classifier.clone(), bytes, config.timeout_seconds)
            .await
            .with_context(|| format!("classifying {}", record.orig_filename))?;
        merged.overlay(result);
        archives.push(record.orig_filename);
    }

    let run = run_analyzers(&analyzers, &merged);
    let report = SummaryReport::from_run(run, &config.analyzer_names(), archives);
    info!(flagged = report.flagged_rows(), "Analysis complete");
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
