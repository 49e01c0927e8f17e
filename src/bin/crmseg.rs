//! crmseg CLI - Command-line interface for the segmentation engine
//!
//! Loads the user roster and behavior log (plus an optional prior snapshot),
//! runs one segmentation pass, and writes one CSV per non-empty segment,
//! optionally bundled into a single ZIP archive.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::Parser;

use crm_segmenter::exporter::{csv_file_name, segment_to_csv, write_archive};
use crm_segmenter::loader::load_csv_file;
use crm_segmenter::{SegmentError, SegmentMap, SegmentationPipeline, ENGINE_VERSION};

/// crmseg - classify CRM user data into marketing segments
#[derive(Parser)]
#[command(name = "crmseg")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Classify CRM user data into marketing segments", long_about = None)]
struct Cli {
    /// User roster CSV (required)
    #[arg(long)]
    users: PathBuf,

    /// Behavior log CSV (required)
    #[arg(long)]
    behavior: PathBuf,

    /// Prior-snapshot roster CSV; enables the level-change segments
    #[arg(long)]
    prev: Option<PathBuf>,

    /// Directory to write per-segment CSV files into
    #[arg(long, default_value = "segments")]
    out_dir: PathBuf,

    /// Also write a segments.zip bundling the non-empty segments
    #[arg(long)]
    zip: bool,

    /// Pin the evaluation instant (e.g. "2024-06-15 12:00:00") for
    /// reproducible runs; defaults to the current UTC time
    #[arg(long)]
    now: Option<String>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
enum CliError {
    Segment(SegmentError),
    Io(std::io::Error),
    BadInstant(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Segment(e) => write!(f, "{e}"),
            CliError::Io(e) => write!(f, "{e}"),
            CliError::BadInstant(s) => {
                write!(f, "Cannot parse --now value {s:?}; expected e.g. \"2024-06-15 12:00:00\"")
            }
        }
    }
}

impl From<SegmentError> for CliError {
    fn from(e: SegmentError) -> Self {
        CliError::Segment(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let pipeline = match &cli.now {
        Some(raw) => {
            let now = crm_segmenter::normalizer::parse_timestamp(raw)
                .ok_or_else(|| CliError::BadInstant(raw.clone()))?;
            SegmentationPipeline::with_now(now)
        }
        None => SegmentationPipeline::new(),
    };

    let user = load_csv_file(&cli.users)?;
    let behavior = load_csv_file(&cli.behavior)?;
    let prior = cli.prev.as_ref().map(load_csv_file).transpose()?;

    let segments = pipeline.run(&user, &behavior, prior.as_ref())?;

    fs::create_dir_all(&cli.out_dir)?;

    for (label, rows) in &segments {
        if rows.is_empty() {
            continue;
        }
        let path = cli.out_dir.join(csv_file_name(label));
        fs::write(path, segment_to_csv(rows)?)?;
    }

    if cli.zip {
        fs::write(cli.out_dir.join("segments.zip"), write_archive(&segments)?)?;
    }

    print_summary(&segments, cli.json, pipeline.now());
    Ok(())
}

fn print_summary(segments: &SegmentMap, json: bool, now: NaiveDateTime) {
    if json {
        let summary = serde_json::json!({
            "evaluated_at": now.format("%Y-%m-%d %H:%M:%S").to_string(),
            "segments": segments
                .iter()
                .map(|(label, rows)| (label.clone(), rows.len()))
                .collect::<std::collections::BTreeMap<_, _>>(),
        });
        println!("{summary}");
        return;
    }

    println!("Segmentation run ({})", now.format("%Y-%m-%d %H:%M:%S"));
    println!("=================");
    for (label, rows) in segments {
        if rows.is_empty() {
            println!("  {label}: no matching records");
        } else {
            println!("  {label}: {} rows", rows.len());
        }
    }
}
