//! compare_runner - command-line front end for the `pixel_compare` engine.
//!
//! Compares one pair of images, or every pair listed in a manifest, and prints
//! one status line per row (or JSON with `--json`).

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pixel_compare::config::{DEFAULT_CONCURRENCY, DEFAULT_EXPAND_PIXELS, DEFAULT_MERGE_DISTANCE, DEFAULT_MIN_AREA, DEFAULT_THRESHOLD};
use pixel_compare::manifest::load_manifest;
use pixel_compare::{
    BatchEntry, BatchProgress, BatchScheduler, CompareConfig, ComparisonItem, ComparisonPipeline, MergeStrategy,
};
use serde::Serialize;
use tokio::sync::mpsc;

/// Measure and localize pixel differences between image pairs
#[derive(Parser, Debug)]
#[command(name = "compare_runner")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXIT CODES:
    0 - Every pair compared (differences and size mismatches included)
    1 - At least one pair failed to compare
    2 - Usage or manifest error")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: CompareOptions,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a single pair of images
    Pair {
        #[arg(value_name = "IMAGE1")]
        image1: PathBuf,
        #[arg(value_name = "IMAGE2")]
        image2: PathBuf,
        /// Row number used in artifact names
        #[arg(long, default_value_t = 0)]
        row: u32,
    },
    /// Compare every pair listed in a manifest of `row,image1,image2` lines
    Batch {
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,
    },
}

#[derive(Args, Debug)]
struct CompareOptions {
    /// Grayscale difference a pixel must exceed to count as changed
    #[arg(long, global = true, env = "PIXEL_COMPARE_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Minimum bounding-box area for a region to be reported
    #[arg(long, global = true, env = "PIXEL_COMPARE_MIN_AREA", default_value_t = DEFAULT_MIN_AREA)]
    min_area: u32,

    /// Dilation radius applied to the mask before region extraction
    #[arg(long, global = true, env = "PIXEL_COMPARE_EXPAND", default_value_t = DEFAULT_EXPAND_PIXELS)]
    expand: u32,

    /// Regions closer than this many pixels are merged
    #[arg(long, global = true, env = "PIXEL_COMPARE_MERGE_DISTANCE", default_value_t = DEFAULT_MERGE_DISTANCE)]
    merge_distance: u32,

    #[arg(long, global = true, value_enum, env = "PIXEL_COMPARE_MERGE_STRATEGY", default_value = "greedy")]
    merge_strategy: StrategyArg,

    /// Maximum number of pairs compared at once
    #[arg(long, global = true, env = "PIXEL_COMPARE_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Where diff and annotated images are written (default: system temp dir)
    #[arg(long, global = true, env = "PIXEL_COMPARE_OUTPUT_DIR", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StrategyArg {
    Greedy,
    Connected,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => MergeStrategy::Greedy,
            StrategyArg::Connected => MergeStrategy::Connected,
        }
    }
}

impl CompareOptions {
    fn to_config(&self) -> CompareConfig {
        CompareConfig {
            threshold: self.threshold,
            min_area: self.min_area,
            expand_pixels: self.expand,
            merge_distance: self.merge_distance,
            merge_strategy: self.merge_strategy.into(),
            concurrency: self.concurrency,
            ..CompareConfig::default()
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    total: usize,
    failed: usize,
    results: &'a [BatchEntry],
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(entries) => {
            if entries.iter().any(|entry| entry.result.is_failure()) {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<Vec<BatchEntry>> {
    let config = cli.options.to_config();
    let mut pipeline = ComparisonPipeline::new(config.clone()).context("invalid comparison settings")?;
    if let Some(dir) = &cli.options.output_dir {
        pipeline = pipeline.with_artifact_dir(dir);
    }
    log::info!("artifacts go to {}", pipeline.artifact_dir().display());

    let items = match &cli.command {
        Command::Pair { image1, image2, row } => vec![ComparisonItem::new(*row, image1, image2)],
        Command::Batch { manifest } => read_items(manifest)?,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let scheduler = BatchScheduler::new(pipeline, config.concurrency);
    let entries = runtime.block_on(async {
        let (sender, receiver) = mpsc::unbounded_channel();
        let reporter = tokio::spawn(report_progress(receiver));
        let entries = scheduler.run(items, Some(sender)).await;
        // The sender was moved into `run` and is dropped with it, ending the reporter.
        let _ = reporter.await;
        entries
    });

    print_entries(&entries, cli.options.json)?;
    Ok(entries)
}

fn read_items(manifest: &Path) -> anyhow::Result<Vec<ComparisonItem>> {
    let items = load_manifest(manifest).with_context(|| format!("cannot use manifest {}", manifest.display()))?;
    log::info!("{} pair(s) listed in {}", items.len(), manifest.display());
    Ok(items)
}

async fn report_progress(mut receiver: mpsc::UnboundedReceiver<BatchProgress>) {
    while let Some(progress) = receiver.recv().await {
        log::info!(
            "[{}/{}] {:.0}% row {} done",
            progress.completed,
            progress.total,
            progress.fraction() * 100.0,
            progress.row_index
        );
    }
}

fn print_entries(entries: &[BatchEntry], json: bool) -> anyhow::Result<()> {
    if json {
        let output = JsonOutput {
            total: entries.len(),
            failed: entries.iter().filter(|entry| entry.result.is_failure()).count(),
            results: entries,
        };
        println!("{}", serde_json::to_string_pretty(&output).context("failed to encode results")?);
        return Ok(());
    }

    for entry in entries {
        println!("row {}: {}", entry.row_index, entry.result.status_label());
    }
    Ok(())
}
