use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use commata::config::{build_filter_config, LexiconOptions};
use commata::discovery::{self, DiscoveryConfig, SelectionPolicy};
use commata::export::{self, OutputPaths};
use commata::{BatchRunner, ConstructionFilter, FrequencyTable, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "commata")]
#[command(about = "Count comma-delimited introductory constructions in CoNLL-U corpora")]
#[command(version)]
struct Args {
    /// Root directories to scan for *.conllu files
    #[arg(required = true)]
    roots: Vec<PathBuf>,

    /// Directory for the snapshot and TSV tables
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Newline-separated stopword file replacing the built-in list
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Additional stopwords
    #[arg(long, value_delimiter = ',')]
    extra_stopwords: Vec<String>,

    /// Characters that disqualify a construction, replacing the built-in set
    #[arg(long)]
    excluded_chars: Option<String>,

    /// Skip files whose path contains this marker (repeatable)
    #[arg(long = "skip-marker", default_value = discovery::DEFAULT_SKIP_MARKER)]
    skip_markers: Vec<String>,

    /// Stop at the first file larger than this many bytes
    #[arg(long, default_value_t = discovery::DEFAULT_MAX_FILE_BYTES)]
    max_file_bytes: u64,

    /// Process files of any size
    #[arg(long, conflicts_with = "max_file_bytes")]
    no_size_limit: bool,

    /// Previously saved snapshots to merge into this run's counters
    #[arg(long = "merge-snapshot")]
    merge_snapshots: Vec<PathBuf>,

    /// Rows of each table printed after the run
    #[arg(long, default_value_t = 50)]
    top: usize,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Walk roots with the parallel directory walker
    #[arg(long)]
    parallel_discovery: bool,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

fn print_top(title: &str, table: &FrequencyTable, k: usize) {
    println!("{title} (top {k} of {}):", table.len());
    for (construction, frequency) in table.top_k(k) {
        println!("  {frequency:>8}  {construction}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting commata");
    info!(?args, "Parsed CLI arguments");

    for root in &args.roots {
        if !root.is_dir() {
            anyhow::bail!("Root path is not a directory: {}", root.display());
        }
    }
    tokio::fs::create_dir_all(&args.out_dir).await?;

    let filter_config = build_filter_config(LexiconOptions {
        stopword_file: args.stopwords.as_deref(),
        extra_stopwords: &args.extra_stopwords,
        excluded_chars: args.excluded_chars.as_deref(),
    })
    .await?;

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        parallel: args.parallel_discovery,
        ..Default::default()
    };
    let candidates = discovery::collect_from_roots(&args.roots, discovery_config).await?;

    let policy = SelectionPolicy {
        skip_markers: args.skip_markers.clone(),
        max_file_bytes: (!args.no_size_limit).then_some(args.max_file_bytes),
    };
    let selection = discovery::select_files(candidates, &policy);

    for file in &selection.invalid {
        if let Some(ref error) = file.error {
            info!("Issue with {}: {}", file.path.display(), error);
        }
    }

    let run_config = RunConfig {
        fail_fast: args.fail_fast,
        no_progress: args.no_progress,
        ..Default::default()
    };
    let mut runner = BatchRunner::new(run_config, ConstructionFilter::new(filter_config));
    runner.note_skipped(&selection.skipped, "skip marker");
    runner.note_skipped(&selection.oversized, "over size limit");
    runner.note_skipped(&selection.invalid, "inaccessible");

    for snapshot in &args.merge_snapshots {
        let earlier = export::load_snapshot(snapshot).await?;
        runner.merge(&earlier);
    }

    runner.run(&selection.selected).await?;
    let (aggregator, stats) = runner.finish();

    export::write_outputs(&aggregator, &OutputPaths::in_dir(&args.out_dir)).await?;
    stats.write_json(&args.stats_out).await?;

    println!("commata v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Files: {} processed, {} failed, {} skipped",
        stats.files_processed, stats.files_failed, stats.files_skipped
    );
    println!(
        "Sentences: {}, spans: {}, constructions kept: {}",
        stats.totals.sentences, stats.totals.spans, stats.totals.kept
    );
    print_top("All constructions", aggregator.all(), args.top);
    print_top("Noun-bearing constructions", aggregator.noun_bearing(), args.top);

    Ok(())
}
