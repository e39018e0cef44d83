use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use termtip::dictionary::{dictionary_fingerprint, load_dictionary_async};
use termtip::discovery::{self, DiscoveryConfig};
use termtip::{process_files_parallel, AnnotateOptions, Annotator, ProcessingConfig, RestartLog};

#[derive(Parser, Debug)]
#[command(name = "termtip")]
#[command(about = "Wrap the first mention of each glossary term in markdown documents with a tooltip")]
#[command(version)]
struct Args {
    /// Root directory to scan for documents
    root_dir: PathBuf,

    /// JSON glossary: an array of {term, aliases?, content?} records
    #[arg(long, short = 'd')]
    dictionary: PathBuf,

    /// Extension of documents to annotate
    #[arg(long, default_value = "md")]
    extension: String,

    /// Element name of the inserted tooltip
    #[arg(long, default_value = "tooltip")]
    tag: String,

    /// Tooltip body for terms without content
    #[arg(long, default_value = "missing content")]
    missing_content: String,

    /// Treat tooltips already present in the input as annotated and protected
    #[arg(long)]
    respect_existing: bool,

    /// Re-annotate files already recorded as complete
    #[arg(long)]
    overwrite_all: bool,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Use memory-mapped I/O instead of async buffered
    #[arg(long)]
    use_mmap: bool,

    /// Walk the tree with parallel directory traversal
    #[arg(long)]
    parallel_discovery: bool,

    /// Maximum number of files annotated concurrently
    #[arg(long, default_value_t = num_cpus::get())]
    max_concurrent: usize,

    /// Suppress console progress bar
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    if !args.root_dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.root_dir.display());
    }

    let terms = load_dictionary_async(&args.dictionary).await?;
    let options = AnnotateOptions {
        tag: args.tag.clone(),
        missing_content: args.missing_content.clone(),
        respect_existing: args.respect_existing,
    };
    let annotator = Arc::new(Annotator::with_options(&terms, options));
    info!("Glossary index ready: {} keys", annotator.index().len());

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        extension: args.extension.clone(),
    };
    let discovered = if args.parallel_discovery {
        discovery::collect_discovered_files_parallel(&args.root_dir, discovery_config).await?
    } else {
        discovery::collect_discovered_files(&args.root_dir, discovery_config).await?
    };
    let (valid, invalid): (Vec<_>, Vec<_>) =
        discovered.into_iter().partition(|f| f.error.is_none());
    for file in &invalid {
        if let Some(ref error) = file.error {
            info!("Issue with {}: {}", file.path.display(), error);
        }
    }

    let fingerprint = dictionary_fingerprint(&terms);
    let mut restart_log = RestartLog::load_for_dictionary(&args.root_dir, &fingerprint).await;
    let dropped = restart_log.verify_completed_files();
    if !dropped.is_empty() {
        info!("{} completed files lost their output and will be redone", dropped.len());
    }

    let progress = if args.no_progress {
        None
    } else {
        let bar = ProgressBar::new(valid.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} files ({elapsed})")
                .context("Invalid progress template")?,
        );
        Some(bar)
    };

    let config = ProcessingConfig {
        fail_fast: args.fail_fast,
        use_mmap: args.use_mmap,
        max_concurrent: args.max_concurrent,
        overwrite_all: args.overwrite_all,
    };
    let paths = valid.into_iter().map(|f| f.path).collect();
    let outcome =
        process_files_parallel(paths, annotator, config, &mut restart_log, progress.as_ref()).await;

    // Completed files are recorded even when the run aborts
    restart_log.save(&args.root_dir).await?;
    let run_stats = outcome?;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    run_stats.write_json(&args.stats_out).await?;

    println!("termtip v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Annotated {} files ({} skipped, {} failed, {} with discovery issues)",
        run_stats.files_processed,
        run_stats.files_skipped,
        run_stats.files_failed,
        invalid.len()
    );
    println!("Inserted {} tooltips", run_stats.total_injections);
    println!("Stats written to {}", args.stats_out.display());

    Ok(())
}
