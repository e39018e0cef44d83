// WHY: Batch annotation of many documents with bounded concurrency
// Kept in the library so the CLI, tests and benchmarks share one pipeline

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

use crate::incremental::generate_output_path;
use crate::reader::{AsyncFileReader, ReaderConfig};
use crate::restart_log::{should_process_file, source_modified, RestartLog};
use crate::term_injector::Annotator;

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Abort the run on the first failing file
    pub fail_fast: bool,
    /// Read inputs through a memory map
    pub use_mmap: bool,
    /// Files annotated concurrently
    pub max_concurrent: usize,
    /// Re-annotate files the restart log marks as complete
    pub overwrite_all: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            use_mmap: false,
            max_concurrent: num_cpus::get(),
            overwrite_all: false,
        }
    }
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FileStats {
    pub path: String,
    /// Number of characters processed
    pub chars_processed: u64,
    /// Tooltips inserted
    pub injections: u64,
    /// Candidates inside links, anchors, headings or existing tooltips
    pub skipped_excluded: u64,
    /// Candidates whose surface text was already annotated
    pub skipped_duplicate: u64,
    /// Processing time in milliseconds, read to write
    pub processing_time_ms: u64,
    /// Annotation time in milliseconds (subset of processing_time_ms)
    pub annotation_time_ms: u64,
    pub chars_per_sec: f64,
    /// Processing status (success, skipped, failed)
    pub status: String,
    pub error: Option<String>,
    /// Source modification time observed before reading, kept in the restart log
    #[serde(skip)]
    pub source_modified: Option<u64>,
}

impl FileStats {
    fn empty(path: &Path, status: &str, error: Option<String>) -> Self {
        Self {
            path: path.display().to_string(),
            chars_processed: 0,
            injections: 0,
            skipped_excluded: 0,
            skipped_duplicate: 0,
            processing_time_ms: 0,
            annotation_time_ms: 0,
            chars_per_sec: 0.0,
            status: status.to_string(),
            error,
            source_modified: None,
        }
    }

    pub fn skipped(path: &Path) -> Self {
        Self::empty(path, "skipped", None)
    }

    pub fn failed(path: &Path, error: String) -> Self {
        Self::empty(path, "failed", Some(error))
    }
}

/// Aggregate statistics for one run
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    pub files_processed: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub total_chars: u64,
    pub total_injections: u64,
    pub run_time_ms: u64,
    pub files: Vec<FileStats>,
}

impl RunStats {
    fn record(&mut self, stats: FileStats) {
        match stats.status.as_str() {
            "success" => {
                self.files_processed += 1;
                self.total_chars += stats.chars_processed;
                self.total_injections += stats.injections;
            }
            "skipped" => self.files_skipped += 1,
            _ => self.files_failed += 1,
        }
        self.files.push(stats);
    }

    /// Write run statistics as pretty JSON
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
        Ok(())
    }
}

/// Write annotated text next to its source
pub async fn write_output_file(output_path: &Path, content: &str) -> Result<()> {
    let file = tokio::fs::File::create(output_path)
        .await
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(content.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read, annotate and write one document
/// Read failures without fail_fast come back as a failed `FileStats`
pub async fn annotate_file(
    path: &Path,
    annotator: Arc<Annotator>,
    config: &ProcessingConfig,
) -> Result<FileStats> {
    let start = Instant::now();
    // Taken before the read so an edit made mid-run is picked up next time
    let modified = source_modified(path);
    let reader = AsyncFileReader::new(ReaderConfig {
        fail_fast: config.fail_fast,
        ..ReaderConfig::default()
    });

    let (content, read_stats) = if config.use_mmap {
        reader.read_file_mmap(path)?
    } else {
        reader.read_file(path).await?
    };
    if let Some(error) = read_stats.read_error {
        return Ok(FileStats::failed(path, error));
    }

    let chars_processed = content.chars().count() as u64;
    let annotation_start = Instant::now();
    // WHY: annotation is CPU-bound; keep it off the async worker threads
    let annotated = tokio::task::spawn_blocking(move || annotator.annotate(&content))
        .await
        .context("Annotation task panicked")?;
    let annotation_time_ms = annotation_start.elapsed().as_millis() as u64;

    let output_path = generate_output_path(path);
    write_output_file(&output_path, &annotated.text).await?;

    let elapsed = start.elapsed();
    let stats = FileStats {
        path: path.display().to_string(),
        chars_processed,
        injections: annotated.injections.len() as u64,
        skipped_excluded: annotated.skipped_excluded as u64,
        skipped_duplicate: annotated.skipped_duplicate as u64,
        processing_time_ms: elapsed.as_millis() as u64,
        annotation_time_ms,
        chars_per_sec: if elapsed.as_secs_f64() > 0.0 {
            chars_processed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        },
        status: "success".to_string(),
        error: None,
        source_modified: modified,
    };

    info!(
        "Annotated {}: {} tooltips, {} excluded, {} duplicates -> {}",
        path.display(),
        stats.injections,
        stats.skipped_excluded,
        stats.skipped_duplicate,
        output_path.display()
    );
    Ok(stats)
}

/// Annotate many documents concurrently, recording completions in the restart log
pub async fn process_files_parallel(
    files: Vec<PathBuf>,
    annotator: Arc<Annotator>,
    config: ProcessingConfig,
    restart_log: &mut RestartLog,
    progress: Option<&ProgressBar>,
) -> Result<RunStats> {
    let run_start = Instant::now();
    let mut run_stats = RunStats::default();

    let (pending, skipped): (Vec<PathBuf>, Vec<PathBuf>) = files
        .into_iter()
        .partition(|path| should_process_file(path, restart_log, config.overwrite_all));

    for path in &skipped {
        info!("Skipping already annotated file: {}", path.display());
        run_stats.record(FileStats::skipped(path));
        if let Some(bar) = progress {
            bar.inc(1);
        }
    }

    let config = Arc::new(config);
    let concurrency = config.max_concurrent.max(1);
    let mut results = stream::iter(pending)
        .map(|path| {
            let annotator = Arc::clone(&annotator);
            let config = Arc::clone(&config);
            async move {
                let result = annotate_file(&path, annotator, &config).await;
                (path, result)
            }
        })
        .buffer_unordered(concurrency);

    while let Some((path, result)) = results.next().await {
        if let Some(bar) = progress {
            bar.inc(1);
        }
        match result {
            Ok(stats) => {
                if stats.error.is_none() {
                    if let Some(modified) = stats.source_modified {
                        restart_log.mark_completed(&path, modified);
                    }
                } else if config.fail_fast {
                    anyhow::bail!(
                        "Failed to annotate {}: {}",
                        path.display(),
                        stats.error.unwrap_or_default()
                    );
                }
                run_stats.record(stats);
            }
            Err(e) => {
                if config.fail_fast {
                    return Err(e.context(format!("Failed to annotate {}", path.display())));
                }
                warn!("Failed to annotate {}: {:#}", path.display(), e);
                run_stats.record(FileStats::failed(&path, format!("{e:#}")));
            }
        }
    }

    run_stats.run_time_ms = run_start.elapsed().as_millis() as u64;
    info!(
        "Run complete: {} annotated, {} skipped, {} failed, {} tooltips",
        run_stats.files_processed,
        run_stats.files_skipped,
        run_stats.files_failed,
        run_stats.total_injections
    );
    Ok(run_stats)
}
