use anyhow::{Context, Result};
use memmap2::Mmap;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
        }
    }
}

/// Statistics for file reading operations
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

impl ReadStats {
    fn failed(path: &Path, started: std::time::Instant, error: String) -> Self {
        Self {
            file_path: path.display().to_string(),
            bytes_read: 0,
            duration_ms: started.elapsed().as_millis() as u64,
            read_error: Some(error),
        }
    }
}

/// Async reader that loads whole documents
/// WHY: annotation rewrites across line boundaries, so documents are read in one piece
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a document with async buffered I/O
    /// Without fail_fast, errors come back as empty content plus `read_error`
    pub async fn read_file<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        debug!("Starting async read of file: {}", path.display());

        let outcome = async {
            let file = File::open(path)
                .await
                .with_context(|| format!("Failed to open file {}", path.display()))?;
            let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
            let mut content = String::new();
            reader
                .read_to_string(&mut content)
                .await
                .with_context(|| format!("Failed to read {} as UTF-8", path.display()))?;
            Ok::<_, anyhow::Error>(content)
        }
        .await;

        self.finish(path, start_time, outcome)
    }

    /// Read a document through a memory map
    pub fn read_file_mmap<P: AsRef<Path>>(&self, file_path: P) -> Result<(String, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();

        let outcome = (|| -> Result<String> {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open file {}", path.display()))?;
            // Zero-length files cannot be mapped on every platform
            if file.metadata()?.len() == 0 {
                return Ok(String::new());
            }
            // SAFETY: the map is read once and dropped before returning
            let mmap = unsafe { Mmap::map(&file) }
                .with_context(|| format!("Failed to memory-map {}", path.display()))?;
            let content = std::str::from_utf8(&mmap)
                .with_context(|| format!("Failed to read {} as UTF-8", path.display()))?;
            Ok(content.to_string())
        })();

        self.finish(path, start_time, outcome)
    }

    fn finish(
        &self,
        path: &Path,
        start_time: std::time::Instant,
        outcome: Result<String>,
    ) -> Result<(String, ReadStats)> {
        match outcome {
            Ok(content) => {
                let stats = ReadStats {
                    file_path: path.display().to_string(),
                    bytes_read: content.len() as u64,
                    duration_ms: start_time.elapsed().as_millis() as u64,
                    read_error: None,
                };
                info!(
                    "Successfully read {}: {} bytes in {}ms",
                    path.display(),
                    stats.bytes_read,
                    stats.duration_ms
                );
                Ok((content, stats))
            }
            Err(e) => {
                let error_msg = format!("{e:#}");
                warn!("{}", error_msg);

                if self.config.fail_fast {
                    Err(e)
                } else {
                    Ok((String::new(), ReadStats::failed(path, start_time, error_msg)))
                }
            }
        }
    }
}

/// Convenience function for reading a single file with default configuration
/// WHY: Simplifies common use case for integration tests and external callers
pub async fn read_file_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = AsyncFileReader::new(ReaderConfig {
        fail_fast: true,
        ..ReaderConfig::default()
    });
    let (content, _stats) = reader.read_file(file_path).await?;
    Ok(content)
}
