use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::{info, warn};

use crate::incremental::{generate_output_path, generate_restart_log_path};

/// Simple restart log that tracks successfully annotated files
/// WHY: Provides restartability without re-annotating an unchanged tree
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct RestartLog {
    /// Fingerprint of the dictionary the completed files were annotated with
    #[serde(default)]
    dictionary_fingerprint: String,
    /// Successfully processed file paths with the source modification time they were read at
    completed_files: HashMap<String, u64>,
    /// Timestamp of last update
    last_updated: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Modification time of a source file in nanoseconds since the epoch
/// None when the file or its timestamp cannot be read
pub fn source_modified(file_path: &Path) -> Option<u64> {
    let modified = std::fs::metadata(file_path).ok()?.modified().ok()?;
    let since_epoch = modified.duration_since(UNIX_EPOCH).ok()?;
    Some(since_epoch.as_nanos() as u64)
}

impl RestartLog {
    /// Load restart log from file, returns empty log if file doesn't exist
    /// WHY: Graceful fallback ensures the system works even without prior log
    pub async fn load(root_dir: &Path) -> Self {
        let log_path = generate_restart_log_path(root_dir);

        match fs::read_to_string(&log_path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring unreadable restart log {}: {}", log_path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Load the log and discard it when it was written for another dictionary
    pub async fn load_for_dictionary(root_dir: &Path, fingerprint: &str) -> Self {
        let mut log = Self::load(root_dir).await;
        if log.dictionary_fingerprint != fingerprint {
            if log.completed_count() > 0 {
                info!(
                    "Dictionary changed since last run, forgetting {} completed files",
                    log.completed_count()
                );
            }
            log.clear();
            log.dictionary_fingerprint = fingerprint.to_string();
        }
        log
    }

    /// Save restart log to file
    pub async fn save(&self, root_dir: &Path) -> Result<()> {
        let log_path = generate_restart_log_path(root_dir);
        let content = serde_json::to_string_pretty(self)?;

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(&log_path, content)
            .await
            .with_context(|| format!("Failed to write restart log {}", log_path.display()))?;
        Ok(())
    }

    pub fn dictionary_fingerprint(&self) -> &str {
        &self.dictionary_fingerprint
    }

    /// Check if a file has been successfully processed
    pub fn is_completed(&self, file_path: &Path) -> bool {
        let path_str = file_path.to_string_lossy().to_string();
        self.completed_files.contains_key(&path_str)
    }

    /// Source modification time recorded when the file was annotated
    pub fn recorded_modified(&self, file_path: &Path) -> Option<u64> {
        let path_str = file_path.to_string_lossy().to_string();
        self.completed_files.get(&path_str).copied()
    }

    /// Mark a file as successfully processed from a source last modified at `source_modified`
    pub fn mark_completed(&mut self, file_path: &Path, source_modified: u64) {
        let path_str = file_path.to_string_lossy().to_string();
        self.completed_files.insert(path_str, source_modified);
        self.last_updated = now_secs();
    }

    pub fn completed_count(&self) -> usize {
        self.completed_files.len()
    }

    /// Clear all completed files
    /// WHY: Allows full reprocessing when needed
    pub fn clear(&mut self) {
        self.completed_files.clear();
        self.last_updated = now_secs();
    }

    /// Drop completed entries whose source or output has disappeared
    /// Returns the entries that were dropped
    pub fn verify_completed_files(&mut self) -> Vec<PathBuf> {
        let (valid, invalid): (HashMap<String, u64>, HashMap<String, u64>) =
            self.completed_files.drain().partition(|(path_str, _)| {
                let file_path = Path::new(path_str);
                file_path.exists() && generate_output_path(file_path).exists()
            });
        self.completed_files = valid;
        invalid.into_keys().map(PathBuf::from).collect()
    }
}

/// Check if a file should be processed based on restart log and overwrite flag
pub fn should_process_file(file_path: &Path, restart_log: &RestartLog, overwrite_all: bool) -> bool {
    if overwrite_all {
        return true;
    }

    // Completed files are skipped only while the source is unchanged and the output still exists
    let unchanged = match (restart_log.recorded_modified(file_path), source_modified(file_path)) {
        (Some(recorded), Some(current)) => recorded == current,
        _ => false,
    };
    !(unchanged && generate_output_path(file_path).exists())
}
