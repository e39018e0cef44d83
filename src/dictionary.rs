// WHY: the CLI reads its glossary from JSON; the engine itself only sees `&[Term]`

use anyhow::{Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

use crate::term_injector::Term;

/// Accepted on-disk layouts: a bare array, or an object with a `terms` array
#[derive(Deserialize)]
#[serde(untagged)]
enum DictionaryFile {
    Bare(Vec<Term>),
    Wrapped { terms: Vec<Term> },
}

impl DictionaryFile {
    fn into_terms(self) -> Vec<Term> {
        match self {
            DictionaryFile::Bare(terms) | DictionaryFile::Wrapped { terms } => terms,
        }
    }
}

/// Parse a dictionary from JSON text
pub fn parse_dictionary(json: &str) -> Result<Vec<Term>> {
    let file: DictionaryFile =
        serde_json::from_str(json).context("Dictionary is not a JSON array of terms or {\"terms\": [...]}")?;
    Ok(file.into_terms())
}

/// Load a dictionary file
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<Vec<Term>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
    let terms = parse_dictionary(&json)
        .with_context(|| format!("Failed to parse dictionary {}", path.display()))?;
    info!("Loaded {} terms from {}", terms.len(), path.display());
    Ok(terms)
}

/// Load a dictionary file without blocking the runtime
pub async fn load_dictionary_async<P: AsRef<Path>>(path: P) -> Result<Vec<Term>> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
    let terms = parse_dictionary(&json)
        .with_context(|| format!("Failed to parse dictionary {}", path.display()))?;
    info!("Loaded {} terms from {}", terms.len(), path.display());
    Ok(terms)
}

/// Fingerprint of a dictionary, recorded in the restart log
/// WHY: outputs produced with a different glossary must be regenerated
/// SHA-256 of the compact JSON form, so the value survives toolchain upgrades
pub fn dictionary_fingerprint(terms: &[Term]) -> String {
    // Terms are plain strings; serialization cannot fail
    let bytes = serde_json::to_vec(terms).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    format!("{:x}", hasher.finalize())
}
