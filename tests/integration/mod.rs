// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture helper for creating temporary document trees
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            root_path,
        }
    }

    /// Create a document with given content, creating parent directories
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write the glossary JSON into the fixture root
    pub fn create_dictionary(&self, json: &str) -> PathBuf {
        let path = self.root_path.join("glossary.json");
        fs::write(&path, json).expect("Failed to write dictionary");
        path
    }

    /// Read the annotated output for a source document
    pub fn read_output<P: AsRef<Path>>(&self, source_path: P) -> String {
        termtip::incremental::read_output(source_path).expect("Failed to read annotated output")
    }
}

/// Compare actual output against a golden expectation with a readable diff
pub fn assert_golden_file(actual: &str, expected: &str, test_name: &str) {
    if actual == expected {
        return;
    }

    eprintln!("Golden file mismatch in {test_name}");
    for (line_no, (a, e)) in actual.lines().zip(expected.lines()).enumerate() {
        if a != e {
            eprintln!("  line {}:\n    actual:   {a}\n    expected: {e}", line_no + 1);
        }
    }
    panic!(
        "Golden file mismatch in {test_name}: {} actual lines vs {} expected",
        actual.lines().count(),
        expected.lines().count()
    );
}
