// WHY: Public utilities for incremental processing
// Output naming and restart-log location helpers shared by the CLI and tests

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the file stem of every annotated output
pub const OUTPUT_SUFFIX: &str = "_annotated";

/// Generate the annotated output path for a source document
/// `docs/guide.md` becomes `docs/guide_annotated.md`
pub fn generate_output_path(source_path: &Path) -> PathBuf {
    let mut output_path = source_path.to_path_buf();
    let file_stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown");
    let file_name = match source_path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{file_stem}{OUTPUT_SUFFIX}.{ext}"),
        None => format!("{file_stem}{OUTPUT_SUFFIX}"),
    };
    output_path.set_file_name(file_name);
    output_path
}

/// True for files this tool generated, which must never be annotated again as sources
pub fn is_annotated_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}

/// Check if the annotated output exists for given source file
pub fn output_exists<P: AsRef<Path>>(source_path: P) -> bool {
    generate_output_path(source_path.as_ref()).exists()
}

/// Read the annotated output for given source file
///
/// # Example
/// ```no_run
/// use termtip::incremental::read_output;
/// let content = read_output("docs/guide.md").expect("Failed to read output");
/// ```
pub fn read_output<P: AsRef<Path>>(source_path: P) -> Result<String, io::Error> {
    fs::read_to_string(generate_output_path(source_path.as_ref()))
}

/// Write the annotated output for given source file, verbatim
///
/// # Example
/// ```no_run
/// use termtip::incremental::write_output;
/// write_output("docs/guide.md", "<tooltip title=\"Layer\">A map layer</tooltip>\n")
///     .expect("Failed to write output");
/// ```
pub fn write_output<P: AsRef<Path>>(source_path: P, content: &str) -> Result<PathBuf, io::Error> {
    let output_path = generate_output_path(source_path.as_ref());
    fs::write(&output_path, content)?;
    Ok(output_path)
}

/// Restart log location for a root directory
pub fn generate_restart_log_path<P: AsRef<Path>>(root_dir: P) -> PathBuf {
    root_dir.as_ref().join(".termtip_restart.json")
}

/// Check if a restart log exists in given directory
pub fn restart_log_exists<P: AsRef<Path>>(root_dir: P) -> bool {
    generate_restart_log_path(root_dir).exists()
}
