use serde_json::Value;
use std::fs;
use std::process::Command;

#[path = "integration/fixtures/mod.rs"]
mod fixtures;
use fixtures::*;

#[path = "integration/mod.rs"]
mod test_utils;
use test_utils::{assert_golden_file, TestFixture};

fn termtip() -> Command {
    Command::new(env!("CARGO_BIN_EXE_termtip"))
}

/// End-to-end run of the binary: outputs, stats file and restart log
#[test]
fn test_cli_annotates_tree_and_writes_stats() {
    let fixture = TestFixture::new();
    let dictionary = fixture.create_dictionary(GLOSSARY_JSON);
    let guide = fixture.create_document("guide.md", GUIDE_TEXT);
    fixture.create_document("notes/plain.md", PLAIN_TEXT);
    let stats_file = fixture.root_path.join("stats.json");

    let output = termtip()
        .arg(&fixture.root_path)
        .arg("--dictionary")
        .arg(&dictionary)
        .arg("--stats-out")
        .arg(&stats_file)
        .arg("--no-progress")
        .output()
        .expect("Failed to run termtip");
    assert!(
        output.status.success(),
        "termtip failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_golden_file(&fixture.read_output(&guide), GUIDE_EXPECTED, "CLI guide output");

    let stats: Value = serde_json::from_str(&fs::read_to_string(&stats_file).unwrap())
        .expect("Stats should be valid JSON");
    assert_eq!(stats["files_processed"].as_u64(), Some(2));
    assert_eq!(stats["total_injections"].as_u64(), Some(4));
    assert_eq!(stats["files"].as_array().map(Vec::len), Some(2));
    assert!(termtip::incremental::restart_log_exists(&fixture.root_path));

    // Second run skips everything
    let output = termtip()
        .arg(&fixture.root_path)
        .args(["--dictionary"])
        .arg(&dictionary)
        .arg("--stats-out")
        .arg(&stats_file)
        .args(["--no-progress", "--parallel-discovery", "--use-mmap"])
        .output()
        .expect("Failed to run termtip");
    assert!(output.status.success());
    let stats: Value = serde_json::from_str(&fs::read_to_string(&stats_file).unwrap()).unwrap();
    assert_eq!(stats["files_skipped"].as_u64(), Some(2));
}

/// Custom tag and placeholder flags reach the engine
#[test]
fn test_cli_custom_tag() {
    let fixture = TestFixture::new();
    let dictionary = fixture.create_dictionary(r#"[{"term": "Layer"}]"#);
    let doc = fixture.create_document("doc.md", "A Layer.");

    let output = termtip()
        .arg(&fixture.root_path)
        .arg("-d")
        .arg(&dictionary)
        .args(["--tag", "terriatooltip", "--missing-content", "n/a", "--no-progress"])
        .arg("--stats-out")
        .arg(fixture.root_path.join("stats.json"))
        .output()
        .expect("Failed to run termtip");
    assert!(output.status.success());

    assert_eq!(
        fixture.read_output(&doc),
        r#"A <terriatooltip title="Layer">n/a</terriatooltip>."#
    );
}

/// Existing tooltips are only protected when asked for
#[test]
fn test_cli_respect_existing_is_opt_in() {
    let fixture = TestFixture::new();
    let dictionary = fixture.create_dictionary(r#"[{"term": "Layer", "content": "d"}]"#);
    let text = r#"<tooltip title="Layer">x</tooltip> and a Layer"#;
    let doc = fixture.create_document("doc.md", text);
    let stats_file = fixture.root_path.join("stats.json");

    let output = termtip()
        .arg(&fixture.root_path)
        .arg("-d")
        .arg(&dictionary)
        .arg("--stats-out")
        .arg(&stats_file)
        .arg("--no-progress")
        .output()
        .expect("Failed to run termtip");
    assert!(output.status.success());
    assert_eq!(
        fixture.read_output(&doc),
        r#"<tooltip title="<tooltip title="Layer">d</tooltip>">x</tooltip> and a Layer"#
    );

    let output = termtip()
        .arg(&fixture.root_path)
        .arg("-d")
        .arg(&dictionary)
        .arg("--stats-out")
        .arg(&stats_file)
        .args(["--no-progress", "--respect-existing", "--overwrite-all"])
        .output()
        .expect("Failed to run termtip");
    assert!(output.status.success());
    assert_eq!(fixture.read_output(&doc), text);
}

/// A missing root directory is a usage error
#[test]
fn test_cli_rejects_missing_root() {
    let fixture = TestFixture::new();
    let dictionary = fixture.create_dictionary(GLOSSARY_JSON);

    let output = termtip()
        .arg(fixture.root_path.join("does-not-exist"))
        .arg("--dictionary")
        .arg(&dictionary)
        .output()
        .expect("Failed to run termtip");
    assert!(!output.status.success());
}
