pub mod dictionary;
pub mod discovery;
pub mod incremental;
pub mod parallel_processing;
pub mod reader;
pub mod restart_log;
pub mod term_injector;

// Re-export the engine for convenient access
pub use term_injector::{
    inject_terms, Annotated, AnnotateOptions, Annotator, Injection, Occurrence,
    OccurrenceLocator, Term, TermIndex,
};

// Re-export batch processing types for the CLI and benchmarks
pub use parallel_processing::{
    annotate_file, process_files_parallel, FileStats, ProcessingConfig, RunStats,
};
pub use restart_log::{should_process_file, RestartLog};
