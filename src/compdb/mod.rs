pub mod ansi;
pub mod database;
pub mod entry;
pub mod parser;
pub mod paths;
pub mod sources;

use std::path::PathBuf;

use crate::error::Result;

pub use ansi::strip_ansi;
pub use database::{CompilationDatabase, ParseStats};
pub use entry::{CompileEntry, LineOutcome, SkipReason};
pub use parser::{is_source_file, LogLineParser};
pub use paths::ProjectRoot;
pub use sources::SourceIndex;

pub const DEFAULT_OUTPUT: &str = "compile_commands.json";

/// Settings for one log-to-database conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub log_path: PathBuf,
    pub project_root: ProjectRoot,
    pub output: PathBuf,
    /// Recorded as `directory` in every entry.
    pub directory: String,
    /// Scan this tree to resolve relative source names.
    pub source_root: Option<PathBuf>,
    pub with_compiler: bool,
}

impl ConvertOptions {
    pub fn new(log_path: impl Into<PathBuf>, project_root: ProjectRoot, directory: impl Into<String>) -> Self {
        Self {
            log_path: log_path.into(),
            project_root,
            output: PathBuf::from(DEFAULT_OUTPUT),
            directory: directory.into(),
            source_root: None,
            with_compiler: false,
        }
    }

    pub fn parser(&self) -> Result<LogLineParser> {
        let mut parser = LogLineParser::new(self.project_root.clone(), self.directory.clone())
            .with_compiler_marker(self.with_compiler);

        if let Some(root) = &self.source_root {
            let sources = SourceIndex::scan(root)?;
            tracing::info!("Found {} source files under {}", sources.len(), root.display());
            parser = parser.with_sources(sources);
        }

        Ok(parser)
    }
}

/// Reads the build log, parses it and writes the compilation database.
///
/// The log is fully parsed before the output file is touched, so an
/// unwritable destination fails after parsing and leaves no partial file.
pub fn convert(options: &ConvertOptions) -> Result<ParseStats> {
    let parser = options.parser()?;
    let db = CompilationDatabase::from_log_file(&options.log_path, &parser)?;

    let stats = db.stats();
    if db.is_empty() {
        tracing::warn!("No compile commands found in {}", options.log_path.display());
    }

    db.write_to_path(&options.output)?;
    tracing::info!(
        "Wrote {} with {} entries ({} compiler lines skipped)",
        options.output.display(),
        stats.entries,
        stats.lines_skipped
    );

    Ok(stats)
}
