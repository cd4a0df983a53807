pub mod compdb;
pub mod error;

pub use compdb::{
    convert, strip_ansi, CompilationDatabase, CompileEntry, ConvertOptions, LineOutcome,
    LogLineParser, ParseStats, ProjectRoot, SkipReason, SourceIndex, DEFAULT_OUTPUT,
};
pub use error::{CompdbError, Result};
