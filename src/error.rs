use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompdbError {
    #[error("cannot read build log {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write compilation database {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source scan error: {0}")]
    SourceScan(String),
}

pub type Result<T> = std::result::Result<T, CompdbError>;
