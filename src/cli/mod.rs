mod commands;

pub use commands::{run_convert, Cli};
