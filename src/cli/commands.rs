use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use make_compdb::{convert, ConvertOptions, ParseStats, ProjectRoot, DEFAULT_OUTPUT};

#[derive(Parser)]
#[command(name = "make-compdb")]
#[command(about = "Convert a make build log into compile_commands.json")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Capture a build log, then convert it
    make V=1 2>&1 | tee make.log
    make-compdb make.log xiaoju

    # Write to a custom location
    make-compdb make.log xiaoju -o build/compile_commands.json

    # Resolve bare source names against the current tree, prefix gcc/g++
    make-compdb make.log xiaoju --resolve-sources --with-compiler

    # More logging
    RUST_LOG=make_compdb=debug make-compdb make.log xiaoju
"#)]
pub struct Cli {
    /// Path to the make log
    pub log_file: PathBuf,

    /// Project directory name stripped from absolute paths (e.g. "xiaoju")
    pub project_name: String,

    /// Output JSON file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Directory recorded in every entry (defaults to the current directory)
    #[arg(long)]
    pub directory: Option<String>,

    /// Resolve relative source names by scanning DIR for .c/.cpp files
    #[arg(
        long,
        value_name = "DIR",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "."
    )]
    pub resolve_sources: Option<PathBuf>,

    /// Start each argument list with gcc or g++
    #[arg(long)]
    pub with_compiler: bool,
}

impl Cli {
    pub fn into_options(self) -> anyhow::Result<ConvertOptions> {
        let directory = match self.directory {
            Some(dir) => dir,
            None => std::env::current_dir()
                .context("cannot determine current directory")?
                .to_string_lossy()
                .into_owned(),
        };

        let mut options =
            ConvertOptions::new(self.log_file, ProjectRoot::new(self.project_name), directory);
        options.output = self.output;
        options.source_root = self.resolve_sources;
        options.with_compiler = self.with_compiler;
        Ok(options)
    }
}

pub fn run_convert(cli: Cli) -> anyhow::Result<ParseStats> {
    let options = cli.into_options()?;
    let stats = convert(&options)?;

    println!(
        "Generated {} with {} entries",
        options.output.display(),
        stats.entries
    );

    Ok(stats)
}
