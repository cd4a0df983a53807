//! Recognizes cross-compiler invocations in make output and turns them into
//! compilation database entries.

use super::ansi::strip_ansi;
use super::entry::{CompileEntry, LineOutcome, SkipReason};
use super::paths::ProjectRoot;
use super::sources::SourceIndex;

/// Compiler names that mark a line as a compile command.
pub const TRIGGERS: &[&str] = &["arm-linux-g++", "arm-linux-gcc"];

/// Compilers only recognized when launched through `ccache`.
pub const CCACHE_TRIGGERS: &[&str] = &["arm-linux-gnueabihf-g++", "arm-linux-gnueabihf-gcc"];

pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cp", "cpp", "cxx", "c++", "C"];

/// Flags whose value is the following argument.
const FLAGS_WITH_VALUE: &[&str] = &[
    "-o",
    "-U",
    "-MF",
    "-MT",
    "-MQ",
    "-include",
    "-imacros",
    "-isystem",
    "-iquote",
    "-idirafter",
    "-iprefix",
    "-isysroot",
    "-x",
    "-L",
    "-T",
    "-Xlinker",
    "-Xassembler",
    "-Xpreprocessor",
    "--param",
    "-aux-info",
];

pub fn is_source_file(arg: &str) -> bool {
    match arg.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !stem.ends_with('/') && SOURCE_EXTENSIONS.contains(&ext)
        }
        None => false,
    }
}

fn is_quoted(arg: &str) -> bool {
    arg.starts_with('"') || arg.ends_with('"') || arg.starts_with('\'') || arg.ends_with('\'')
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || path.as_bytes().get(1) == Some(&b':')
}

/// Position of the compiler token in a whitespace-split line.
fn find_compiler(tokens: &[&str]) -> Option<usize> {
    tokens.iter().enumerate().position(|(i, token)| {
        TRIGGERS.iter().any(|t| token.contains(t))
            || (i > 0
                && tokens[i - 1] == "ccache"
                && CCACHE_TRIGGERS.iter().any(|t| token.contains(t)))
    })
}

pub struct LogLineParser {
    root: ProjectRoot,
    directory: String,
    sources: Option<SourceIndex>,
    with_compiler: bool,
}

impl LogLineParser {
    pub fn new(root: ProjectRoot, directory: impl Into<String>) -> Self {
        Self {
            root,
            directory: directory.into(),
            sources: None,
            with_compiler: false,
        }
    }

    /// Resolve relative source names against a scanned source tree.
    pub fn with_sources(mut self, sources: SourceIndex) -> Self {
        self.sources = Some(sources);
        self
    }

    /// Prefix `arguments` with `gcc` or `g++` depending on the source extension.
    pub fn with_compiler_marker(mut self, enabled: bool) -> Self {
        self.with_compiler = enabled;
        self
    }

    pub fn parse_line(&self, line: &str) -> LineOutcome {
        let cleaned = strip_ansi(line);
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();

        let Some(compiler) = find_compiler(&tokens) else {
            return LineOutcome::Ignored;
        };

        match self.extract(&tokens[compiler + 1..]) {
            Ok(entry) => LineOutcome::Entry(entry),
            Err(reason) => LineOutcome::Skipped(reason),
        }
    }

    fn extract(&self, args: &[&str]) -> Result<CompileEntry, SkipReason> {
        let mut arguments = Vec::new();
        let mut source: Option<&str> = None;
        let mut compiles = false;

        let mut i = 0;
        while i < args.len() {
            let arg = args[i];

            if let Some(value) = arg.strip_prefix("-I") {
                let (value, consumed) = self.flag_value("-I", value, args.get(i + 1));
                if let Some(value) = value {
                    arguments.push(format!("-I{}", self.root.relativize(value)));
                }
                i += consumed;
                continue;
            }

            if let Some(value) = arg.strip_prefix("-D") {
                let (value, consumed) = self.flag_value("-D", value, args.get(i + 1));
                if let Some(value) = value {
                    arguments.push(format!("-D{}", self.rewrite_define(value)));
                }
                i += consumed;
                continue;
            }

            if FLAGS_WITH_VALUE.contains(&arg) {
                i += 2;
                continue;
            }

            if arg == "-c" {
                compiles = true;
            } else if !arg.starts_with('-') && !is_quoted(arg) && is_source_file(arg) {
                source = Some(arg);
            }
            i += 1;
        }

        let source = source.ok_or(SkipReason::MissingSourceFile)?;
        if !compiles {
            return Err(SkipReason::MissingCompileFlag);
        }

        if self.with_compiler {
            let compiler = if source.ends_with(".c") { "gcc" } else { "g++" };
            arguments.insert(0, compiler.to_string());
        }

        Ok(CompileEntry {
            directory: self.directory.clone(),
            arguments,
            file: self.root.relativize(self.resolve_source(source)),
        })
    }

    /// Value of a `-I`/`-D` flag, either attached or taken from the next
    /// argument. Returns the value and how many arguments were consumed.
    fn flag_value<'a>(
        &self,
        flag: &str,
        attached: &'a str,
        next: Option<&&'a str>,
    ) -> (Option<&'a str>, usize) {
        if !attached.is_empty() {
            return (Some(attached), 1);
        }
        match next {
            Some(next) if !next.starts_with('-') => (Some(*next), 2),
            _ => {
                tracing::debug!("Dropping {} without a value", flag);
                (None, 1)
            }
        }
    }

    /// Rewrites the right-hand side of `NAME=VALUE` when it is an absolute path.
    fn rewrite_define(&self, define: &str) -> String {
        let Some((name, value)) = define.split_once('=') else {
            return define.to_string();
        };

        let quote = |c: char| c == '"' || c == '\'' || c == '\\';
        let inner = value.trim_start_matches(quote);
        let prefix = &value[..value.len() - inner.len()];
        let path = inner.trim_end_matches(quote);
        let suffix = &inner[path.len()..];

        if !is_absolute(path) {
            return define.to_string();
        }
        format!("{}={}{}{}", name, prefix, self.root.relativize(path), suffix)
    }

    fn resolve_source<'a>(&'a self, source: &'a str) -> &'a str {
        if is_absolute(source) {
            return source;
        }
        match self.sources.as_ref().and_then(|index| index.resolve(source)) {
            Some(resolved) => resolved,
            None => source,
        }
    }
}
