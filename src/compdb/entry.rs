use serde::{Deserialize, Serialize};

/// One record of `compile_commands.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileEntry {
    pub directory: String,
    pub arguments: Vec<String>,
    pub file: String,
}

/// Why a compiler line produced no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No argument looked like a C/C++ source file.
    MissingSourceFile,
    /// The invocation does not compile (`-c` absent), e.g. a link step.
    MissingCompileFlag,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingSourceFile => "no source file argument",
            SkipReason::MissingCompileFlag => "no -c flag",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of feeding a single log line to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not a compiler invocation.
    Ignored,
    Entry(CompileEntry),
    Skipped(SkipReason),
}
