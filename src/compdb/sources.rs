use std::collections::HashMap;
use std::path::Path;

use ignore::WalkBuilder;

use crate::error::{CompdbError, Result};

use super::parser::is_source_file;

/// Absolute paths of the C/C++ sources under a directory, looked up by file name.
///
/// Used to turn the bare `main.c` that some makefiles echo into a full path.
#[derive(Debug, Default)]
pub struct SourceIndex {
    files: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl SourceIndex {
    pub fn scan(root: &Path) -> Result<Self> {
        let root = root.canonicalize().map_err(|e| {
            CompdbError::SourceScan(format!("{}: {}", root.display(), e))
        })?;

        let walker = WalkBuilder::new(&root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .ignore(true)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && is_source_file(&path.to_string_lossy()) {
                paths.push(path.to_string_lossy().replace('\\', "/"));
            }
        }

        tracing::debug!("Indexed {} source files under {}", paths.len(), root.display());
        Ok(Self::from_paths(paths))
    }

    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for path in paths {
            let path = path.into();
            let name = file_name(&path).to_string();
            let slot = index.files.len();
            index.files.push(path);
            index.by_name.entry(name).or_insert(slot);
        }
        index
    }

    /// First indexed path whose file name equals the file name of `source`.
    pub fn resolve(&self, source: &str) -> Option<&str> {
        self.by_name
            .get(file_name(source))
            .map(|&slot| self.files[slot].as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(b"int x;").unwrap();
    }

    #[test]
    fn test_scan_finds_c_and_cpp_files() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "src/main.cpp");
        create_file(temp_dir.path(), "lib/util.c");
        create_file(temp_dir.path(), "include/util.h");
        create_file(temp_dir.path(), "README.md");

        let index = SourceIndex::scan(temp_dir.path()).unwrap();

        assert_eq!(index.len(), 2);
        assert!(index.resolve("main.cpp").unwrap().ends_with("/src/main.cpp"));
        assert!(index.resolve("util.c").unwrap().ends_with("/lib/util.c"));
        assert!(index.resolve("util.h").is_none());
    }

    #[test]
    fn test_scan_returns_absolute_paths() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), "a.c");

        let index = SourceIndex::scan(temp_dir.path()).unwrap();
        let resolved = index.resolve("a.c").unwrap();

        assert!(Path::new(resolved).is_absolute());
    }

    #[test]
    fn test_scan_skips_hidden_files() {
        let temp_dir = TempDir::new().unwrap();
        create_file(temp_dir.path(), ".cache/gen.c");
        create_file(temp_dir.path(), "visible.c");

        let index = SourceIndex::scan(temp_dir.path()).unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.resolve("gen.c").is_none());
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let err = SourceIndex::scan(&missing).unwrap_err();
        assert!(matches!(err, CompdbError::SourceScan(_)));
    }

    #[test]
    fn test_resolve_uses_first_match() {
        let index = SourceIndex::from_paths(["/p/a/main.c", "/p/b/main.c"]);
        assert_eq!(index.resolve("main.c"), Some("/p/a/main.c"));
    }

    #[test]
    fn test_resolve_matches_by_file_name_only() {
        let index = SourceIndex::from_paths(["/p/xiaoju/src/app.cpp"]);
        assert_eq!(index.resolve("build/../app.cpp"), Some("/p/xiaoju/src/app.cpp"));
        assert_eq!(index.resolve("other.cpp"), None);
    }
}
