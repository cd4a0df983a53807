//! Project-relative path rewriting.

/// Directory name that anchors absolute paths to the project.
///
/// `/home/user/work/xiaoju/src/main.c` with root `xiaoju` becomes `src/main.c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot(String);

impl ProjectRoot {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Strips everything up to and including the first `<root>/` segment.
    ///
    /// The root must match a whole path segment. Paths that do not contain it,
    /// or that end with it, are returned unchanged. A root followed only by
    /// slashes is the project directory itself and becomes `.`.
    pub fn relativize(&self, path: &str) -> String {
        if self.is_empty() {
            return path.to_string();
        }

        let normalized = normalize_separators(path);
        let segments: Vec<&str> = normalized.split('/').collect();

        match segments.iter().position(|s| *s == self.0) {
            Some(idx) if idx + 1 < segments.len() => {
                let rest = &segments[idx + 1..];
                if rest.iter().all(|s| s.is_empty()) {
                    ".".to_string()
                } else {
                    rest.join("/")
                }
            }
            _ => path.to_string(),
        }
    }
}

/// Doubled backslashes (escaped separators in logs) always become `/`; single
/// backslashes only on drive-letter paths, since they are legal in Unix names.
fn normalize_separators(path: &str) -> String {
    let path = path.replace("\\\\", "/");
    if path.as_bytes().get(1) == Some(&b':') {
        path.replace('\\', "/")
    } else {
        path
    }
}
