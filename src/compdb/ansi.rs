use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

/// CSI sequences (`ESC [ ... final`) and two-byte `ESC x` escapes.
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("valid ANSI escape pattern")
});

/// Removes terminal color codes that colored make/compiler output leaves in logs.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    if !line.contains('\x1B') {
        return Cow::Borrowed(line);
    }
    ANSI_ESCAPE.replace_all(line, "")
}
