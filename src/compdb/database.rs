use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{CompdbError, Result};

use super::entry::{CompileEntry, LineOutcome};
use super::parser::LogLineParser;

/// Counters collected while scanning a build log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines_read: usize,
    pub lines_matched: usize,
    pub entries: usize,
    pub lines_skipped: usize,
}

/// Entries collected from one build log, in log order.
#[derive(Debug, Default)]
pub struct CompilationDatabase {
    entries: Vec<CompileEntry>,
    stats: ParseStats,
}

impl CompilationDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every line of `reader`. Bytes that are not valid UTF-8 are
    /// replaced rather than aborting the scan.
    pub fn from_reader<R: BufRead>(mut reader: R, parser: &LogLineParser) -> std::io::Result<Self> {
        let mut db = Self::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            db.stats.lines_read += 1;
            db.push_line(db.stats.lines_read, &line, parser);
        }

        Ok(db)
    }

    pub fn from_log_file(path: &Path, parser: &LogLineParser) -> Result<Self> {
        let input_error = |source| CompdbError::Input {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(input_error)?;
        Self::from_reader(BufReader::new(file), parser).map_err(input_error)
    }

    fn push_line(&mut self, line_no: usize, line: &str, parser: &LogLineParser) {
        match parser.parse_line(line) {
            LineOutcome::Ignored => {}
            LineOutcome::Entry(entry) => {
                tracing::debug!("line {}: {}", line_no, entry.file);
                self.stats.lines_matched += 1;
                self.stats.entries += 1;
                self.entries.push(entry);
            }
            LineOutcome::Skipped(reason) => {
                tracing::warn!("Skipping compiler line {}: {}", line_no, reason);
                self.stats.lines_matched += 1;
                self.stats.lines_skipped += 1;
            }
        }
    }

    pub fn entries(&self) -> &[CompileEntry] {
        &self.entries
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the entries as a pretty-printed JSON array followed by a newline.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut writer, &self.entries)?;
        writer.write_all(b"\n")?;
        writer.flush()
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        let output_error = |source| CompdbError::Output {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(output_error)?;
        self.to_writer(BufWriter::new(file)).map_err(output_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compdb::ProjectRoot;

    fn parser() -> LogLineParser {
        LogLineParser::new(ProjectRoot::new("xiaoju"), "/work")
    }

    fn to_json(db: &CompilationDatabase) -> String {
        let mut out = Vec::new();
        db.to_writer(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    const LOG: &str = "\
make[1]: Entering directory '/home/u/xiaoju/src'
arm-linux-g++ -c -I/home/u/xiaoju/include /home/u/xiaoju/src/main.cpp -o main.o
arm-linux-gcc -c -DLOG_LEVEL=3 /home/u/xiaoju/src/log.c -o log.o
arm-linux-gcc -c -o broken.o
arm-linux-g++ main.o log.o -o app
make[1]: Leaving directory '/home/u/xiaoju/src'
";

    #[test]
    fn test_from_reader_collects_entries_in_order() {
        let db = CompilationDatabase::from_reader(LOG.as_bytes(), &parser()).unwrap();

        let files: Vec<_> = db.entries().iter().map(|e| e.file.as_str()).collect();
        assert_eq!(files, vec!["src/main.cpp", "src/log.c"]);
    }

    #[test]
    fn test_stats() {
        let db = CompilationDatabase::from_reader(LOG.as_bytes(), &parser()).unwrap();

        assert_eq!(
            db.stats(),
            ParseStats {
                lines_read: 6,
                lines_matched: 4,
                entries: 2,
                lines_skipped: 2,
            }
        );
    }

    #[test]
    fn test_empty_log_gives_empty_array() {
        let db = CompilationDatabase::from_reader("".as_bytes(), &parser()).unwrap();

        assert!(db.is_empty());
        assert_eq!(to_json(&db), "[]\n");
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let mut log = b"\xff\xfe garbage\n".to_vec();
        log.extend_from_slice(b"arm-linux-gcc -c /x/xiaoju/a.c -o a.o\n");

        let db = CompilationDatabase::from_reader(log.as_slice(), &parser()).unwrap();

        assert_eq!(db.len(), 1);
        assert_eq!(db.entries()[0].file, "a.c");
    }

    #[test]
    fn test_last_line_without_newline() {
        let db =
            CompilationDatabase::from_reader("arm-linux-gcc -c b.c -o b.o".as_bytes(), &parser())
                .unwrap();
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_json_layout() {
        let db = CompilationDatabase::from_reader(
            "arm-linux-g++ -c -I/h/xiaoju/include src/main.cpp -o build/main.o\n".as_bytes(),
            &parser(),
        )
        .unwrap();

        let expected = r#"[
  {
    "directory": "/work",
    "arguments": [
      "-Iinclude"
    ],
    "file": "src/main.cpp"
  }
]
"#;
        assert_eq!(to_json(&db), expected);
    }

    #[test]
    fn test_to_writer_reports_io_failure() {
        let db = CompilationDatabase::from_reader(LOG.as_bytes(), &parser()).unwrap();

        let err = db.to_writer(FailingWriter).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_write_to_path_failure_is_output_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db = CompilationDatabase::from_reader(LOG.as_bytes(), &parser()).unwrap();

        let err = db.write_to_path(temp_dir.path()).unwrap_err();
        assert!(matches!(err, CompdbError::Output { .. }));
        assert!(err.to_string().starts_with("cannot write compilation database"));
    }

    #[test]
    fn test_write_to_path_matches_writer_output() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("compile_commands.json");
        let db = CompilationDatabase::from_reader(LOG.as_bytes(), &parser()).unwrap();

        db.write_to_path(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), to_json(&db));
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let db = CompilationDatabase::from_reader(
            "arm-linux-gcc -c /h/xiaoju/模块/a.c -o a.o\n".as_bytes(),
            &parser(),
        )
        .unwrap();

        assert!(to_json(&db).contains("模块/a.c"));
    }
}
