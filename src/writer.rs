//! Deduplicated output rendering and atomic file replacement.
//!
//! Each partition is rendered fully in memory (volumes are tens of
//! thousands of lines), written to a temp file in the destination
//! directory, then atomically persisted over the target path. A write
//! failure therefore never leaves a previous good file half-replaced.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::config::OutputConfig;
use crate::entry::EntrySet;
use crate::errors::{IoResultExt, Result, UsomFeedError};

/// Counts reported back to the caller after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub urls_written: usize,
    pub ips_written: usize,
}

/// Writer stage: partition, sort, and persist both output files.
///
/// `urls.txt` is written before `ips.txt`; a failure on either aborts
/// the run with the untouched previous files still in place.
pub fn write_entries(set: &EntrySet, output: &OutputConfig) -> Result<WriteSummary> {
    std::fs::create_dir_all(&output.directory)
        .with_path(output.directory.display().to_string(), "create_dir_all")?;

    let urls = set.sorted_urls();
    let ips = set.sorted_ips();

    write_lines(&output.urls_path(), &urls)?;
    write_lines(&output.ips_path(), &ips)?;

    Ok(WriteSummary {
        urls_written: urls.len(),
        ips_written: ips.len(),
    })
}

/// Write one entry per line, UTF-8, no blank lines, replacing `path`
/// atomically on success.
fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))
        .with_path(path.display().to_string(), "create temp file")?;

    for line in lines {
        writeln!(tmp, "{line}").with_path(path.display().to_string(), "write")?;
    }
    tmp.flush().with_path(path.display().to_string(), "flush")?;

    tmp.persist(path).map_err(|e| {
        UsomFeedError::io(path.display().to_string(), "persist", e.error)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, EntryKind};
    use std::path::PathBuf;

    fn sample_set() -> EntrySet {
        let mut set = EntrySet::new();
        for v in ["evil.example.com/payload", "bad.example.org/x"] {
            set.insert(Entry::from_declared(EntryKind::Url, v).unwrap());
        }
        set.insert(Entry::from_declared(EntryKind::Ip, "203.0.113.5").unwrap());
        set
    }

    fn output_in(dir: &Path) -> OutputConfig {
        OutputConfig {
            directory: PathBuf::from(dir),
            ..OutputConfig::default()
        }
    }

    #[test]
    fn writes_sorted_files_with_line_hygiene() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(dir.path());
        let summary = write_entries(&sample_set(), &output).unwrap();
        assert_eq!(summary.urls_written, 2);
        assert_eq!(summary.ips_written, 1);

        let urls = std::fs::read_to_string(output.urls_path()).unwrap();
        assert_eq!(urls, "bad.example.org/x\nevil.example.com/payload\n");
        for line in urls.lines() {
            assert!(!line.is_empty());
            assert_eq!(line, line.trim());
        }

        let ips = std::fs::read_to_string(output.ips_path()).unwrap();
        assert_eq!(ips, "203.0.113.5\n");
    }

    #[test]
    fn overwrites_previous_contents_completely() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(dir.path());
        std::fs::write(output.urls_path(), "stale.example.net/old\n").unwrap();

        write_entries(&sample_set(), &output).unwrap();
        let urls = std::fs::read_to_string(output.urls_path()).unwrap();
        assert!(!urls.contains("stale.example.net"));
    }

    #[test]
    fn repeated_writes_are_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(dir.path());
        let set = sample_set();
        write_entries(&set, &output).unwrap();
        let first = std::fs::read(output.urls_path()).unwrap();
        write_entries(&set, &output).unwrap();
        let second = std::fs::read(output.urls_path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn creates_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = output_in(&dir.path().join("nested/out"));
        write_entries(&sample_set(), &output).unwrap();
        assert!(output.urls_path().exists());
    }
}
