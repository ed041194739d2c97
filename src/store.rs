//! Flat-file persistence for saved project paths and the command log.
//!
//! Neither store caches anything: every call goes to disk, and callers keep
//! their own in-memory mirror.

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{PanelError, Result};

/// Timestamp layout used for every command log entry.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Message written after the log has been cleared.
pub const LOG_CLEARED_MESSAGE: &str = "Logs cleared.";

fn persistence_error(action: &str, path: &Path, err: std::io::Error) -> PanelError {
    PanelError::Persistence(format!("Failed to {} {}: {}", action, path.display(), err))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| persistence_error("create directory for", path, e))?;
        }
    }
    Ok(())
}

// ============================================================================
// Saved Project Paths
// ============================================================================

/// JSON array of project directory strings, rewritten wholesale on save.
#[derive(Debug, Clone)]
pub struct PathStore {
    path: PathBuf,
}

impl PathStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved list. A missing file is an empty list; a malformed one
    /// is [`PanelError::MalformedPaths`].
    pub fn load(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(persistence_error("read", &self.path, e)),
        };

        serde_json::from_str(&content).map_err(|e| PanelError::MalformedPaths {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Overwrite the file with `paths`, in order.
    ///
    /// The list is written to a sibling temp file and renamed into place so
    /// a reader never sees a half-written array.
    pub fn save(&self, paths: &[String]) -> Result<()> {
        ensure_parent(&self.path)?;
        let json = serde_json::to_string(paths)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| persistence_error("write", &tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| persistence_error("replace", &self.path, e))?;

        tracing::debug!(count = paths.len(), path = %self.path.display(), "saved project paths");
        Ok(())
    }
}

// ============================================================================
// Command Log
// ============================================================================

/// Format one log line, including the trailing newline.
pub fn format_log_entry(timestamp: DateTime<Local>, text: &str) -> String {
    format!("[{}] {}\n", timestamp.format(LOG_TIMESTAMP_FORMAT), text)
}

/// Append-only text log, one `[YYYY-MM-DD HH:MM:SS] <text>` line per entry.
#[derive(Debug, Clone)]
pub struct CommandLog {
    path: PathBuf,
}

impl CommandLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a timestamped entry and return the line that was written.
    ///
    /// The file is opened, written, flushed and closed on every call.
    pub fn append(&self, text: &str) -> Result<String> {
        let entry = format_log_entry(Local::now(), text);
        ensure_parent(&self.path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| persistence_error("open", &self.path, e))?;
        file.write_all(entry.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| persistence_error("append to", &self.path, e))?;

        Ok(entry)
    }

    /// Whole log content, or an empty string when the file does not exist.
    pub fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(persistence_error("read", &self.path, e)),
        }
    }

    /// Truncate the log. With `write_marker`, a single
    /// [`LOG_CLEARED_MESSAGE`] entry is written afterwards and returned.
    pub fn clear(&self, write_marker: bool) -> Result<Option<String>> {
        ensure_parent(&self.path)?;
        fs::write(&self.path, "").map_err(|e| persistence_error("truncate", &self.path, e))?;

        if write_marker {
            self.append(LOG_CLEARED_MESSAGE).map(Some)
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;
    use tempfile::TempDir;

    fn entry_pattern() -> Regex {
        Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\] .*$").unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = PathStore::new(temp_dir.path().join("projects.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = PathStore::new(temp_dir.path().join("projects.json"));
        let paths = vec!["/srv/b".to_string(), "/srv/a".to_string()];

        store.save(&paths).unwrap();

        assert_eq!(store.load().unwrap(), paths);
    }

    #[test]
    fn test_save_of_load_leaves_content_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("projects.json");
        let store = PathStore::new(&file);
        store
            .save(&["/srv/shop".to_string(), "/srv/blog".to_string()])
            .unwrap();
        let before = fs::read(&file).unwrap();

        store.save(&store.load().unwrap()).unwrap();

        assert_eq!(fs::read(&file).unwrap(), before);
    }

    #[test]
    fn test_load_accepts_pretty_printed_json() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("projects.json");
        fs::write(&file, "[\"/srv/a\", \"/srv/b\"]").unwrap();

        let store = PathStore::new(&file);
        assert_eq!(store.load().unwrap(), vec!["/srv/a", "/srv/b"]);
    }

    #[test]
    fn test_load_malformed_file_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("projects.json");
        fs::write(&file, "{not json").unwrap();

        let err = PathStore::new(&file).load().unwrap_err();
        assert!(matches!(err, PanelError::MalformedPaths { .. }));
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("data").join("projects.json");

        PathStore::new(&file).save(&["/srv/a".to_string()]).unwrap();

        assert!(file.exists());
        assert!(!file.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_format_log_entry() {
        let ts = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            format_log_entry(ts, "Started: php artisan migrate"),
            "[2024-03-09 07:05:01] Started: php artisan migrate\n"
        );
    }

    #[test]
    fn test_append_writes_lines_in_call_order() {
        let temp_dir = TempDir::new().unwrap();
        let log = CommandLog::new(temp_dir.path().join("command_log.txt"));

        for i in 0..5 {
            log.append(&format!("entry {}", i)).unwrap();
        }

        let content = log.read().unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        let pattern = entry_pattern();
        for (i, line) in lines.iter().enumerate() {
            assert!(pattern.is_match(line), "bad line: {}", line);
            assert!(line.ends_with(&format!("entry {}", i)));
        }
    }

    #[test]
    fn test_append_returns_written_entry() {
        let temp_dir = TempDir::new().unwrap();
        let log = CommandLog::new(temp_dir.path().join("command_log.txt"));

        let entry = log.append("hello").unwrap();

        assert_eq!(log.read().unwrap(), entry);
        assert!(entry.ends_with("] hello\n"));
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let log = CommandLog::new(temp_dir.path().join("command_log.txt"));
        assert_eq!(log.read().unwrap(), "");
    }

    #[test]
    fn test_clear_without_marker_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let log = CommandLog::new(temp_dir.path().join("command_log.txt"));
        log.append("one").unwrap();
        log.append("two").unwrap();

        assert!(log.clear(false).unwrap().is_none());
        assert_eq!(log.read().unwrap(), "");
    }

    #[test]
    fn test_clear_with_marker_leaves_single_entry() {
        let temp_dir = TempDir::new().unwrap();
        let log = CommandLog::new(temp_dir.path().join("command_log.txt"));
        log.append("one").unwrap();

        let marker = log.clear(true).unwrap().unwrap();

        let content = log.read().unwrap();
        assert_eq!(content, marker);
        assert_eq!(content.lines().count(), 1);
        assert!(content.trim_end().ends_with(LOG_CLEARED_MESSAGE));
    }
}
