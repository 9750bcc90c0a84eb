//! Append-only record of every change applied to the replica
//!
//! One line per successful action:
//!
//! ```text
//! 2024-05-01T12:00:00  Copied: docs/a.txt to /srv/replica
//! ```
//!
//! The file is opened in append mode and never truncated. Each line is also
//! echoed to stdout when echoing is enabled.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MirrorError;
use crate::logging::*;

/// Timestamp layout of each record (local time, no offset)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Kind of change recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verb {
	Copied,
	CreatedDirectory,
	Deleted,
	DeletedDirectory,
	Updated,
}

impl Verb {
	/// Word joining the item name and the replica root
	pub fn preposition(&self) -> &'static str {
		match self {
			Verb::Copied => "to",
			Verb::CreatedDirectory => "at",
			Verb::Deleted | Verb::DeletedDirectory => "from",
			Verb::Updated => "in",
		}
	}
}

impl fmt::Display for Verb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Verb::Copied => write!(f, "Copied"),
			Verb::CreatedDirectory => write!(f, "Created directory"),
			Verb::Deleted => write!(f, "Deleted"),
			Verb::DeletedDirectory => write!(f, "Deleted directory"),
			Verb::Updated => write!(f, "Updated"),
		}
	}
}

/// Render one record without the trailing newline
pub fn format_record(timestamp: &str, verb: Verb, name: &str, location: &Path) -> String {
	format!("{}  {}: {} {} {}", timestamp, verb, name, verb.preposition(), location.display())
}

/// Echo one record; a closed or full stdout never aborts a pass
pub fn echo_line<W: Write>(mut out: W, line: &str) -> io::Result<()> {
	writeln!(out, "{}", line).and_then(|_| out.flush())
}

pub struct ActionLog {
	path: PathBuf,
	file: File,
	echo: Option<Box<dyn Write + Send>>,
	written: usize,
}

impl ActionLog {
	/// Open `path` for appending, creating it (and its parent) if needed
	pub fn open(path: &Path, echo: bool) -> Result<Self, MirrorError> {
		let unavailable = |source: io::Error| MirrorError::LogUnavailable {
			path: path.to_path_buf(),
			source,
		};

		if let Some(parent) = path.parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent).map_err(unavailable)?;
			}
		}
		let file = OpenOptions::new().create(true).append(true).open(path).map_err(unavailable)?;

		let echo: Option<Box<dyn Write + Send>> =
			if echo { Some(Box::new(io::stdout())) } else { None };
		Ok(ActionLog { path: path.to_path_buf(), file, echo, written: 0 })
	}

	/// Echo records to `out` instead of stdout
	pub fn with_echo_to(mut self, out: Box<dyn Write + Send>) -> Self {
		self.echo = Some(out);
		self
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Records written since this log was opened
	pub fn written(&self) -> usize {
		self.written
	}

	/// Append one record stamped with the current local time
	///
	/// A failed write is reported through tracing; the change it describes
	/// has already happened, so it is not undone.
	pub fn record(&mut self, verb: Verb, name: &str, location: &Path) {
		let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
		let line = format_record(&timestamp, verb, name, location);

		if let Some(out) = self.echo.as_mut() {
			if let Err(e) = echo_line(out, &line) {
				debug!("Cannot echo action to stdout: {}", e);
			}
		}

		let result = writeln!(self.file, "{}", line).and_then(|_| self.file.flush());
		match result {
			Ok(()) => self.written += 1,
			Err(e) => error!("Cannot append to log {}: {}", self.path.display(), e),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_format_record() {
		let line = format_record(
			"2024-05-01T12:00:00",
			Verb::Copied,
			"docs/a.txt",
			Path::new("/srv/replica"),
		);
		assert_eq!(line, "2024-05-01T12:00:00  Copied: docs/a.txt to /srv/replica");

		let line =
			format_record("2024-05-01T12:00:00", Verb::CreatedDirectory, "d", Path::new("/r"));
		assert_eq!(line, "2024-05-01T12:00:00  Created directory: d at /r");
	}

	#[test]
	fn test_verbs() {
		assert_eq!(Verb::DeletedDirectory.to_string(), "Deleted directory");
		assert_eq!(Verb::Deleted.preposition(), "from");
		assert_eq!(Verb::Updated.preposition(), "in");
	}

	#[test]
	fn test_record_appends() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("logs/mirror.log");
		std::fs::create_dir(dir.path().join("logs")).unwrap();
		std::fs::write(&path, "previous line\n").unwrap();

		let mut log = ActionLog::open(&path, false).unwrap();
		log.record(Verb::Copied, "a.txt", Path::new("/r"));
		log.record(Verb::Deleted, "b.txt", Path::new("/r"));
		assert_eq!(log.written(), 2);

		let contents = std::fs::read_to_string(&path).unwrap();
		let lines: Vec<&str> = contents.lines().collect();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[0], "previous line");
		assert!(lines[1].ends_with("  Copied: a.txt to /r"));
		assert!(lines[2].ends_with("  Deleted: b.txt from /r"));

		// Timestamp is YYYY-MM-DDTHH:MM:SS
		let stamp = &lines[1][..19];
		assert!(chrono::NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).is_ok());
	}

	struct ClosedPipe;

	impl Write for ClosedPipe {
		fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
			Err(io::Error::from(io::ErrorKind::BrokenPipe))
		}

		fn flush(&mut self) -> io::Result<()> {
			Err(io::Error::from(io::ErrorKind::BrokenPipe))
		}
	}

	#[test]
	fn test_echo_to_closed_pipe_still_records() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("mirror.log");

		let mut log = ActionLog::open(&path, false).unwrap().with_echo_to(Box::new(ClosedPipe));
		log.record(Verb::Copied, "a.txt", Path::new("/r"));
		log.record(Verb::Updated, "b.txt", Path::new("/r"));

		assert_eq!(log.written(), 2);
		assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
	}

	#[test]
	fn test_echo_line() {
		let mut out = Vec::new();
		echo_line(&mut out, "2024-05-01T12:00:00  Deleted: x from /r").unwrap();
		assert_eq!(out, b"2024-05-01T12:00:00  Deleted: x from /r\n");

		let err = echo_line(ClosedPipe, "line").unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
	}

	#[test]
	fn test_open_creates_parent() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("nested/dir/mirror.log");
		let log = ActionLog::open(&path, false).unwrap();
		assert!(log.path().exists());
	}

	#[test]
	fn test_open_fails_on_directory() {
		let dir = TempDir::new().unwrap();
		let result = ActionLog::open(dir.path(), false);
		assert!(matches!(result, Err(MirrorError::LogUnavailable { .. })));
	}
}

// vim: ts=4
