//! Error types for treemirror operations
//!
//! Two layers exist. `ItemError` describes a single failed filesystem
//! operation on one entry; it is reported and the pass moves on. `MirrorError`
//! covers setup failures (configuration, validation, log file) which happen
//! before any pass runs and are the only errors a caller has to handle.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::exclusion::ExclusionError;
use crate::validation::ValidationError;

/// Setup-level error: bad configuration or unusable roots
#[derive(Debug)]
pub enum MirrorError {
	/// Invalid configuration value
	InvalidConfig { message: String },

	/// Config file could not be read or parsed
	ConfigFile { path: PathBuf, message: String },

	/// Source or replica root is unusable
	Validation(ValidationError),

	/// Action log could not be opened for appending
	LogUnavailable { path: PathBuf, source: io::Error },

	/// Exclusion glob failed to compile
	InvalidPattern { message: String },

	/// Background pass could not be joined
	PassFailed { message: String },

	/// I/O error
	Io(io::Error),
}

impl fmt::Display for MirrorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MirrorError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			MirrorError::ConfigFile { path, message } => {
				write!(f, "Cannot load config file {}: {}", path.display(), message)
			}
			MirrorError::Validation(e) => write!(f, "{}", e),
			MirrorError::LogUnavailable { path, source } => {
				write!(f, "Cannot open log file {}: {}", path.display(), source)
			}
			MirrorError::InvalidPattern { message } => {
				write!(f, "Invalid exclude pattern {}", message)
			}
			MirrorError::PassFailed { message } => {
				write!(f, "Synchronization pass failed: {}", message)
			}
			MirrorError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for MirrorError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			MirrorError::LogUnavailable { source, .. } => Some(source),
			MirrorError::Io(e) => Some(e),
			MirrorError::Validation(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for MirrorError {
	fn from(e: io::Error) -> Self {
		MirrorError::Io(e)
	}
}

impl From<ExclusionError> for MirrorError {
	fn from(e: ExclusionError) -> Self {
		match e {
			ExclusionError::InvalidPattern(message) => MirrorError::InvalidPattern { message },
		}
	}
}

impl From<ValidationError> for MirrorError {
	fn from(e: ValidationError) -> Self {
		MirrorError::Validation(e)
	}
}

/// Filesystem operation attempted on an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOp {
	Hash,
	CopyFile,
	CreateDirectory,
	DeleteFile,
	DeleteDirectory,
	Enumerate,
}

impl fmt::Display for ItemOp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ItemOp::Hash => write!(f, "hash"),
			ItemOp::CopyFile => write!(f, "copy"),
			ItemOp::CreateDirectory => write!(f, "create directory"),
			ItemOp::DeleteFile => write!(f, "delete"),
			ItemOp::DeleteDirectory => write!(f, "delete directory"),
			ItemOp::Enumerate => write!(f, "enumerate"),
		}
	}
}

/// A single failed operation on one filesystem entry
#[derive(Debug)]
pub struct ItemError {
	pub op: ItemOp,
	pub path: PathBuf,
	pub source: io::Error,
}

impl ItemError {
	pub fn new(op: ItemOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
		ItemError { op, path: path.into(), source }
	}

	/// Entry disappeared before the operation could run
	pub fn is_not_found(&self) -> bool {
		self.source.kind() == io::ErrorKind::NotFound
	}
}

impl fmt::Display for ItemError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Cannot {} {}: {}", self.op, self.path.display(), self.source)
	}
}

impl Error for ItemError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		Some(&self.source)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_item_error_display() {
		let err = ItemError::new(
			ItemOp::CopyFile,
			"/tmp/src/a.txt",
			io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		);
		let msg = err.to_string();
		assert!(msg.contains("copy"));
		assert!(msg.contains("/tmp/src/a.txt"));
		assert!(!err.is_not_found());
	}

	#[test]
	fn test_item_error_not_found() {
		let err = ItemError::new(
			ItemOp::DeleteFile,
			"gone.txt",
			io::Error::new(io::ErrorKind::NotFound, "missing"),
		);
		assert!(err.is_not_found());
	}

	#[test]
	fn test_mirror_error_from_io() {
		let err: MirrorError = io::Error::new(io::ErrorKind::Other, "boom").into();
		assert!(matches!(err, MirrorError::Io(_)));
		assert!(err.to_string().contains("boom"));
	}
}

// vim: ts=4
