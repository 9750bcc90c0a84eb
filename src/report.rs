//! Outcome of a synchronization pass
//!
//! A pass never fails as a whole. It returns a `PassReport` that separates
//! what was applied from what was logged and skipped.

use serde::Serialize;
use std::time::Duration;

use crate::action_log::Verb;
use crate::error::ItemError;

/// Phase of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncPhase {
	Enumerate,
	NewItems,
	DeletedItems,
	ModifiedItems,
}

impl std::fmt::Display for SyncPhase {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			SyncPhase::Enumerate => write!(f, "enumerate"),
			SyncPhase::NewItems => write!(f, "new items"),
			SyncPhase::DeletedItems => write!(f, "deleted items"),
			SyncPhase::ModifiedItems => write!(f, "modified items"),
		}
	}
}

/// An item the pass could not handle
#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
	pub phase: SyncPhase,
	/// Relative path, or the root for enumeration failures
	pub path: String,
	pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
	pub copied: usize,
	pub dirs_created: usize,
	pub deleted: usize,
	pub dirs_deleted: usize,
	pub updated: usize,
	/// Type conflicts resolved by replacing the replica entry
	pub replaced: usize,
	pub unchanged: usize,
	pub skipped: Vec<SkippedItem>,
	/// Shutdown was requested and the remaining phases did not run
	pub cancelled: bool,
	#[serde(serialize_with = "serialize_millis")]
	pub duration: Duration,
}

impl PassReport {
	pub fn count(&mut self, verb: Verb) {
		match verb {
			Verb::Copied => self.copied += 1,
			Verb::CreatedDirectory => self.dirs_created += 1,
			Verb::Deleted => self.deleted += 1,
			Verb::DeletedDirectory => self.dirs_deleted += 1,
			Verb::Updated => self.updated += 1,
		}
	}

	pub fn skip(&mut self, phase: SyncPhase, path: impl Into<String>, reason: impl Into<String>) {
		self.skipped.push(SkippedItem { phase, path: path.into(), reason: reason.into() });
	}

	pub fn skip_error(&mut self, phase: SyncPhase, path: impl Into<String>, err: &ItemError) {
		self.skip(phase, path, err.to_string());
	}

	/// Number of log-worthy changes applied
	pub fn actions(&self) -> usize {
		self.copied + self.dirs_created + self.deleted + self.dirs_deleted + self.updated
	}

	/// Nothing was skipped and the pass ran to the end
	pub fn is_clean(&self) -> bool {
		self.skipped.is_empty() && !self.cancelled
	}
}

impl std::fmt::Display for PassReport {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} copied, {} dirs created, {} deleted, {} dirs deleted, {} updated, {} skipped in {:.2?}",
			self.copied,
			self.dirs_created,
			self.deleted,
			self.dirs_deleted,
			self.updated,
			self.skipped.len(),
			self.duration
		)?;
		if self.cancelled {
			write!(f, " (cancelled)")?;
		}
		Ok(())
	}
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
{
	serializer.serialize_u64(duration.as_millis() as u64)
}


// vim: ts=4
