//! Exclusion system
//!
//! Decides which entries a tree walk skips: user glob patterns plus reserved
//! absolute paths such as the action log, which must never be mirrored or
//! deleted even when it lives inside one of the trees.

mod patterns;

pub use patterns::PatternMatcher;

use std::path::{Path, PathBuf};

use crate::types::RelPath;

/// Combined exclusion engine applied during enumeration
#[derive(Debug, Clone)]
pub struct ExclusionEngine {
	pattern_matcher: PatternMatcher,
	reserved: Vec<PathBuf>,
}

impl ExclusionEngine {
	/// Create a new exclusion engine from glob patterns
	pub fn new(patterns: &[String]) -> Result<Self, ExclusionError> {
		Ok(Self { pattern_matcher: PatternMatcher::new(patterns)?, reserved: Vec::new() })
	}

	/// Engine that excludes nothing
	pub fn none() -> Self {
		Self { pattern_matcher: PatternMatcher::empty(), reserved: Vec::new() }
	}

	/// Never enumerate the entry at `path`
	///
	/// The path is canonicalized when possible so it compares equal to the
	/// locations produced by a walk over a canonical root.
	pub fn reserve(&mut self, path: &Path) {
		let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
		if !self.reserved.contains(&resolved) {
			self.reserved.push(resolved);
		}
	}

	/// Check if an entry should be skipped, together with its subtree
	pub fn should_exclude(&self, rel: &RelPath, absolute: &Path) -> bool {
		if self.reserved.iter().any(|r| r == absolute) {
			return true;
		}
		self.pattern_matcher.is_excluded(rel.as_path())
	}

	pub fn patterns(&self) -> &[String] {
		self.pattern_matcher.patterns()
	}
}

/// Errors that can occur during exclusion processing
#[derive(Debug)]
pub enum ExclusionError {
	/// Failed to parse a glob pattern
	InvalidPattern(String),
}

impl std::fmt::Display for ExclusionError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ExclusionError::InvalidPattern(msg) => {
				write!(f, "Invalid exclusion pattern: {}", msg)
			}
		}
	}
}

impl std::error::Error for ExclusionError {}


// vim: ts=4
