//! Configuration for a mirroring session
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (MirrorConfig::default())
//! 2. Config file (TOML, camelCase keys)
//! 3. CLI flags (highest priority)
//!
//! Once a synchronizer is built from it the configuration never changes.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::MirrorError;
use crate::exclusion::PatternMatcher;
use crate::item::DEFAULT_BUFFER_SIZE;
use crate::strategies::{HashFailurePolicy, TypeConflictPolicy};
use crate::validation::{self, ValidationError, Validator};

/// Default polling interval between passes
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default action log location
pub const DEFAULT_LOG_FILE: &str = "treemirror.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MirrorConfig {
	// ========================================================================
	// TREES
	// ========================================================================
	/// Directory mirrored from
	pub source: PathBuf,

	/// Directory mirrored onto
	pub replica: PathBuf,

	/// Glob patterns (relative paths) skipped on both sides
	pub exclude_patterns: Vec<String>,

	// ========================================================================
	// SCHEDULING
	// ========================================================================
	/// Seconds between the start of consecutive passes
	pub interval_secs: u64,

	// ========================================================================
	// EDGE CASES
	// ========================================================================
	pub hash_failure_policy: HashFailurePolicy,

	pub type_conflict_policy: TypeConflictPolicy,

	// ========================================================================
	// OUTPUT
	// ========================================================================
	/// Append-only action log
	pub log_file: PathBuf,

	/// Echo every action log line to stdout
	pub echo_actions: bool,

	// ========================================================================
	// PERFORMANCE
	// ========================================================================
	/// Read buffer used when hashing
	pub buffer_size: usize,
}

impl Default for MirrorConfig {
	fn default() -> Self {
		MirrorConfig {
			source: PathBuf::new(),
			replica: PathBuf::new(),
			exclude_patterns: vec![],
			interval_secs: DEFAULT_INTERVAL_SECS,
			hash_failure_policy: HashFailurePolicy::Conservative,
			type_conflict_policy: TypeConflictPolicy::Replace,
			log_file: PathBuf::from(DEFAULT_LOG_FILE),
			echo_actions: true,
			buffer_size: DEFAULT_BUFFER_SIZE,
		}
	}
}

impl MirrorConfig {
	pub fn new(
		source: impl Into<PathBuf>,
		replica: impl Into<PathBuf>,
		log_file: impl Into<PathBuf>,
	) -> Self {
		MirrorConfig {
			source: source.into(),
			replica: replica.into(),
			log_file: log_file.into(),
			..Default::default()
		}
	}

	/// Load a TOML config file; missing keys keep their defaults
	pub fn from_file(path: &Path) -> Result<Self, MirrorError> {
		let contents = std::fs::read_to_string(path).map_err(|e| MirrorError::ConfigFile {
			path: path.to_path_buf(),
			message: e.to_string(),
		})?;
		Self::from_toml_str(&contents).map_err(|message| MirrorError::ConfigFile {
			path: path.to_path_buf(),
			message,
		})
	}

	pub fn from_toml_str(contents: &str) -> Result<Self, String> {
		toml::from_str(contents).map_err(|e| e.to_string())
	}

	pub fn interval(&self) -> Duration {
		Duration::from_secs(self.interval_secs)
	}

	pub fn with_interval_secs(mut self, secs: u64) -> Self {
		self.interval_secs = secs;
		self
	}

	pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
		self.exclude_patterns.push(pattern.into());
		self
	}

	pub fn with_hash_failure_policy(mut self, policy: HashFailurePolicy) -> Self {
		self.hash_failure_policy = policy;
		self
	}

	pub fn with_type_conflict_policy(mut self, policy: TypeConflictPolicy) -> Self {
		self.type_conflict_policy = policy;
		self
	}

	pub fn with_echo(mut self, echo: bool) -> Self {
		self.echo_actions = echo;
		self
	}

	/// Check values without touching the filesystem
	pub fn check(&self) -> Result<(), MirrorError> {
		self.validate().map_err(MirrorError::from)
	}
}

impl Validator for MirrorConfig {
	fn validate(&self) -> Result<(), ValidationError> {
		if self.source.as_os_str().is_empty() {
			return Err(ValidationError::ConfigError("Source directory is not set".to_string()));
		}
		if self.replica.as_os_str().is_empty() {
			return Err(ValidationError::ConfigError("Replica directory is not set".to_string()));
		}
		if self.log_file.as_os_str().is_empty() {
			return Err(ValidationError::ConfigError("Log file is not set".to_string()));
		}
		validation::validate_interval_secs(self.interval_secs)?;
		validation::validate_buffer_size(self.buffer_size)?;
		PatternMatcher::new(&self.exclude_patterns)
			.map_err(|e| ValidationError::ConfigError(e.to_string()))?;
		Ok(())
	}
}


// vim: ts=4
