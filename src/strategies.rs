//! Policy enums for the edge cases of a mirroring pass
//!
//! Each enum includes a FromStr implementation for CLI and config parsing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// HASH FAILURE POLICY
// ============================================================================

/// What to do when a file on either side cannot be read for hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HashFailurePolicy {
	/// Unreadable source: skip with a warning, never overwrite.
	/// Readable source, unreadable replica: overwrite the replica.
	#[default]
	Conservative,

	/// A failed hash becomes a "no hash" sentinel. Two sentinels compare
	/// equal, so two unreadable files never trigger an update.
	TreatAsEqual,
}

impl FromStr for HashFailurePolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"conservative" | "default" => Ok(Self::Conservative),
			"treat-as-equal" | "sentinel" | "legacy" => Ok(Self::TreatAsEqual),
			_ => Err(format!(
				"Unknown hash failure policy: {}. Valid options: conservative, treat-as-equal",
				s
			)),
		}
	}
}

impl std::fmt::Display for HashFailurePolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Conservative => write!(f, "conservative"),
			Self::TreatAsEqual => write!(f, "treat-as-equal"),
		}
	}
}

// ============================================================================
// TYPE CONFLICT POLICY
// ============================================================================

/// What to do when a path is a file on one side and a directory on the other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TypeConflictPolicy {
	/// Delete the replica entry and recreate it from the source
	#[default]
	Replace,

	/// Leave the replica entry alone and report it as skipped
	Ignore,
}

impl FromStr for TypeConflictPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"replace" => Ok(Self::Replace),
			"ignore" | "skip" => Ok(Self::Ignore),
			_ => Err(format!("Unknown type conflict policy: {}. Valid options: replace, ignore", s)),
		}
	}
}

impl std::fmt::Display for TypeConflictPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Replace => write!(f, "replace"),
			Self::Ignore => write!(f, "ignore"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_failure_policy_parse() {
		assert_eq!(
			"conservative".parse::<HashFailurePolicy>().unwrap(),
			HashFailurePolicy::Conservative
		);
		assert_eq!(
			"Treat-As-Equal".parse::<HashFailurePolicy>().unwrap(),
			HashFailurePolicy::TreatAsEqual
		);
		assert!("whatever".parse::<HashFailurePolicy>().is_err());
	}

	#[test]
	fn test_type_conflict_policy_parse() {
		assert_eq!("replace".parse::<TypeConflictPolicy>().unwrap(), TypeConflictPolicy::Replace);
		assert_eq!("skip".parse::<TypeConflictPolicy>().unwrap(), TypeConflictPolicy::Ignore);
		assert!("merge".parse::<TypeConflictPolicy>().is_err());
	}

	#[test]
	fn test_display_roundtrip() {
		for policy in [HashFailurePolicy::Conservative, HashFailurePolicy::TreatAsEqual] {
			assert_eq!(policy.to_string().parse::<HashFailurePolicy>().unwrap(), policy);
		}
		for policy in [TypeConflictPolicy::Replace, TypeConflictPolicy::Ignore] {
			assert_eq!(policy.to_string().parse::<TypeConflictPolicy>().unwrap(), policy);
		}
	}

	#[test]
	fn test_defaults() {
		assert_eq!(HashFailurePolicy::default(), HashFailurePolicy::Conservative);
		assert_eq!(TypeConflictPolicy::default(), TypeConflictPolicy::Replace);
	}
}

// vim: ts=4
