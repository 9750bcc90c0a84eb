//! Centralized validation for treemirror
//!
//! This module provides the checks a caller runs before the first pass:
//! - Configuration validation (interval, buffer size, paths)
//! - Root validation (existence, kind, nesting)

use std::error::Error;
use std::fmt;

pub mod config;
pub mod path;

pub use config::*;
pub use path::*;

/// Generic validation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
	/// Invalid configuration
	ConfigError(String),
	/// Invalid path
	PathError(String),
}

impl fmt::Display for ValidationError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValidationError::ConfigError(msg) => write!(f, "Config validation error: {}", msg),
			ValidationError::PathError(msg) => write!(f, "Path validation error: {}", msg),
		}
	}
}

impl Error for ValidationError {}

/// Trait for validatable types
pub trait Validator {
	/// Validate this type
	/// Returns Ok(()) if valid, Err(ValidationError) if invalid
	fn validate(&self) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_validation_error_display() {
		let err = ValidationError::ConfigError("test error".to_string());
		assert!(err.to_string().contains("Config validation error"));

		let err = ValidationError::PathError("bad root".to_string());
		assert!(err.to_string().contains("bad root"));
	}
}

// vim: ts=4
