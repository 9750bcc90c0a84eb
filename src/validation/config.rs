//! Configuration validation functions

use super::ValidationError;

/// Largest accepted polling interval (one day)
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Validate the polling interval in seconds
pub fn validate_interval_secs(interval_secs: u64) -> Result<(), ValidationError> {
	if interval_secs == 0 {
		return Err(ValidationError::ConfigError("Interval must be greater than 0".to_string()));
	}
	if interval_secs > MAX_INTERVAL_SECS {
		return Err(ValidationError::ConfigError(format!(
			"Interval too large: {} seconds (max {})",
			interval_secs, MAX_INTERVAL_SECS
		)));
	}
	Ok(())
}

/// Validate the hashing read buffer size in bytes
pub fn validate_buffer_size(size: usize) -> Result<(), ValidationError> {
	if size == 0 {
		return Err(ValidationError::ConfigError(
			"Buffer size must be greater than 0".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_validate_interval_valid() {
		assert!(validate_interval_secs(1).is_ok());
		assert!(validate_interval_secs(60).is_ok());
		assert!(validate_interval_secs(MAX_INTERVAL_SECS).is_ok());
	}

	#[test]
	fn test_validate_interval_zero() {
		let result = validate_interval_secs(0);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("greater than 0"));
	}

	#[test]
	fn test_validate_interval_too_large() {
		let result = validate_interval_secs(MAX_INTERVAL_SECS + 1);
		assert!(result.unwrap_err().to_string().contains("too large"));
	}

	#[test]
	fn test_validate_buffer_size() {
		assert!(validate_buffer_size(4096).is_ok());
		assert!(validate_buffer_size(0).is_err());
	}
}

// vim: ts=4
