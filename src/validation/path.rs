//! Path validation functions

use std::fs;
use std::path::{Path, PathBuf};

use super::ValidationError;

/// Validate that a tree root exists and is a directory
///
/// # Arguments
/// * `label` - Human readable role of the root ("source", "replica")
/// * `root` - Directory to check
pub fn validate_root_dir(label: &str, root: &Path) -> Result<(), ValidationError> {
	match fs::metadata(root) {
		Ok(meta) if meta.is_dir() => Ok(()),
		Ok(_) => Err(ValidationError::PathError(format!(
			"{} {} exists, but it is not a directory",
			label,
			root.display()
		))),
		Err(e) => Err(ValidationError::PathError(format!(
			"{} {} is not accessible: {}",
			label,
			root.display(),
			e
		))),
	}
}

/// Validate a source/replica pair before the first pass
///
/// Both roots must be existing directories. They must also be distinct and
/// neither may contain the other, otherwise every pass would mirror its own
/// output.
pub fn validate_roots(source: &Path, replica: &Path) -> Result<(), ValidationError> {
	validate_root_dir("Source", source)?;
	validate_root_dir("Replica", replica)?;

	let source = canonical(source)?;
	let replica = canonical(replica)?;

	if source == replica {
		return Err(ValidationError::PathError(format!(
			"Source and replica are the same directory: {}",
			source.display()
		)));
	}
	if replica.starts_with(&source) {
		return Err(ValidationError::PathError(format!(
			"Replica {} is inside source {}",
			replica.display(),
			source.display()
		)));
	}
	if source.starts_with(&replica) {
		return Err(ValidationError::PathError(format!(
			"Source {} is inside replica {}",
			source.display(),
			replica.display()
		)));
	}
	Ok(())
}

fn canonical(path: &Path) -> Result<PathBuf, ValidationError> {
	fs::canonicalize(path).map_err(|e| {
		ValidationError::PathError(format!("Cannot resolve {}: {}", path.display(), e))
	})
}


// vim: ts=4
