//! Pattern-based exclusion using glob patterns

use super::ExclusionError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Pattern matcher using globset for efficient matching
///
/// Patterns are matched against relative paths. `*` does not cross a `/`,
/// use `**` for that. A pattern without a `/` also matches the entry name
/// at any depth, so `*.tmp` excludes `a/b/c.tmp`.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	/// Patterns matched against the full relative path
	path_set: GlobSet,

	/// Slash-free patterns, matched against the last component only
	name_set: GlobSet,

	patterns: Vec<String>,
}

impl PatternMatcher {
	/// Create a new pattern matcher
	pub fn new(patterns: &[String]) -> Result<Self, ExclusionError> {
		let name_patterns: Vec<String> =
			patterns.iter().filter(|p| !p.contains('/')).cloned().collect();

		Ok(Self {
			path_set: Self::build_glob_set(patterns)?,
			name_set: Self::build_glob_set(&name_patterns)?,
			patterns: patterns.to_vec(),
		})
	}

	/// Matcher without patterns
	pub fn empty() -> Self {
		Self { path_set: GlobSet::empty(), name_set: GlobSet::empty(), patterns: Vec::new() }
	}

	/// Build a GlobSet from patterns
	fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ExclusionError> {
		let mut builder = GlobSetBuilder::new();

		for pattern in patterns {
			let glob = GlobBuilder::new(pattern)
				.literal_separator(true)
				.build()
				.map_err(|e| ExclusionError::InvalidPattern(format!("{}: {}", pattern, e)))?;
			builder.add(glob);
		}

		builder.build().map_err(|e| {
			ExclusionError::InvalidPattern(format!("Failed to build pattern set: {}", e))
		})
	}

	/// Check if a relative path is excluded by any pattern
	pub fn is_excluded(&self, path: &Path) -> bool {
		if self.path_set.is_match(path) {
			return true;
		}
		match path.file_name() {
			Some(name) => self.name_set.is_match(Path::new(name)),
			None => false,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	pub fn patterns(&self) -> &[String] {
		&self.patterns
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matcher(patterns: &[&str]) -> PatternMatcher {
		let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
		PatternMatcher::new(&patterns).unwrap()
	}

	#[test]
	fn test_basic_exclusion() {
		let matcher = matcher(&["*.log", "*.tmp"]);

		assert!(matcher.is_excluded(Path::new("test.log")));
		assert!(matcher.is_excluded(Path::new("foo/bar.tmp")));
		assert!(!matcher.is_excluded(Path::new("test.txt")));
	}

	#[test]
	fn test_anchored_patterns() {
		let matcher = matcher(&["build/*.o", "docs/**"]);

		assert!(matcher.is_excluded(Path::new("build/main.o")));
		assert!(!matcher.is_excluded(Path::new("build/sub/main.o")));
		assert!(!matcher.is_excluded(Path::new("src/build/main.o")));
		assert!(matcher.is_excluded(Path::new("docs/a/b/c.md")));
	}

	#[test]
	fn test_directory_name_pattern() {
		let matcher = matcher(&["node_modules"]);

		assert!(matcher.is_excluded(Path::new("node_modules")));
		assert!(matcher.is_excluded(Path::new("web/node_modules")));
		assert!(!matcher.is_excluded(Path::new("web/node_modules_backup")));
	}

	#[test]
	fn test_invalid_pattern() {
		let result = PatternMatcher::new(&["[unclosed".to_string()]);
		assert!(matches!(result, Err(ExclusionError::InvalidPattern(_))));
	}

	#[test]
	fn test_empty_matcher() {
		let matcher = matcher(&[]);
		assert!(matcher.is_empty());
		assert!(!matcher.is_excluded(Path::new("anything")));
	}
}

// vim: ts=4
