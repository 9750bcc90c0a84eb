//! Tree enumeration
//!
//! `list_tree` walks a root recursively and returns every entry below it as
//! an `Item` keyed by relative path. Empty directories are included because
//! their presence is itself something to mirror. Symlinks and special files
//! are listed but never descended into.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ItemError, ItemOp};
use crate::exclusion::ExclusionEngine;
use crate::item::Item;
use crate::logging::*;
use crate::types::{ItemKind, RelPath};

/// Every entry found under one root at one point in time
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
	/// Canonical root the snapshot was taken from
	pub root: PathBuf,

	pub items: HashMap<RelPath, Item>,

	/// Directories whose listing failed; their contents are unknown
	pub unreadable: Vec<RelPath>,
}

impl TreeSnapshot {
	pub fn get(&self, rel: &RelPath) -> Option<&Item> {
		self.items.get(rel)
	}

	pub fn contains(&self, rel: &RelPath) -> bool {
		self.items.contains_key(rel)
	}

	/// Regular file or directory at `rel`; special entries do not count
	pub fn regular(&self, rel: &RelPath) -> Option<&Item> {
		self.items.get(rel).filter(|i| !i.is_other())
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn files(&self) -> impl Iterator<Item = &Item> {
		self.items.values().filter(|i| i.is_file())
	}

	/// True if `rel` lies in a directory whose listing failed
	pub fn is_unknown(&self, rel: &RelPath) -> bool {
		self.unreadable.iter().any(|dir| rel.is_descendant_of(dir))
	}
}

/// Enumerate every file and directory under `root`
///
/// Only a failure to read the root itself is returned as an error: without
/// it nothing can be said about the tree. Unreadable subdirectories are
/// logged and recorded in `TreeSnapshot::unreadable`. Symlinks and special
/// files are recorded as `ItemKind::Other` without being followed.
pub fn list_tree(root: &Path, exclusion: &ExclusionEngine) -> Result<TreeSnapshot, ItemError> {
	let root =
		fs::canonicalize(root).map_err(|e| ItemError::new(ItemOp::Enumerate, root, e))?;
	let mut snapshot =
		TreeSnapshot { root: root.clone(), items: HashMap::new(), unreadable: Vec::new() };
	let mut pending: Vec<PathBuf> = vec![root.clone()];

	while let Some(dir) = pending.pop() {
		let entries = match fs::read_dir(&dir) {
			Ok(e) => e,
			// Nothing can be said about a tree whose root cannot be listed
			Err(e) if dir == root => return Err(ItemError::new(ItemOp::Enumerate, &root, e)),
			Err(e) => {
				warn!("Cannot read directory {}: {}", dir.display(), e);
				if let Some(rel) = RelPath::from_root(&root, &dir) {
					snapshot.unreadable.push(rel);
				}
				continue;
			}
		};

		for entry_result in entries {
			let entry = match entry_result {
				Ok(e) => e,
				Err(e) => {
					warn!("Error reading entry in {}: {}", dir.display(), e);
					if let Some(rel) = RelPath::from_root(&root, &dir) {
						snapshot.unreadable.push(rel);
					}
					continue;
				}
			};

			let path = entry.path();
			let rel = match RelPath::from_root(&root, &path) {
				Some(rel) => rel,
				None => continue,
			};

			if exclusion.should_exclude(&rel, &path) {
				debug!("Excluded {}", rel);
				continue;
			}

			// DirEntry::file_type does not follow symlinks
			let file_type = match entry.file_type() {
				Ok(t) => t,
				Err(e) => {
					warn!("Cannot access {}: {}", path.display(), e);
					continue;
				}
			};

			let kind = if file_type.is_dir() {
				ItemKind::Dir
			} else if file_type.is_file() {
				ItemKind::File
			} else {
				debug!("{} is not a regular file or directory", path.display());
				ItemKind::Other
			};

			if kind == ItemKind::Dir {
				pending.push(path.clone());
			}
			snapshot.items.insert(rel.clone(), Item::new(rel, path, kind));
		}
	}

	snapshot.unreadable.sort();
	snapshot.unreadable.dedup();
	debug!(
		"Listed {} entries under {} ({} unreadable directories)",
		snapshot.len(),
		root.display(),
		snapshot.unreadable.len()
	);
	Ok(snapshot)
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn rel(s: &str) -> RelPath {
		RelPath::new(Path::new(s)).unwrap()
	}

	#[test]
	fn test_list_includes_files_and_dirs() {
		let dir = TempDir::new().unwrap();
		fs::create_dir_all(dir.path().join("d1/d2")).unwrap();
		fs::create_dir(dir.path().join("empty")).unwrap();
		fs::write(dir.path().join("a.txt"), "a").unwrap();
		fs::write(dir.path().join("d1/d2/b.txt"), "b").unwrap();

		let snapshot = list_tree(dir.path(), &ExclusionEngine::none()).unwrap();

		assert_eq!(snapshot.len(), 6);
		assert_eq!(snapshot.get(&rel("a.txt")).unwrap().kind, ItemKind::File);
		assert_eq!(snapshot.get(&rel("d1")).unwrap().kind, ItemKind::Dir);
		assert_eq!(snapshot.get(&rel("d1/d2")).unwrap().kind, ItemKind::Dir);
		assert_eq!(snapshot.get(&rel("d1/d2/b.txt")).unwrap().kind, ItemKind::File);
		assert_eq!(snapshot.get(&rel("empty")).unwrap().kind, ItemKind::Dir);
		assert_eq!(snapshot.files().count(), 2);
		assert!(snapshot.unreadable.is_empty());
	}

	#[test]
	fn test_list_empty_root() {
		let dir = TempDir::new().unwrap();
		let snapshot = list_tree(dir.path(), &ExclusionEngine::none()).unwrap();
		assert!(snapshot.is_empty());
	}

	#[test]
	fn test_list_absolute_paths_under_root() {
		let dir = TempDir::new().unwrap();
		fs::create_dir(dir.path().join("sub")).unwrap();
		fs::write(dir.path().join("sub/x.txt"), "x").unwrap();

		let snapshot = list_tree(dir.path(), &ExclusionEngine::none()).unwrap();
		let item = snapshot.get(&rel("sub/x.txt")).unwrap();
		assert!(item.absolute_path.starts_with(&snapshot.root));
		assert_eq!(fs::read_to_string(&item.absolute_path).unwrap(), "x");
	}

	#[test]
	fn test_list_relative_paths_match_across_roots() {
		let a = TempDir::new().unwrap();
		let b = TempDir::new().unwrap();
		for root in [a.path(), b.path()] {
			fs::create_dir_all(root.join("x/y")).unwrap();
			fs::write(root.join("x/y/z.txt"), "z").unwrap();
		}

		let sa = list_tree(a.path(), &ExclusionEngine::none()).unwrap();
		let sb = list_tree(b.path(), &ExclusionEngine::none()).unwrap();
		let mut ka: Vec<_> = sa.items.keys().cloned().collect();
		let mut kb: Vec<_> = sb.items.keys().cloned().collect();
		ka.sort();
		kb.sort();
		assert_eq!(ka, kb);
	}

	#[test]
	fn test_list_applies_exclusions() {
		let dir = TempDir::new().unwrap();
		fs::create_dir_all(dir.path().join("cache/deep")).unwrap();
		fs::write(dir.path().join("cache/deep/blob"), "x").unwrap();
		fs::write(dir.path().join("keep.txt"), "k").unwrap();
		fs::write(dir.path().join("skip.tmp"), "t").unwrap();

		let engine = ExclusionEngine::new(&["cache".to_string(), "*.tmp".to_string()]).unwrap();
		let snapshot = list_tree(dir.path(), &engine).unwrap();

		assert_eq!(snapshot.len(), 1);
		assert!(snapshot.contains(&rel("keep.txt")));
	}

	#[test]
	fn test_list_missing_root_is_error() {
		let dir = TempDir::new().unwrap();
		let err = list_tree(&dir.path().join("missing"), &ExclusionEngine::none()).unwrap_err();
		assert_eq!(err.op, ItemOp::Enumerate);
	}

	#[test]
	fn test_list_root_that_cannot_be_listed_is_error() {
		let dir = TempDir::new().unwrap();
		let file = dir.path().join("plain.txt");
		fs::write(&file, "x").unwrap();

		let err = list_tree(&file, &ExclusionEngine::none()).unwrap_err();
		assert_eq!(err.op, ItemOp::Enumerate);
	}

	#[cfg(unix)]
	#[test]
	fn test_list_records_symlinks_without_following() {
		let dir = TempDir::new().unwrap();
		fs::create_dir(dir.path().join("real")).unwrap();
		fs::write(dir.path().join("real/inside.txt"), "t").unwrap();
		std::os::unix::fs::symlink(dir.path().join("real/inside.txt"), dir.path().join("link"))
			.unwrap();
		std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("dirlink")).unwrap();

		let snapshot = list_tree(dir.path(), &ExclusionEngine::none()).unwrap();
		assert_eq!(snapshot.get(&rel("real/inside.txt")).unwrap().kind, ItemKind::File);
		assert_eq!(snapshot.get(&rel("link")).unwrap().kind, ItemKind::Other);
		assert_eq!(snapshot.get(&rel("dirlink")).unwrap().kind, ItemKind::Other);
		assert!(!snapshot.contains(&rel("dirlink/inside.txt")));
		assert_eq!(snapshot.files().count(), 1);
	}

	#[test]
	fn test_is_unknown() {
		let snapshot = TreeSnapshot {
			root: PathBuf::from("/r"),
			items: HashMap::new(),
			unreadable: vec![rel("locked")],
		};
		assert!(snapshot.is_unknown(&rel("locked/a.txt")));
		assert!(!snapshot.is_unknown(&rel("locked")));
		assert!(!snapshot.is_unknown(&rel("open/a.txt")));
	}
}

// vim: ts=4
