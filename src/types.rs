use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Kind of a tree entry, taken from the stat done at enumeration time
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ItemKind {
	File,
	Dir,
	/// Symlink, FIFO, socket or device; never followed or mirrored
	Other,
}

impl fmt::Display for ItemKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ItemKind::File => write!(f, "file"),
			ItemKind::Dir => write!(f, "directory"),
			ItemKind::Other => write!(f, "special file"),
		}
	}
}

/// Path of an entry relative to its tree root
///
/// Only normal components are kept, so the same logical entry yields an equal
/// key on both sides regardless of how the root was spelled. Equality is
/// component-wise and case-sensitive.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RelPath(PathBuf);

impl RelPath {
	/// Build a key from a path already relative to its root
	///
	/// Returns None for the root itself or for paths carrying `..`, root or
	/// prefix components.
	pub fn new(rel: &Path) -> Option<RelPath> {
		let mut out = PathBuf::new();
		for component in rel.components() {
			match component {
				Component::Normal(part) => out.push(part),
				Component::CurDir => {}
				_ => return None,
			}
		}
		if out.as_os_str().is_empty() {
			None
		} else {
			Some(RelPath(out))
		}
	}

	/// Build a key for `path` located under `root`
	pub fn from_root(root: &Path, path: &Path) -> Option<RelPath> {
		path.strip_prefix(root).ok().and_then(RelPath::new)
	}

	pub fn as_path(&self) -> &Path {
		&self.0
	}

	/// Number of components; top-level entries have depth 1
	pub fn depth(&self) -> usize {
		self.0.components().count()
	}

	/// Location of this entry under another tree root
	pub fn under(&self, root: &Path) -> PathBuf {
		root.join(&self.0)
	}

	/// True if `ancestor` is a strict ancestor of this path
	pub fn is_descendant_of(&self, ancestor: &RelPath) -> bool {
		self.0 != ancestor.0 && self.0.starts_with(&ancestor.0)
	}

	/// Strict ancestors, nearest first
	pub fn ancestors(&self) -> impl Iterator<Item = RelPath> + '_ {
		self.0.ancestors().skip(1).filter_map(RelPath::new)
	}
}

impl fmt::Display for RelPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for component in self.0.components() {
			if !first {
				f.write_str("/")?;
			}
			write!(f, "{}", component.as_os_str().to_string_lossy())?;
			first = false;
		}
		Ok(())
	}
}

impl Serialize for RelPath {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_string())
	}
}

/// BLAKE3 digest of a file's contents
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
	pub fn from_bytes(bytes: [u8; 32]) -> Self {
		ContentHash(bytes)
	}

	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	pub fn to_hex(&self) -> String {
		hex::encode(self.0)
	}
}

impl From<blake3::Hash> for ContentHash {
	fn from(hash: blake3::Hash) -> Self {
		ContentHash(*hash.as_bytes())
	}
}

impl fmt::Display for ContentHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_relpath_normalizes() {
		let a = RelPath::new(Path::new("./dir1//dir2/file.txt")).unwrap();
		let b = RelPath::new(Path::new("dir1/dir2/file.txt")).unwrap();
		assert_eq!(a, b);
		assert_eq!(a.depth(), 3);
		assert_eq!(a.to_string(), "dir1/dir2/file.txt");
	}

	#[test]
	fn test_relpath_rejects_escapes() {
		assert!(RelPath::new(Path::new("../etc/passwd")).is_none());
		assert!(RelPath::new(Path::new("/abs/path")).is_none());
		assert!(RelPath::new(Path::new("")).is_none());
		assert!(RelPath::new(Path::new(".")).is_none());
	}

	#[test]
	fn test_relpath_from_root() {
		let root = Path::new("/data/source");
		let rel = RelPath::from_root(root, Path::new("/data/source/a/b.txt")).unwrap();
		assert_eq!(rel.to_string(), "a/b.txt");
		assert_eq!(rel.under(Path::new("/data/replica")), PathBuf::from("/data/replica/a/b.txt"));

		assert!(RelPath::from_root(root, Path::new("/elsewhere/a")).is_none());
		assert!(RelPath::from_root(root, root).is_none());
	}

	#[test]
	fn test_relpath_descendant() {
		let dir = RelPath::new(Path::new("a/b")).unwrap();
		let child = RelPath::new(Path::new("a/b/c")).unwrap();
		let sibling = RelPath::new(Path::new("a/bc")).unwrap();

		assert!(child.is_descendant_of(&dir));
		assert!(!dir.is_descendant_of(&dir));
		assert!(!sibling.is_descendant_of(&dir));
	}

	#[test]
	fn test_relpath_ancestors() {
		let rel = RelPath::new(Path::new("a/b/c")).unwrap();
		let ancestors: Vec<String> = rel.ancestors().map(|a| a.to_string()).collect();
		assert_eq!(ancestors, vec!["a/b".to_string(), "a".to_string()]);
	}

	#[test]
	fn test_content_hash_hex() {
		let hash = ContentHash::from(blake3::hash(b"hello"));
		assert_eq!(hash.to_hex().len(), 64);
		assert_eq!(hash, ContentHash::from_bytes(*blake3::hash(b"hello").as_bytes()));
	}
}

// vim: ts=4
