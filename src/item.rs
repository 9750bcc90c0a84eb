//! Single filesystem entry discovered under a tree root
//!
//! An `Item` is built during enumeration and lives for one pass. It carries
//! no state beyond its identity; every operation goes to disk and reports
//! failures as `ItemError` values instead of aborting.

use filetime::FileTime;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{ItemError, ItemOp};
use crate::logging::*;
use crate::types::{ContentHash, ItemKind, RelPath};

/// Default read buffer for streaming hashes
pub const DEFAULT_BUFFER_SIZE: usize = 65536;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
	pub relative_path: RelPath,
	pub absolute_path: PathBuf,
	pub kind: ItemKind,
}

impl Item {
	pub fn new(relative_path: RelPath, absolute_path: PathBuf, kind: ItemKind) -> Self {
		Item { relative_path, absolute_path, kind }
	}

	pub fn is_file(&self) -> bool {
		self.kind == ItemKind::File
	}

	pub fn is_dir(&self) -> bool {
		self.kind == ItemKind::Dir
	}

	/// Symlink or special file
	pub fn is_other(&self) -> bool {
		self.kind == ItemKind::Other
	}

	/// Where this entry lives when mirrored under `root`
	pub fn target_under(&self, root: &Path) -> PathBuf {
		self.relative_path.under(root)
	}

	/// Stream the file through BLAKE3 in `buffer_size` chunks
	///
	/// Never holds more than one buffer of the file in memory. Only regular
	/// files have a content hash; anything else yields an error without
	/// being opened.
	pub fn hash(&self, buffer_size: usize) -> Result<ContentHash, ItemError> {
		if !self.is_file() {
			return Err(ItemError::new(
				ItemOp::Hash,
				&self.absolute_path,
				io::Error::new(
					io::ErrorKind::InvalidInput,
					format!("a {} has no content hash", self.kind),
				),
			));
		}

		let err = |e: io::Error| ItemError::new(ItemOp::Hash, &self.absolute_path, e);
		let mut f = fs::File::open(&self.absolute_path).map_err(err)?;
		let mut hasher = blake3::Hasher::new();
		let mut buf = vec![0u8; buffer_size.max(1)];

		loop {
			let n = match f.read(&mut buf) {
				Ok(0) => break,
				Ok(n) => n,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(err(e)),
			};
			hasher.update(&buf[..n]);
		}

		Ok(ContentHash::from(hasher.finalize()))
	}

	/// Copy file bytes to `destination`, then carry timestamps over
	///
	/// The parent of `destination` must already exist. An existing file at
	/// `destination` is overwritten. Timestamp failures are logged only.
	pub fn copy_file(&self, destination: &Path) -> Result<(), ItemError> {
		fs::copy(&self.absolute_path, destination)
			.map_err(|e| ItemError::new(ItemOp::CopyFile, destination, e))?;

		match fs::metadata(&self.absolute_path) {
			Ok(meta) => {
				let atime = FileTime::from_last_access_time(&meta);
				let mtime = FileTime::from_last_modification_time(&meta);
				if let Err(e) = filetime::set_file_times(destination, atime, mtime) {
					debug!("Cannot set timestamps on {}: {}", destination.display(), e);
				}
			}
			Err(e) => {
				debug!("Cannot stat {} for timestamps: {}", self.absolute_path.display(), e);
			}
		}
		Ok(())
	}

	/// Create `destination` as a directory, including missing parents
	pub fn copy_directory(&self, destination: &Path) -> Result<(), ItemError> {
		create_dir_all(destination)
	}

	pub fn delete_file(&self) -> Result<(), ItemError> {
		fs::remove_file(&self.absolute_path)
			.map_err(|e| ItemError::new(ItemOp::DeleteFile, &self.absolute_path, e))
	}

	/// Remove the directory and everything below it
	pub fn delete_directory(&self) -> Result<(), ItemError> {
		fs::remove_dir_all(&self.absolute_path)
			.map_err(|e| ItemError::new(ItemOp::DeleteDirectory, &self.absolute_path, e))
	}

	/// Remove the entry according to its kind
	///
	/// Symlinks are unlinked, never followed.
	pub fn delete(&self) -> Result<(), ItemError> {
		match self.kind {
			ItemKind::File | ItemKind::Other => self.delete_file(),
			ItemKind::Dir => self.delete_directory(),
		}
	}
}

/// Idempotent `mkdir -p`
pub fn create_dir_all(path: &Path) -> Result<(), ItemError> {
	fs::create_dir_all(path).map_err(|e| ItemError::new(ItemOp::CreateDirectory, path, e))
}

/// Make sure every directory above `path` exists
pub fn ensure_parent(path: &Path) -> Result<(), ItemError> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent),
		_ => Ok(()),
	}
}


// vim: ts=4
