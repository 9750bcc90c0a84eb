//! Three-way classification of two tree snapshots
//!
//! Every relative path present on either side falls into exactly one bucket:
//! new (source only), stale (replica only), common file, or type conflict.
//! Common directories need no action. All lists come back shallowest-first
//! so a directory is always handled before anything inside it.
//!
//! Symlinks and special files are never mirrored: on the source side they
//! count as absent, on the replica side they are stale or in conflict.

use std::collections::HashSet;

use crate::error::ItemError;
use crate::item::Item;
use crate::strategies::{HashFailurePolicy, TypeConflictPolicy};
use crate::tree::TreeSnapshot;
use crate::types::{ContentHash, RelPath};

/// Source items missing from the replica
#[derive(Debug, Default)]
pub struct NewItems<'a> {
	/// Items to materialize in the new-item phase
	pub ready: Vec<&'a Item>,

	/// Items below a path the replica has with the wrong kind; they can only
	/// be placed once that conflict is resolved
	pub deferred: Vec<&'a Item>,
}

/// Order items so parents come before their contents
pub fn sort_shallow_first(items: &mut [&Item]) {
	items.sort_by(|a, b| {
		a.relative_path
			.depth()
			.cmp(&b.relative_path.depth())
			.then_with(|| a.relative_path.cmp(&b.relative_path))
	});
}

/// Source items whose relative path is absent from the replica
pub fn new_items<'a>(
	source: &'a TreeSnapshot,
	replica: &TreeSnapshot,
	conflict_policy: TypeConflictPolicy,
) -> NewItems<'a> {
	// A replica symlink in the way is never written through, whatever the policy
	let blocked: HashSet<&RelPath> = type_conflicts(source, replica)
		.into_iter()
		.filter(|(_, r)| conflict_policy == TypeConflictPolicy::Replace || r.is_other())
		.map(|(s, _)| &s.relative_path)
		.collect();

	let mut out = NewItems::default();
	for item in source.items.values().filter(|i| !i.is_other()) {
		if replica.contains(&item.relative_path) {
			continue;
		}
		if item.relative_path.ancestors().any(|a| blocked.contains(&a)) {
			out.deferred.push(item);
		} else {
			out.ready.push(item);
		}
	}
	sort_shallow_first(&mut out.ready);
	sort_shallow_first(&mut out.deferred);
	out
}

/// Replica items whose relative path is absent from the source
///
/// Items inside a source directory that could not be listed are left out:
/// their absence from the snapshot says nothing about the source.
pub fn stale_items<'a>(source: &TreeSnapshot, replica: &'a TreeSnapshot) -> Vec<&'a Item> {
	let mut out: Vec<&Item> = replica
		.items
		.values()
		.filter(|i| source.regular(&i.relative_path).is_none())
		.filter(|i| !source.is_unknown(&i.relative_path))
		.collect();
	sort_shallow_first(&mut out);
	out
}

/// Paths that are regular files on both sides, as (source, replica) pairs
pub fn common_files<'a>(
	source: &'a TreeSnapshot,
	replica: &'a TreeSnapshot,
) -> Vec<(&'a Item, &'a Item)> {
	let mut out: Vec<(&Item, &Item)> = source
		.files()
		.filter_map(|s| match replica.get(&s.relative_path) {
			Some(r) if r.is_file() => Some((s, r)),
			_ => None,
		})
		.collect();
	out.sort_by(|a, b| a.0.relative_path.cmp(&b.0.relative_path));
	out
}

/// Paths present on both sides with different kinds, as (source, replica)
pub fn type_conflicts<'a>(
	source: &'a TreeSnapshot,
	replica: &'a TreeSnapshot,
) -> Vec<(&'a Item, &'a Item)> {
	let mut out: Vec<(&Item, &Item)> = source
		.items
		.values()
		.filter(|s| !s.is_other())
		.filter_map(|s| match replica.get(&s.relative_path) {
			Some(r) if r.kind != s.kind => Some((s, r)),
			_ => None,
		})
		.collect();
	out.sort_by(|a, b| {
		a.0.relative_path
			.depth()
			.cmp(&b.0.relative_path.depth())
			.then_with(|| a.0.relative_path.cmp(&b.0.relative_path))
	});
	out
}

/// Outcome of comparing one common file
#[derive(Debug)]
pub enum UpdateDecision {
	/// Contents match, nothing to do
	Unchanged,

	/// Contents differ (or the replica is unreadable), overwrite it
	Update,

	/// Source could not be hashed; leave the replica alone
	SkipUnreadableSource(ItemError),
}

/// Decide whether a common file needs to be overwritten
///
/// # Arguments
/// * `source` - Hash of the source file, or why it could not be computed
/// * `replica` - Hash of the replica file, or why it could not be computed
/// * `policy` - How hash failures are interpreted
pub fn decide_update(
	source: Result<ContentHash, ItemError>,
	replica: Result<ContentHash, ItemError>,
	policy: HashFailurePolicy,
) -> UpdateDecision {
	match policy {
		HashFailurePolicy::Conservative => match (source, replica) {
			(Err(e), _) => UpdateDecision::SkipUnreadableSource(e),
			(Ok(_), Err(_)) => UpdateDecision::Update,
			(Ok(s), Ok(r)) if s == r => UpdateDecision::Unchanged,
			(Ok(_), Ok(_)) => UpdateDecision::Update,
		},
		HashFailurePolicy::TreatAsEqual => {
			if source.ok() == replica.ok() {
				UpdateDecision::Unchanged
			} else {
				UpdateDecision::Update
			}
		}
	}
}


// vim: ts=4
