//! One-way tree synchronization
//!
//! `TreeSynchronizer::synchronize` runs a single pass:
//!
//! 1. enumerate source and replica
//! 2. materialize source items missing from the replica
//! 3. remove replica items missing from the source
//! 4. overwrite common files whose contents differ, resolve type conflicts
//!
//! No state survives between passes. Every pass re-enumerates both trees,
//! which makes repeated calls idempotent and lets an interrupted pass be
//! finished by the next one. Per-item failures are reported and skipped,
//! never propagated.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::time::Instant;

use crate::action_log::{ActionLog, Verb};
use crate::config::MirrorConfig;
use crate::diff::{self, UpdateDecision};
use crate::error::{ItemError, ItemOp, MirrorError};
use crate::exclusion::ExclusionEngine;
use crate::item::{self, Item};
use crate::logging::*;
use crate::report::{PassReport, SyncPhase};
use crate::strategies::TypeConflictPolicy;
use crate::tree::{self, TreeSnapshot};
use crate::types::{ItemKind, RelPath};
use crate::utils::ShutdownSignal;

pub struct TreeSynchronizer {
	config: MirrorConfig,
	exclusion: ExclusionEngine,
	log: ActionLog,
	shutdown: ShutdownSignal,
}

impl TreeSynchronizer {
	/// Build a synchronizer and open its action log
	///
	/// The roots are not checked here; callers run
	/// `validation::validate_roots` once before the first pass.
	pub fn new(config: MirrorConfig) -> Result<Self, MirrorError> {
		config.check()?;

		let log = ActionLog::open(&config.log_file, config.echo_actions)?;
		let mut exclusion = ExclusionEngine::new(&config.exclude_patterns)?;
		// The log may live inside one of the trees; it must never be mirrored
		exclusion.reserve(log.path());

		Ok(TreeSynchronizer { config, exclusion, log, shutdown: ShutdownSignal::new() })
	}

	/// Share a shutdown signal checked between phases
	pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
		self.shutdown = shutdown;
		self
	}

	pub fn config(&self) -> &MirrorConfig {
		&self.config
	}

	/// Snapshot every entry under `root`
	pub fn list_tree(&self, root: &Path) -> Result<TreeSnapshot, ItemError> {
		tree::list_tree(root, &self.exclusion)
	}

	/// Run one full pass
	pub fn synchronize(&mut self) -> PassReport {
		let started = Instant::now();
		let mut report = PassReport::default();

		debug!(
			"Synchronizing {} -> {}",
			self.config.source.display(),
			self.config.replica.display()
		);

		let source_root = self.config.source.clone();
		let replica_root = self.config.replica.clone();
		let (source, replica) =
			match (self.snapshot(&source_root, &mut report), self.snapshot(&replica_root, &mut report))
			{
				(Some(s), Some(r)) => (s, r),
				_ => return self.finish(report, started),
			};
		debug!("Source has {} entries, replica has {}", source.len(), replica.len());

		if self.should_stop(&mut report) {
			return self.finish(report, started);
		}

		let new = diff::new_items(&source, &replica, self.config.type_conflict_policy);
		self.handle_new_items(&new.ready, &replica.root, &mut report);

		if self.should_stop(&mut report) {
			return self.finish(report, started);
		}

		let stale = diff::stale_items(&source, &replica);
		self.handle_deleted_items(&stale, &replica.root, &mut report);

		if self.should_stop(&mut report) {
			return self.finish(report, started);
		}

		self.handle_type_conflicts(&source, &replica, &new.deferred, &mut report);
		self.handle_modified_items(&source, &replica, &mut report);

		self.finish(report, started)
	}

	fn snapshot(&self, root: &Path, report: &mut PassReport) -> Option<TreeSnapshot> {
		match self.list_tree(root) {
			Ok(snapshot) => Some(snapshot),
			Err(e) => {
				error!("{}; pass skipped", e);
				report.skip_error(SyncPhase::Enumerate, root.display().to_string(), &e);
				None
			}
		}
	}

	fn should_stop(&self, report: &mut PassReport) -> bool {
		if self.shutdown.is_triggered() {
			info!("Shutdown requested, stopping pass early");
			report.cancelled = true;
		}
		report.cancelled
	}

	fn finish(&self, mut report: PassReport, started: Instant) -> PassReport {
		report.duration = started.elapsed();
		if report.actions() > 0 || !report.is_clean() {
			info!("Pass finished: {}", report);
		} else {
			debug!("Pass finished: {}", report);
		}
		report
	}

	/// Record a successful action in the log and the report
	fn applied(&mut self, verb: Verb, rel: &RelPath, replica_root: &Path, report: &mut PassReport) {
		self.log.record(verb, &rel.to_string(), replica_root);
		report.count(verb);
	}

	fn skipped(&self, phase: SyncPhase, rel: &RelPath, err: &ItemError, report: &mut PassReport) {
		warn!("Skipping {}: {}", rel, err);
		report.skip_error(phase, rel.to_string(), err);
	}

	/// Create `item` at `destination` in the replica
	///
	/// Parents are created first, so the result does not depend on the
	/// order in which items arrive.
	fn materialize(item: &Item, destination: &Path) -> Result<Verb, ItemError> {
		match item.kind {
			ItemKind::Dir => {
				item.copy_directory(destination)?;
				Ok(Verb::CreatedDirectory)
			}
			ItemKind::File => {
				item::ensure_parent(destination)?;
				item.copy_file(destination)?;
				Ok(Verb::Copied)
			}
			ItemKind::Other => Err(ItemError::new(
				ItemOp::CopyFile,
				&item.absolute_path,
				io::Error::new(io::ErrorKind::Unsupported, "special files are not mirrored"),
			)),
		}
	}

	fn removal_verb(kind: ItemKind) -> Verb {
		match kind {
			ItemKind::Dir => Verb::DeletedDirectory,
			ItemKind::File | ItemKind::Other => Verb::Deleted,
		}
	}

	//////////////
	// Phase 1  //
	//////////////

	fn handle_new_items(&mut self, items: &[&Item], replica_root: &Path, report: &mut PassReport) {
		for item in items {
			let destination = item.target_under(replica_root);
			match Self::materialize(item, &destination) {
				Ok(verb) => self.applied(verb, &item.relative_path, replica_root, report),
				Err(e) => self.skipped(SyncPhase::NewItems, &item.relative_path, &e, report),
			}
		}
	}

	//////////////
	// Phase 2  //
	//////////////

	fn handle_deleted_items(
		&mut self,
		items: &[&Item],
		replica_root: &Path,
		report: &mut PassReport,
	) {
		// Directories removed this pass; everything below them is already gone
		let mut removed: HashSet<RelPath> = HashSet::new();

		for item in items {
			if item.relative_path.ancestors().any(|a| removed.contains(&a)) {
				continue;
			}

			match item.delete() {
				Ok(()) => {
					let verb = Self::removal_verb(item.kind);
					self.applied(verb, &item.relative_path, replica_root, report);
				}
				Err(e) if e.is_not_found() => {
					debug!("{} already gone", item.relative_path);
				}
				Err(e) => {
					self.skipped(SyncPhase::DeletedItems, &item.relative_path, &e, report);
					continue;
				}
			}

			if item.is_dir() {
				removed.insert(item.relative_path.clone());
			}
		}
	}

	//////////////
	// Phase 3  //
	//////////////

	/// Resolve paths whose kind differs between the trees
	///
	/// `deferred` holds new source items below such paths; they are placed
	/// once the entry above them has been replaced, and skipped otherwise.
	fn handle_type_conflicts(
		&mut self,
		source: &TreeSnapshot,
		replica: &TreeSnapshot,
		deferred: &[&Item],
		report: &mut PassReport,
	) {
		let conflicts = diff::type_conflicts(source, replica);
		let replica_root = replica.root.as_path();
		let mut resolved: HashSet<RelPath> = HashSet::new();

		for (src, rep) in conflicts {
			if self.config.type_conflict_policy == TypeConflictPolicy::Ignore {
				warn!(
					"Type conflict at {}: {} in source, {} in replica; left alone",
					src.relative_path, src.kind, rep.kind
				);
				report.skip(
					SyncPhase::ModifiedItems,
					src.relative_path.to_string(),
					format!("type conflict: {} in source, {} in replica", src.kind, rep.kind),
				);
				continue;
			}

			debug!("Replacing {} {} with {}", rep.kind, rep.relative_path, src.kind);
			match rep.delete() {
				Ok(()) => {
					let verb = Self::removal_verb(rep.kind);
					self.applied(verb, &rep.relative_path, replica_root, report);
				}
				Err(e) if e.is_not_found() => {}
				Err(e) => {
					self.skipped(SyncPhase::ModifiedItems, &rep.relative_path, &e, report);
					continue;
				}
			}

			match Self::materialize(src, &rep.absolute_path) {
				Ok(verb) => {
					self.applied(verb, &src.relative_path, replica_root, report);
					report.replaced += 1;
					resolved.insert(src.relative_path.clone());
				}
				Err(e) => self.skipped(SyncPhase::ModifiedItems, &src.relative_path, &e, report),
			}
		}

		for item in deferred {
			if item.relative_path.ancestors().any(|a| resolved.contains(&a)) {
				let destination = item.target_under(replica_root);
				match Self::materialize(item, &destination) {
					Ok(verb) => self.applied(verb, &item.relative_path, replica_root, report),
					Err(e) => {
						self.skipped(SyncPhase::ModifiedItems, &item.relative_path, &e, report)
					}
				}
			} else {
				warn!("Skipping {}: parent type conflict was not resolved", item.relative_path);
				report.skip(
					SyncPhase::ModifiedItems,
					item.relative_path.to_string(),
					"parent type conflict was not resolved",
				);
			}
		}
	}

	/// Overwrite replica files whose content hash differs from the source
	fn handle_modified_items(
		&mut self,
		source: &TreeSnapshot,
		replica: &TreeSnapshot,
		report: &mut PassReport,
	) {
		let buffer_size = self.config.buffer_size;
		let policy = self.config.hash_failure_policy;

		for (src, rep) in diff::common_files(source, replica) {
			let decision = diff::decide_update(src.hash(buffer_size), rep.hash(buffer_size), policy);

			match decision {
				UpdateDecision::Unchanged => report.unchanged += 1,
				UpdateDecision::Update => match src.copy_file(&rep.absolute_path) {
					Ok(()) => {
						self.applied(Verb::Updated, &src.relative_path, &replica.root, report)
					}
					Err(e) => self.skipped(SyncPhase::ModifiedItems, &src.relative_path, &e, report),
				},
				UpdateDecision::SkipUnreadableSource(e) => {
					self.skipped(SyncPhase::ModifiedItems, &src.relative_path, &e, report)
				}
			}
		}
	}
}


// vim: ts=4
