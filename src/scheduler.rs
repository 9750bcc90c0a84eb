//! Periodic execution of synchronization passes
//!
//! The first pass starts immediately, then one pass per interval tick. A
//! pass that overruns the interval delays the next tick instead of queueing
//! a burst of catch-up passes. Passes run on the blocking pool since every
//! filesystem call they make is synchronous.

use serde::Serialize;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use crate::error::MirrorError;
use crate::logging::*;
use crate::report::PassReport;
use crate::synchronizer::TreeSynchronizer;
use crate::utils::ShutdownSignal;

/// Totals over every pass of a run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
	pub passes: usize,
	pub actions: usize,
	pub skipped: usize,
}

impl RunSummary {
	fn add(&mut self, report: &PassReport) {
		self.passes += 1;
		self.actions += report.actions();
		self.skipped += report.skipped.len();
	}
}

/// Run one pass on the blocking pool, handing the synchronizer back
pub async fn run_pass(
	mut synchronizer: TreeSynchronizer,
) -> Result<(TreeSynchronizer, PassReport), MirrorError> {
	tokio::task::spawn_blocking(move || {
		let report = synchronizer.synchronize();
		(synchronizer, report)
	})
	.await
	.map_err(|e| MirrorError::PassFailed { message: e.to_string() })
}

/// Run passes every `interval` until shutdown or `max_passes` is reached
///
/// # Arguments
/// * `synchronizer` - Configured synchronizer, moved into each pass
/// * `interval` - Time between the starts of consecutive passes
/// * `shutdown` - Stops the loop; also shared with the running pass
/// * `max_passes` - Upper bound on passes, `None` to run until shutdown
/// * `on_pass` - Called with every finished report
pub async fn run_periodic<F>(
	synchronizer: TreeSynchronizer,
	interval: Duration,
	shutdown: ShutdownSignal,
	max_passes: Option<usize>,
	mut on_pass: F,
) -> Result<RunSummary, MirrorError>
where
	F: FnMut(&PassReport),
{
	let mut summary = RunSummary::default();
	let mut synchronizer = synchronizer.with_shutdown(shutdown.clone());

	let mut ticker = time::interval(interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		if max_passes.is_some_and(|max| summary.passes >= max) {
			break;
		}

		tokio::select! {
			biased;
			_ = shutdown.triggered() => {
				debug!("Shutdown requested while idle");
				break;
			}
			_ = ticker.tick() => {}
		}

		let (returned, report) = run_pass(synchronizer).await?;
		synchronizer = returned;
		summary.add(&report);
		on_pass(&report);

		if report.cancelled {
			break;
		}
	}

	info!(
		"Stopped after {} pass(es): {} action(s), {} skipped",
		summary.passes, summary.actions, summary.skipped
	);
	Ok(summary)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::MirrorConfig;
	use std::fs;
	use tempfile::TempDir;

	fn setup() -> (TempDir, TempDir, TempDir, TreeSynchronizer) {
		let source = TempDir::new().unwrap();
		let replica = TempDir::new().unwrap();
		let logs = TempDir::new().unwrap();
		let config =
			MirrorConfig::new(source.path(), replica.path(), logs.path().join("mirror.log"))
				.with_echo(false);
		let sync = TreeSynchronizer::new(config).unwrap();
		(source, replica, logs, sync)
	}

	#[tokio::test]
	async fn test_bounded_passes() {
		let (source, replica, _logs, sync) = setup();
		fs::write(source.path().join("a.txt"), "A").unwrap();

		let mut reports = Vec::new();
		let summary = run_periodic(
			sync,
			Duration::from_millis(10),
			ShutdownSignal::new(),
			Some(2),
			|r| reports.push(r.actions()),
		)
		.await
		.unwrap();

		assert_eq!(summary.passes, 2);
		assert_eq!(summary.actions, 1);
		assert_eq!(reports, vec![1, 0]);
		assert!(replica.path().join("a.txt").exists());
	}

	#[tokio::test]
	async fn test_shutdown_before_start() {
		let (_source, _replica, _logs, sync) = setup();
		let shutdown = ShutdownSignal::new();
		shutdown.trigger();

		let summary = tokio::time::timeout(
			Duration::from_secs(5),
			run_periodic(sync, Duration::from_secs(3600), shutdown, None, |_| {}),
		)
		.await
		.expect("loop should stop promptly")
		.unwrap();

		assert_eq!(summary.passes, 0);
		assert_eq!(summary.actions, 0);
	}

	#[tokio::test]
	async fn test_shutdown_while_waiting() {
		let (_source, _replica, _logs, sync) = setup();
		let shutdown = ShutdownSignal::new();
		let trigger = shutdown.clone();

		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(50)).await;
			trigger.trigger();
		});

		let summary = tokio::time::timeout(
			Duration::from_secs(5),
			run_periodic(sync, Duration::from_secs(3600), shutdown, None, |_| {}),
		)
		.await
		.expect("loop should stop promptly")
		.unwrap();

		assert_eq!(summary.passes, 1);
	}
}

// vim: ts=4
