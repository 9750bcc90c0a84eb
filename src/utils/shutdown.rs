//! Cooperative shutdown for the polling loop
//!
//! A pass in flight is never interrupted mid-item. The synchronizer checks
//! the signal between phases and the scheduler stops waiting for the next
//! tick as soon as it is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Cloneable shutdown flag shared between the scheduler, the running pass
/// and the signal handler
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
	flag: Arc<AtomicBool>,
	notify: Arc<Notify>,
}

impl ShutdownSignal {
	pub fn new() -> Self {
		Self::default()
	}

	/// Request shutdown; idempotent
	pub fn trigger(&self) {
		self.flag.store(true, Ordering::SeqCst);
		self.notify.notify_waiters();
	}

	pub fn is_triggered(&self) -> bool {
		self.flag.load(Ordering::SeqCst)
	}

	/// Resolve once shutdown has been requested
	pub async fn triggered(&self) {
		loop {
			// Register before checking so a trigger in between is not missed
			let notified = self.notify.notified();
			if self.is_triggered() {
				return;
			}
			notified.await;
		}
	}
}

/// Setup signal handlers that raise `shutdown` on SIGINT/SIGTERM
///
/// The current pass finishes its phase and the loop exits instead of the
/// process being killed mid-copy.
pub fn setup_signal_handlers(shutdown: ShutdownSignal) {
	tokio::spawn(async move {
		#[cfg(unix)]
		{
			use tokio::signal;

			let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
				Ok(stream) => stream,
				Err(e) => {
					warn!("Failed to setup SIGTERM handler: {}. Process will not handle SIGTERM gracefully.", e);
					return;
				}
			};

			let mut sigint = match signal::unix::signal(signal::unix::SignalKind::interrupt()) {
				Ok(stream) => stream,
				Err(e) => {
					warn!("Failed to setup SIGINT handler: {}. Process will not handle SIGINT gracefully.", e);
					return;
				}
			};

			tokio::select! {
				_ = sigterm.recv() => debug!("Received SIGTERM, stopping after current phase..."),
				_ = sigint.recv() => debug!("Received SIGINT, stopping after current phase..."),
			}
		}

		#[cfg(not(unix))]
		{
			if let Err(e) = tokio::signal::ctrl_c().await {
				warn!("Failed to setup Ctrl-C handler: {}", e);
				return;
			}
			debug!("Received Ctrl-C, stopping after current phase...");
		}

		shutdown.trigger();
	});
}


// vim: ts=4
