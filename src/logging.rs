//! Logging prelude module for convenient access to tracing macros.
//!
//! Diagnostics (warnings about skipped items, pass summaries, debug traces)
//! go through `tracing` to stderr. The action log in `action_log` is a
//! separate, user-facing record and does not use this module.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("Pass finished");
//! warn!("Skipped an item");
//! ```

pub use tracing::{debug, error, info, warn};

/// Initialize the tracing subscriber with environment filter support.
///
/// `default_level` applies when `RUST_LOG` is unset:
///
/// ```bash
/// RUST_LOG=debug treemirror src dst -l mirror.log
/// RUST_LOG=treemirror::synchronizer=debug treemirror src dst -l mirror.log
/// ```
pub fn init_tracing(default_level: &str) {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.init();
}

// vim: ts=4
