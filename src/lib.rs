//! # treemirror - One-way Directory Mirroring
//!
//! treemirror keeps a replica directory identical to a source directory.
//! Each pass enumerates both trees, creates what is missing, removes what
//! is stale and overwrites files whose content hash differs. Every change
//! is appended to a plain-text action log.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use treemirror::{MirrorConfig, TreeSynchronizer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MirrorConfig::new("./source", "./replica", "./mirror.log");
//!     treemirror::validation::validate_roots(&config.source, &config.replica)?;
//!     let mut synchronizer = TreeSynchronizer::new(config)?;
//!     let report = synchronizer.synchronize();
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Periodic Mode
//!
//! ```rust,ignore
//! use treemirror::{scheduler, utils::ShutdownSignal, MirrorConfig, TreeSynchronizer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MirrorConfig::new("./source", "./replica", "./mirror.log")
//!         .with_interval_secs(30);
//!     let interval = config.interval();
//!     let synchronizer = TreeSynchronizer::new(config)?;
//!     scheduler::run_periodic(synchronizer, interval, ShutdownSignal::new(), None, |_| {})
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod action_log;
pub mod config;
pub mod diff;
pub mod error;
pub mod exclusion;
pub mod item;
pub mod logging;
pub mod report;
pub mod scheduler;
pub mod strategies;
pub mod synchronizer;
pub mod tree;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export commonly used types and functions
pub use action_log::{ActionLog, Verb};
pub use config::MirrorConfig;
pub use error::{ItemError, MirrorError};
pub use item::Item;
pub use report::{PassReport, SyncPhase};
pub use scheduler::RunSummary;
pub use strategies::{HashFailurePolicy, TypeConflictPolicy};
pub use synchronizer::TreeSynchronizer;
pub use tree::{list_tree, TreeSnapshot};
pub use types::{ItemKind, RelPath};

// vim: ts=4
