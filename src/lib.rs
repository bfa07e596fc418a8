//! # texquery
//!
//! Approximate search over a corpus of LaTeX fragments by edit distance on
//! structured token sequences.
//!
//! ## Features
//!
//! - Structural edit distance between LaTeX token forests, with a
//!   left-anchored variant for matching a query anywhere inside a fragment
//! - BK-tree index over fragment suffixes with incremental adds, logical
//!   deletion and resumable ranked search
//! - Crash-safe snapshot persistence (temp file + rename)
//! - Batch reconciliation against an external document store
//! - Line-oriented query service with XML/JSON responses

mod config;
pub mod distance;
mod error;
pub mod index;
pub mod latex;
pub mod pqueue;
mod reconcile;
pub mod service;
pub mod store;

// Re-exports for the public API
pub use config::Config;
pub use error::{Result, TexQueryError};
pub use index::bktree::{BkTree, IndexNode};
pub use index::search::{Match, Page, Search};
pub use index::snapshot::Snapshot;
pub use latex::{FlatForest, Forest, Token};
pub use reconcile::{BATCH_SIZE, run_update_batch, run_updates};
pub use service::QueryService;
pub use store::{DocUpdate, DocumentStore, Preprocessor, StoredDocument};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
