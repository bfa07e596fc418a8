//! External collaborators: the document store and the LaTeX preprocessor.
//!
//! Both sit behind traits so the reconciler and the query service can be
//! exercised against in-memory stubs; the HTTP implementations live in
//! [`http`].

pub mod http;

pub use http::{HttpDocumentStore, HttpPreprocessor};

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::latex::Forest;

/// A document as held by the external store: per-fragment LaTeX sources
/// and the matching preprocessed token forests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Fragment id to raw LaTeX source, preserved bit-exactly.
    #[serde(default)]
    pub source: HashMap<String, String>,
    /// Fragment id to preprocessed token forest.
    #[serde(default)]
    pub content: HashMap<String, Forest>,
}

/// One entry of the document store's change feed.
#[derive(Debug, Clone)]
pub struct DocUpdate {
    pub doc_id: String,
    /// Change-sequence number; strictly increasing across the feed.
    pub seq: u64,
    pub deleted: bool,
    /// The document body; absent for deletions.
    pub doc: Option<StoredDocument>,
}

/// Read access to the external document store.
pub trait DocumentStore {
    /// Fetch up to `limit` updates with sequence number strictly greater
    /// than `seq`, ordered by sequence.
    fn updates_since(&self, seq: u64, limit: usize) -> Result<Vec<DocUpdate>>;

    /// Fetch a single document by id, for source lookup at query time.
    fn fetch_document(&self, doc_id: &str) -> Result<StoredDocument>;
}

/// The external LaTeX normalizer.
pub trait Preprocessor {
    /// Turn a raw LaTeX string into a normalized token forest, giving up
    /// after `timeout`.
    fn preprocess(&self, latex: &str, timeout: Duration) -> Result<Forest>;
}
