//! Shared in-memory stubs for the external collaborators.

use std::collections::HashMap;
use std::time::Duration;

use texquery::store::{DocUpdate, DocumentStore, Preprocessor, StoredDocument};
use texquery::{Forest, Result, TexQueryError, Token};

/// In-memory document store with a precomputed change feed.
#[derive(Default)]
pub struct MemoryStore {
    pub docs: HashMap<String, StoredDocument>,
    pub updates: Vec<DocUpdate>,
}

impl MemoryStore {
    /// Register a document and append an upsert to the feed.
    pub fn put(&mut self, doc_id: &str, seq: u64, doc: StoredDocument) {
        self.docs.insert(doc_id.to_string(), doc.clone());
        self.updates.push(DocUpdate {
            doc_id: doc_id.to_string(),
            seq,
            deleted: false,
            doc: Some(doc),
        });
    }

    /// Append a deletion to the feed.
    pub fn delete(&mut self, doc_id: &str, seq: u64) {
        self.docs.remove(doc_id);
        self.updates.push(DocUpdate {
            doc_id: doc_id.to_string(),
            seq,
            deleted: true,
            doc: None,
        });
    }
}

impl DocumentStore for MemoryStore {
    fn updates_since(&self, seq: u64, limit: usize) -> Result<Vec<DocUpdate>> {
        Ok(self
            .updates
            .iter()
            .filter(|u| u.seq > seq)
            .take(limit)
            .cloned()
            .collect())
    }

    fn fetch_document(&self, doc_id: &str) -> Result<StoredDocument> {
        self.docs
            .get(doc_id)
            .cloned()
            .ok_or_else(|| TexQueryError::upstream(format!("no such document: {doc_id}")))
    }
}

/// Preprocessor stub backed by a fixed LaTeX-to-forest mapping.
#[derive(Default)]
pub struct MapPreprocessor {
    pub map: HashMap<String, Forest>,
}

impl MapPreprocessor {
    pub fn with(entries: &[(&str, Forest)]) -> Self {
        MapPreprocessor {
            map: entries
                .iter()
                .map(|(latex, forest)| (latex.to_string(), forest.clone()))
                .collect(),
        }
    }
}

impl Preprocessor for MapPreprocessor {
    fn preprocess(&self, latex: &str, _timeout: Duration) -> Result<Forest> {
        self.map
            .get(latex)
            .cloned()
            .ok_or_else(|| TexQueryError::bad_request(format!("unparseable query: {latex}")))
    }
}

/// A forest of plain text tokens, one per label.
pub fn text_forest(labels: &[&str]) -> Forest {
    labels.iter().map(|s| Token::Text(s.to_string())).collect()
}

/// A document with one fragment per `(fragment_id, labels)` pair; the
/// source string is the labels joined with spaces.
pub fn document(fragments: &[(&str, &[&str])]) -> StoredDocument {
    let mut source = HashMap::new();
    let mut content = HashMap::new();
    for (fragment_id, labels) in fragments {
        source.insert(fragment_id.to_string(), format!("${}$", labels.join(" ")));
        content.insert(fragment_id.to_string(), text_forest(labels));
    }
    StoredDocument { source, content }
}
