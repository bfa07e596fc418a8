//! HTTP/JSON implementations of the store and preprocessor traits.
//!
//! The document store speaks a CouchDB-style API: a paged change feed at
//! `{base}/_all_docs_by_seq` and plain `GET {base}/{doc_id}` for document
//! bodies. The preprocessor accepts `POST {url}` with `{"latex": ...}` and
//! answers `{"tokens": [...]}`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, TexQueryError};
use crate::latex::Forest;
use crate::store::{DocUpdate, DocumentStore, Preprocessor, StoredDocument};

fn upstream(context: &str, err: reqwest::Error) -> TexQueryError {
    if err.is_timeout() {
        TexQueryError::Timeout
    } else {
        TexQueryError::upstream(format!("{context}: {err}"))
    }
}

/// Document store client.
pub struct HttpDocumentStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct ChangeRows {
    rows: Vec<ChangeRow>,
}

#[derive(Debug, Deserialize)]
struct ChangeRow {
    id: String,
    key: u64,
    #[serde(default)]
    value: ChangeValue,
    #[serde(default)]
    doc: Option<StoredDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    deleted: bool,
}

impl HttpDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpDocumentStore {
            base_url: base_url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl DocumentStore for HttpDocumentStore {
    fn updates_since(&self, seq: u64, limit: usize) -> Result<Vec<DocUpdate>> {
        // startkey is inclusive; ask from the first unseen sequence.
        let url = format!(
            "{}/_all_docs_by_seq?startkey={}&limit={limit}&include_docs=true",
            self.base_url,
            seq.saturating_add(1)
        );
        log::debug!("fetching updates: {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| upstream("document store", e))?
            .error_for_status()
            .map_err(|e| upstream("document store", e))?;
        let rows: ChangeRows = response
            .json()
            .map_err(|e| TexQueryError::upstream(format!("change feed decode: {e}")))?;
        Ok(rows
            .rows
            .into_iter()
            .map(|row| DocUpdate {
                doc_id: row.id,
                seq: row.key,
                deleted: row.value.deleted,
                doc: row.doc,
            })
            .collect())
    }

    fn fetch_document(&self, doc_id: &str) -> Result<StoredDocument> {
        let url = format!("{}/{doc_id}", self.base_url);
        self.client
            .get(&url)
            .send()
            .map_err(|e| upstream("document store", e))?
            .error_for_status()
            .map_err(|e| upstream("document store", e))?
            .json()
            .map_err(|e| TexQueryError::upstream(format!("document {doc_id} decode: {e}")))
    }
}

/// Preprocessor client.
pub struct HttpPreprocessor {
    url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct PreprocessResponse {
    tokens: Forest,
}

impl HttpPreprocessor {
    pub fn new(url: impl Into<String>) -> Self {
        HttpPreprocessor {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Preprocessor for HttpPreprocessor {
    fn preprocess(&self, latex: &str, timeout: Duration) -> Result<Forest> {
        let response = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&serde_json::json!({ "latex": latex }))
            .send()
            .map_err(|e| upstream("preprocessor", e))?
            .error_for_status()
            .map_err(|e| upstream("preprocessor", e))?;
        let body: PreprocessResponse = response
            .json()
            .map_err(|e| TexQueryError::upstream(format!("preprocessor decode: {e}")))?;
        Ok(body.tokens)
    }
}
