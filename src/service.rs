//! Query service: request parsing, search orchestration, and response
//! serialization for the line-oriented protocol.

mod request;
mod response;

pub use request::{QueryRequest, ResponseFormat};
pub use response::{DocResult, Equation};

use std::io::{BufRead, Write};
use std::time::Instant;

use ahash::AHashMap;

use crate::error::Result;
use crate::index::search::{Page, Search};
use crate::index::snapshot::Snapshot;
use crate::latex::FlatForest;
use crate::store::{DocumentStore, Preprocessor};

/// Number of fragment matches pulled from the search per page.
const PAGE_SIZE: usize = 64;

/// Serves queries over a loaded snapshot.
///
/// Read-only: each invocation holds its own snapshot and never mutates
/// shared state, so any number of query processes may run concurrently
/// with one reconciler.
pub struct QueryService<'a> {
    snapshot: &'a Snapshot,
    store: &'a dyn DocumentStore,
    preprocessor: &'a dyn Preprocessor,
}

impl<'a> QueryService<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        store: &'a dyn DocumentStore,
        preprocessor: &'a dyn Preprocessor,
    ) -> Self {
        QueryService {
            snapshot,
            store,
            preprocessor,
        }
    }

    /// Line-oriented request loop: one JSON request per input line, one
    /// JSON response per output line, flushed immediately. Errors are
    /// turned into response envelopes; the loop keeps serving.
    pub fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let envelope = self.handle_line(&line);
            serde_json::to_writer(&mut writer, &envelope)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Handle one request line, mapping any failure onto its response
    /// envelope.
    pub fn handle_line(&self, line: &str) -> serde_json::Value {
        let request = match request::parse(line) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("rejecting request: {e}");
                return response::failure(&e);
            }
        };
        match self.run_query(&request) {
            Ok(docs) => response::success(&request.search_term, &docs, request.format),
            Err(e) => {
                log::warn!("query failed: {e}");
                response::failure(&e)
            }
        }
    }

    /// Run one search to materialized, source-resolved document results.
    fn run_query(&self, request: &QueryRequest) -> Result<Vec<DocResult>> {
        let forest = self
            .preprocessor
            .preprocess(&request.search_term, request.preprocessor_timeout)?;
        let target = FlatForest::from_forest(&forest);
        let deadline = Instant::now() + request.search_timeout;

        let mut search = Search::new(&self.snapshot.tree, target);
        log::debug!(
            "searching for {:?} with cutoff {}",
            request.search_term,
            search.cutoff()
        );

        // Group ranked fragment hits into documents in first-seen order.
        let mut order: Vec<(String, Vec<(String, usize)>)> = Vec::new();
        let mut by_doc: AHashMap<String, usize> = AHashMap::new();
        loop {
            let page = search.next_page(PAGE_SIZE, Some(deadline))?;
            let is_last = matches!(page, Page::Last(_));
            for hit in page.matches() {
                let slot = *by_doc.entry(hit.doc_id.clone()).or_insert_with(|| {
                    order.push((hit.doc_id.clone(), Vec::new()));
                    order.len() - 1
                });
                order[slot].1.push((hit.fragment_id.clone(), hit.distance));
            }
            let enough = request.end_at.is_some_and(|end| order.len() >= end);
            if is_last || enough {
                break;
            }
        }

        // Page by document offsets; startAt is 1-based.
        let start = request.start_at.saturating_sub(1).min(order.len());
        let end = request.end_at.unwrap_or(usize::MAX).min(order.len());
        let window = if start < end { &order[start..end] } else { &[] };

        let mut results = Vec::with_capacity(window.len());
        for (doc_id, fragments) in window {
            let stored = self.store.fetch_document(doc_id)?;
            let mut equations = Vec::with_capacity(fragments.len());
            for (fragment_id, distance) in fragments {
                match stored.source.get(fragment_id) {
                    Some(source) => equations.push(Equation {
                        distance: *distance,
                        source: source.clone(),
                    }),
                    None => log::warn!("document {doc_id} has no source for {fragment_id}"),
                }
            }
            results.push(DocResult {
                doc_id: doc_id.clone(),
                equations,
            });
        }
        Ok(results)
    }
}
