//! Update reconciliation: turn the document store's change feed into
//! index deltas with crash-safe persistence.
//!
//! Each batch re-reads the snapshot the previous batch persisted, so a
//! crash between batches loses at most the in-flight batch and never
//! corrupts the on-disk state. A failed update is logged and skipped; the
//! high-water mark advances only past successfully applied updates.

use std::path::Path;

use crate::error::{Result, TexQueryError};
use crate::index::bktree::{BkTree, IndexNode};
use crate::index::snapshot::Snapshot;
use crate::latex::FlatForest;
use crate::store::{DocUpdate, DocumentStore};

/// Maximum number of updates pulled per batch. Bounds the memory spike of
/// an unbounded backlog.
pub const BATCH_SIZE: usize = 100;

/// Pull and apply one batch of updates on top of the snapshot at `path`,
/// persist the result atomically, and reload it from disk.
pub fn run_update_batch(store: &dyn DocumentStore, path: &Path) -> Result<Snapshot> {
    let mut snapshot = Snapshot::load(path)?;
    let since = snapshot.last_update_seq;
    let updates = store.updates_since(since, BATCH_SIZE)?;
    log::info!("applying {} updates after seq {since}", updates.len());

    for update in updates {
        if update.seq <= since {
            log::warn!(
                "stale update for {} (seq {} <= {since}), skipping",
                update.doc_id,
                update.seq
            );
            continue;
        }
        match apply_update(&mut snapshot.tree, &update) {
            Ok(()) => snapshot.last_update_seq = update.seq,
            Err(e) => log::warn!("skipping update {} for {}: {e}", update.seq, update.doc_id),
        }
    }

    snapshot.save(path)?;
    Snapshot::load(path)
}

/// Run batches until the high-water mark stops advancing.
pub fn run_updates(store: &dyn DocumentStore, path: &Path) -> Result<u64> {
    let mut last = Snapshot::load(path)?.last_update_seq;
    loop {
        let snapshot = run_update_batch(store, path)?;
        if snapshot.last_update_seq == last {
            log::info!("index up to date at seq {last}");
            return Ok(last);
        }
        last = snapshot.last_update_seq;
    }
}

fn apply_update(tree: &mut BkTree, update: &DocUpdate) -> Result<()> {
    // Any previous incarnation of the document goes first, whether this
    // is a delete or a replacement.
    tree.delete_doc(&update.doc_id);
    if update.deleted {
        return Ok(());
    }

    let doc = update.doc.as_ref().ok_or_else(|| {
        TexQueryError::upstream(format!("update {} carries no document body", update.seq))
    })?;
    for (fragment_id, forest) in &doc.content {
        let node = IndexNode::new(
            update.doc_id.clone(),
            fragment_id.clone(),
            FlatForest::from_forest(forest),
        );
        tree.add(node);
    }
    Ok(())
}
