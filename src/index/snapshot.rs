//! Persistent index state.
//!
//! The whole `{last_update_seq, tree}` structure round-trips through one
//! snapshot file. Writes go to a temp file in the same directory, are
//! fsynced, then renamed over the target, so readers always load a
//! consistent snapshot and a crashed writer leaves the previous one
//! intact.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TexQueryError};
use crate::index::bktree::BkTree;

/// The persisted index: reconciliation high-water mark plus the tree.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number of the last successfully applied update.
    pub last_update_seq: u64,
    pub tree: BkTree,
}

impl Snapshot {
    /// A fresh, empty index.
    pub fn empty() -> Self {
        Snapshot::default()
    }

    /// Load a snapshot from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            TexQueryError::persistence(format!("open {}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            TexQueryError::persistence(format!("decode {}: {e}", path.display()))
        })
    }

    /// Atomically write the snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = tempfile::Builder::new()
            .suffix("_tmp")
            .tempfile_in(dir)
            .map_err(|e| TexQueryError::persistence(format!("create temp file: {e}")))?;

        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, self)
            .map_err(|e| TexQueryError::persistence(format!("encode snapshot: {e}")))?;
        writer
            .flush()
            .map_err(|e| TexQueryError::persistence(format!("flush snapshot: {e}")))?;
        drop(writer);
        tmp.as_file()
            .sync_all()
            .map_err(|e| TexQueryError::persistence(format!("sync snapshot: {e}")))?;

        tmp.persist(path).map_err(|e| {
            TexQueryError::persistence(format!("rename into {}: {e}", path.display()))
        })?;
        log::debug!("snapshot saved to {}", path.display());
        Ok(())
    }
}
