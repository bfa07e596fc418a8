//! Arena-backed BK-tree over integer distances.
//!
//! Branches live in a flat arena and refer to children by index, which
//! keeps the search loop free of pointer chasing and makes the whole tree
//! trivially serializable. Every branch owns a pivot node, a small bucket
//! of nodes whose pivot-distance falls below [`BUCKET_SIZE`], and one child
//! slot per distance band.

use serde::{Deserialize, Serialize};

use crate::distance::best_suffix_distance;
use crate::index::{BRANCH_SIZE, BUCKET_SIZE};
use crate::latex::FlatForest;

/// One indexed corpus fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexNode {
    /// External document id. Opaque; preserved bit-exactly.
    pub doc_id: String,
    /// Fragment id, unique within its document.
    pub fragment_id: String,
    /// Preorder label sequence of the fragment's token forest.
    pub flat: FlatForest,
}

impl IndexNode {
    pub fn new(doc_id: impl Into<String>, fragment_id: impl Into<String>, flat: FlatForest) -> Self {
        IndexNode {
            doc_id: doc_id.into(),
            fragment_id: fragment_id.into(),
            flat,
        }
    }
}

/// A branch of the tree: pivot, tombstone flag, in-place bucket, and one
/// child slot per distance band (the last slot is the overflow band).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Branch {
    pub(crate) pivot: IndexNode,
    pub(crate) tombstone: bool,
    pub(crate) bucket: Vec<IndexNode>,
    pub(crate) children: [Option<u32>; BRANCH_SIZE + 1],
}

impl Branch {
    fn new(pivot: IndexNode) -> Self {
        Branch {
            pivot,
            tombstone: false,
            bucket: Vec::new(),
            children: [None; BRANCH_SIZE + 1],
        }
    }
}

/// BK-tree over fragment nodes.
///
/// Invariant: every node reachable through child slot `i` of a branch has
/// pivot-distance within that slot's band, tombstoned or not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BkTree {
    arena: Vec<Branch>,
    root: Option<u32>,
}

impl BkTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        BkTree::default()
    }

    /// True if the tree holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Total number of stored nodes, tombstoned ones included.
    pub fn node_count(&self) -> usize {
        self.arena
            .iter()
            .map(|branch| 1 + branch.bucket.len())
            .sum()
    }

    pub(crate) fn root(&self) -> Option<u32> {
        self.root
    }

    pub(crate) fn branch(&self, id: u32) -> &Branch {
        &self.arena[id as usize]
    }

    /// Insert a fragment node.
    ///
    /// Descends by distance band from the root; a distance below
    /// [`BUCKET_SIZE`] lands in the current pivot's bucket, anything else
    /// recurses into (or creates) the matching child branch.
    pub fn add(&mut self, node: IndexNode) {
        let Some(mut current) = self.root else {
            self.root = Some(self.alloc(node));
            return;
        };
        loop {
            let pivot = &self.arena[current as usize].pivot;
            let d = best_suffix_distance(&node.flat, &pivot.flat);
            if d < BUCKET_SIZE {
                self.arena[current as usize].bucket.push(node);
                return;
            }
            let band = (d / BUCKET_SIZE).min(BRANCH_SIZE);
            match self.arena[current as usize].children[band] {
                Some(child) => current = child,
                None => {
                    let child = self.alloc(node);
                    self.arena[current as usize].children[band] = Some(child);
                    return;
                }
            }
        }
    }

    /// Logically delete every node belonging to `doc_id`.
    ///
    /// Pivots are tombstoned in place so their subtrees stay reachable;
    /// bucket entries are filtered out. Returns the number of nodes
    /// removed from results.
    pub fn delete_doc(&mut self, doc_id: &str) -> usize {
        let mut removed = 0;
        for branch in &mut self.arena {
            if !branch.tombstone && branch.pivot.doc_id == doc_id {
                branch.tombstone = true;
                removed += 1;
            }
            let before = branch.bucket.len();
            branch.bucket.retain(|node| node.doc_id != doc_id);
            removed += before - branch.bucket.len();
        }
        removed
    }

    fn alloc(&mut self, pivot: IndexNode) -> u32 {
        let id = self.arena.len() as u32;
        self.arena.push(Branch::new(pivot));
        id
    }
}
