//! BK-tree index over fragment suffix forests.
//!
//! The index stores one node per corpus fragment and measures distance with
//! [`crate::distance::best_suffix_distance`], so a short query can match
//! anywhere inside a longer fragment. Deletion is logical (tombstones);
//! subtrees stay reachable.

pub mod bktree;
pub mod search;
pub mod snapshot;

/// Width of one distance band; pivot-distances below this go into the
/// pivot's in-place bucket.
pub const BUCKET_SIZE: usize = 5;

/// Number of banded children per branch. Child `i < BRANCH_SIZE` covers
/// distances in `[i * BUCKET_SIZE, (i + 1) * BUCKET_SIZE)`; one extra child
/// covers the overflow band beyond that.
pub const BRANCH_SIZE: usize = 20;
