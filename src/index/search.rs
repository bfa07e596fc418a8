//! Resumable ranked search over the BK-tree.
//!
//! A [`Search`] carries a frontier of unexplored subtrees, prioritized by a
//! lower bound on the distance of anything inside them, plus two result
//! queues. `min_dist`, the largest lower bound popped so far, only grows,
//! so any candidate below it can never be outranked by a later discovery:
//! those are *confirmed* (`sorted`), the rest are *tentative* (`sorting`)
//! and get promoted whenever `min_dist` catches up. This yields pages in
//! final order without ever resorting.

use std::time::Instant;

use crate::distance::best_suffix_distance;
use crate::error::{Result, TexQueryError};
use crate::index::bktree::BkTree;
use crate::index::{BRANCH_SIZE, BUCKET_SIZE};
use crate::latex::FlatForest;
use crate::pqueue::PQueue;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub doc_id: String,
    pub fragment_id: String,
    pub distance: usize,
}

/// One page of results.
#[derive(Debug)]
pub enum Page {
    /// `k` results; more may follow.
    More(Vec<Match>),
    /// The final results; the search is exhausted.
    Last(Vec<Match>),
}

impl Page {
    /// The matches in this page.
    pub fn matches(&self) -> &[Match] {
        match self {
            Page::More(m) | Page::Last(m) => m,
        }
    }
}

type ResultKey = (String, String);

/// In-flight search state. Created per query, dropped after the last page.
pub struct Search<'t> {
    tree: &'t BkTree,
    target: FlatForest,
    /// Frontier of unexplored subtrees, by lower-bound distance.
    unsearched: PQueue<u32, usize>,
    /// Results below cutoff that an unexplored subtree could still outrank.
    sorting: PQueue<ResultKey, usize>,
    /// Results confirmed to precede anything still to come.
    sorted: PQueue<ResultKey, usize>,
    /// Largest lower bound popped from the frontier. Non-decreasing.
    min_dist: usize,
    cutoff: usize,
}

/// Maximum acceptable distance for a query: a third of its suffix count,
/// plus one. Fixed at search creation.
pub fn cutoff_for(target: &FlatForest) -> usize {
    target.suffix_count() / 3 + 1
}

impl<'t> Search<'t> {
    /// Start a search for `target` over `tree`.
    pub fn new(tree: &'t BkTree, target: FlatForest) -> Self {
        let cutoff = cutoff_for(&target);
        let mut unsearched = PQueue::new();
        if let Some(root) = tree.root() {
            unsearched.add(root, 0);
        }
        Search {
            tree,
            target,
            unsearched,
            sorting: PQueue::new(),
            sorted: PQueue::new(),
            min_dist: 0,
            cutoff,
        }
    }

    /// The distance cutoff this search was created with.
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    /// Produce the next page of up to `k` results in non-decreasing
    /// distance order.
    ///
    /// The deadline, when given, is checked at least once per frontier
    /// pop; exceeding it aborts with [`TexQueryError::Timeout`]. No state
    /// is mutated outside this search, so an abandoned search needs no
    /// cleanup.
    pub fn next_page(&mut self, k: usize, deadline: Option<Instant>) -> Result<Page> {
        loop {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(TexQueryError::Timeout);
            }

            if let Some(items) = self.sorted.split_at_length(k) {
                return Ok(Page::More(into_matches(items)));
            }

            let Some(branch_id) = self.next_search_node() else {
                if self.sorting.is_empty() {
                    let rest = std::mem::take(&mut self.sorted);
                    return Ok(Page::Last(into_matches(rest.into_sorted_vec())));
                }
                // No subtree can outrank them anymore: everything tentative
                // is final.
                let rest = std::mem::take(&mut self.sorting);
                self.sorted.append(rest);
                continue;
            };

            let tree = self.tree;
            let branch = tree.branch(branch_id);
            let pivot_dist = best_suffix_distance(&self.target, &branch.pivot.flat);

            for (band, child) in branch.children.iter().enumerate() {
                let Some(child) = child else { continue };
                let bound = if band < BRANCH_SIZE {
                    pivot_dist.saturating_sub(band * BUCKET_SIZE)
                } else {
                    // No usable lower bound for the overflow band.
                    0
                };
                self.unsearched.add(*child, bound);
            }

            if !branch.tombstone {
                self.insert_result(&branch.pivot.doc_id, &branch.pivot.fragment_id, pivot_dist);
            }
            for entry in &branch.bucket {
                let d = best_suffix_distance(&self.target, &entry.flat);
                self.insert_result(&entry.doc_id, &entry.fragment_id, d);
            }
        }
    }

    /// Pop the next subtree to explore, advancing `min_dist` and promoting
    /// any tentative result it confirms. `None` once the frontier is
    /// exhausted or everything left is beyond the cutoff.
    fn next_search_node(&mut self) -> Option<u32> {
        if self.min_dist > self.cutoff {
            return None;
        }
        let (branch_id, bound) = self.unsearched.pop()?;
        self.min_dist = self.min_dist.max(bound);
        let promoted = self.sorting.split_at_priority(self.min_dist);
        self.sorted.append(promoted);
        Some(branch_id)
    }

    fn insert_result(&mut self, doc_id: &str, fragment_id: &str, d: usize) {
        if d >= self.cutoff {
            return;
        }
        let key = (doc_id.to_string(), fragment_id.to_string());
        if d < self.min_dist {
            self.sorted.add(key, d);
        } else {
            self.sorting.add(key, d);
        }
    }
}

fn into_matches(items: Vec<(ResultKey, usize)>) -> Vec<Match> {
    items
        .into_iter()
        .map(|((doc_id, fragment_id), distance)| Match {
            doc_id,
            fragment_id,
            distance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::bktree::IndexNode;
    use crate::latex::Token;

    fn forest(labels: &[&str]) -> Vec<Token> {
        labels.iter().map(|s| Token::Text(s.to_string())).collect()
    }

    fn node(doc: &str, frag: &str, labels: &[&str]) -> IndexNode {
        IndexNode::new(doc, frag, FlatForest::from_forest(&forest(labels)))
    }

    fn drain(tree: &BkTree, target: FlatForest, k: usize) -> Vec<Match> {
        let mut search = Search::new(tree, target);
        let mut all = Vec::new();
        loop {
            match search.next_page(k, None).unwrap() {
                Page::More(m) => all.extend(m),
                Page::Last(m) => {
                    all.extend(m);
                    return all;
                }
            }
        }
    }

    #[test]
    fn test_empty_tree_yields_last_immediately() {
        let tree = BkTree::new();
        let mut search = Search::new(&tree, FlatForest::from_forest(&forest(&["x"])));
        match search.next_page(10, None).unwrap() {
            Page::Last(m) => assert!(m.is_empty()),
            Page::More(_) => panic!("expected Last"),
        }
    }

    #[test]
    fn test_exact_match_at_distance_zero() {
        let mut tree = BkTree::new();
        tree.add(node("doc", "f", &["x"]));
        let target = FlatForest::from_forest(&forest(&["x"]));
        assert_eq!(cutoff_for(&target), 1);
        let hits = drain(&tree, target, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 0);
        assert_eq!(hits[0].fragment_id, "f");
    }

    #[test]
    fn test_rename_within_cutoff() {
        let mut tree = BkTree::new();
        let dot_v = vec![Token::Command {
            name: "dot".to_string(),
            children: vec![Token::Text("V".to_string())],
        }];
        tree.add(IndexNode::new("doc", "f", FlatForest::from_forest(&dot_v)));

        let dot_w = vec![Token::Command {
            name: "dot".to_string(),
            children: vec![Token::Text("W".to_string())],
        }];
        let target = FlatForest::from_forest(&dot_w);
        assert_eq!(cutoff_for(&target), 2);

        let hits = drain(&tree, target, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 1);
    }

    #[test]
    fn test_tombstoned_nodes_are_skipped() {
        let mut tree = BkTree::new();
        tree.add(node("doc1", "f1", &["x"]));
        tree.add(node("doc2", "f2", &["x"]));
        tree.delete_doc("doc1");

        let hits = drain(&tree, FlatForest::from_forest(&forest(&["x"])), 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "doc2");
    }

    #[test]
    fn test_distances_non_decreasing_across_pages() {
        let mut tree = BkTree::new();
        let base = ["a", "b", "c", "d", "e", "f"];
        for i in 0..base.len() {
            let labels: Vec<&str> = base.iter().take(i + 1).copied().collect();
            tree.add(node("doc", &format!("f{i}"), &labels));
        }
        let hits = drain(&tree, FlatForest::from_forest(&forest(&base)), 2);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_results_match_linear_scan() {
        let mut tree = BkTree::new();
        let corpus: Vec<Vec<&str>> = vec![
            vec!["a"],
            vec!["a", "b"],
            vec!["a", "b", "c"],
            vec!["x", "y", "z"],
            vec!["a", "b", "c", "d", "e"],
            vec!["q"],
        ];
        for (i, labels) in corpus.iter().enumerate() {
            tree.add(node("doc", &format!("f{i}"), labels));
        }
        let target = FlatForest::from_forest(&forest(&["a", "b", "c"]));
        let cutoff = cutoff_for(&target);

        let mut expected: Vec<(String, usize)> = corpus
            .iter()
            .enumerate()
            .map(|(i, labels)| {
                let stored = FlatForest::from_forest(&forest(labels));
                (format!("f{i}"), best_suffix_distance(&target, &stored))
            })
            .filter(|(_, d)| *d < cutoff)
            .collect();
        expected.sort_by_key(|(_, d)| *d);

        let hits = drain(&tree, target, 2);
        let got: Vec<(String, usize)> = hits
            .into_iter()
            .map(|m| (m.fragment_id, m.distance))
            .collect();
        assert_eq!(
            got.iter().map(|(_, d)| *d).collect::<Vec<_>>(),
            expected.iter().map(|(_, d)| *d).collect::<Vec<_>>()
        );
        let got_ids: std::collections::HashSet<_> = got.iter().map(|(f, _)| f.clone()).collect();
        let expected_ids: std::collections::HashSet<_> =
            expected.iter().map(|(f, _)| f.clone()).collect();
        assert_eq!(got_ids, expected_ids);
    }

    #[test]
    fn test_deadline_in_past_times_out() {
        let mut tree = BkTree::new();
        tree.add(node("doc", "f", &["x"]));
        let mut search = Search::new(&tree, FlatForest::from_forest(&forest(&["x"])));
        let past = Instant::now();
        let err = search.next_page(10, Some(past)).unwrap_err();
        assert!(matches!(err, TexQueryError::Timeout));
    }
}
