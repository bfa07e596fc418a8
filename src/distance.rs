//! Edit-distance kernel over flattened LaTeX forests.
//!
//! Three operations, each of cost 1: delete a token from either side (its
//! children become siblings) or rename a token (cost 0 when the labels
//! already match), recursing on children. Because deletion promotes
//! children, every forest reached by the recursion is a preorder suffix of
//! one of the inputs, so the kernel runs as a dynamic program over offset
//! pairs into the two label sequences. The table lives for a single call
//! and is released on return.
//!
//! [`edit_distance`] is the full symmetric variant. [`left_edit_distance`]
//! charges nothing for an unconsumed right remainder: it measures how well
//! the left forest occurs as a prefix of the right one.
//! [`best_suffix_distance`] additionally lets the match start at any suffix
//! of the stored forest, which is the operational distance of the index.
//!
//! The suffix variant is not symmetric and does not satisfy the triangle
//! inequality, while the BK-tree assumes a true metric on stored points.
//! The index treats it as one anyway; search completeness is empirical, not
//! guaranteed. This compromise is deliberate and keeps the index simple.

use crate::latex::{FlatForest, Label};

/// Full edit distance between two forests.
///
/// Symmetric, zero on equal forests, and bounded by the sum of the forest
/// costs.
pub fn edit_distance(left: &FlatForest, right: &FlatForest) -> usize {
    first_row(left.labels(), right.labels(), false)[0]
}

/// Left-anchored edit distance.
///
/// Like [`edit_distance`], except that once the left forest is exhausted
/// the remainder of the right forest is free. All of the left forest must
/// still be accounted for, so the result never exceeds the left forest's
/// cost.
pub fn left_edit_distance(left: &FlatForest, right: &FlatForest) -> usize {
    first_row(left.labels(), right.labels(), true)[0]
}

/// Minimum left-anchored distance between `probe` and any suffix forest of
/// `stored`: how well the probe occurs *anywhere* within the stored
/// fragment. This is the distance the index is built and searched with,
/// always called with the query (or the node being inserted) as `probe`.
pub fn best_suffix_distance(probe: &FlatForest, stored: &FlatForest) -> usize {
    first_row(probe.labels(), stored.labels(), true)
        .into_iter()
        .min()
        .unwrap_or(0)
}

/// Tabulated kernel. Returns the row `d(0, j)` for `0 <= j <= m`, where
/// `d(i, j)` is the distance between the suffix of `left` at offset `i`
/// and the suffix of `right` at offset `j`.
fn first_row(left: &[Label], right: &[Label], left_anchored: bool) -> Vec<usize> {
    let n = left.len();
    let m = right.len();

    // Row for i == n: left exhausted.
    let mut prev: Vec<usize> = if left_anchored {
        vec![0; m + 1]
    } else {
        (0..=m).rev().collect()
    };
    let mut row = vec![0; m + 1];

    for i in (0..n).rev() {
        // Right exhausted: pay for the rest of the left forest.
        row[m] = n - i;
        for j in (0..m).rev() {
            let rename = usize::from(left[i] != right[j]);
            row[j] = (1 + prev[j])
                .min(1 + row[j + 1])
                .min(rename + prev[j + 1]);
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latex::{FlatForest, Token, cost_of_forest};

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    fn command(name: &str, children: Vec<Token>) -> Token {
        Token::Command {
            name: name.to_string(),
            children,
        }
    }

    fn flat(forest: &[Token]) -> FlatForest {
        FlatForest::from_forest(forest)
    }

    #[test]
    fn test_identity_and_positivity() {
        let forests = [
            vec![],
            vec![text("x")],
            vec![command("dot", vec![text("V")]), text("x")],
            vec![command("frac", vec![text("a"), text("b")])],
        ];
        for f in &forests {
            assert_eq!(edit_distance(&flat(f), &flat(f)), 0);
            for g in &forests {
                let d = edit_distance(&flat(f), &flat(g));
                assert!(d <= cost_of_forest(f) + cost_of_forest(g));
            }
        }
    }

    #[test]
    fn test_symmetry() {
        let f = flat(&[command("dot", vec![text("V")]), text("x")]);
        let g = flat(&[text("x"), text("y")]);
        assert_eq!(edit_distance(&f, &g), edit_distance(&g, &f));
    }

    #[test]
    fn test_empty_side_costs_other_forest() {
        let f = flat(&[command("frac", vec![text("a"), text("b")])]);
        let empty = flat(&[]);
        assert_eq!(edit_distance(&f, &empty), 3);
        assert_eq!(edit_distance(&empty, &f), 3);
    }

    #[test]
    fn test_rename_costs_one() {
        let f = flat(&[command("dot", vec![text("V")])]);
        let g = flat(&[command("dot", vec![text("W")])]);
        assert_eq!(edit_distance(&f, &g), 1);
    }

    #[test]
    fn test_delete_promotes_children() {
        // Removing the command wrapper leaves its child in place: one delete.
        let f = flat(&[command("dot", vec![text("V")])]);
        let g = flat(&[text("V")]);
        assert_eq!(edit_distance(&f, &g), 1);
    }

    #[test]
    fn test_left_anchored_ignores_right_remainder() {
        let probe = flat(&[text("a"), text("b")]);
        let stored = flat(&[text("a"), text("b"), text("c"), text("d")]);
        assert_eq!(left_edit_distance(&probe, &stored), 0);
        // The full variant pays for the remainder.
        assert_eq!(edit_distance(&probe, &stored), 2);
    }

    #[test]
    fn test_left_anchored_bounded_by_probe_cost() {
        let probes = [
            vec![text("a"), text("b")],
            vec![command("sum", vec![text("i")])],
        ];
        let stored = [
            vec![],
            vec![text("z")],
            vec![command("int", vec![text("x"), text("y")])],
        ];
        for p in &probes {
            for s in &stored {
                assert!(left_edit_distance(&flat(p), &flat(s)) <= cost_of_forest(p));
                assert!(best_suffix_distance(&flat(p), &flat(s)) <= cost_of_forest(p));
            }
        }
    }

    #[test]
    fn test_best_suffix_matches_interior_occurrence() {
        let probe = flat(&[text("b"), text("c")]);
        let stored = flat(&[text("a"), text("b"), text("c"), text("d")]);
        assert_eq!(best_suffix_distance(&probe, &stored), 0);
        // Left-anchored from the start still pays to delete the leading "a".
        assert_eq!(left_edit_distance(&probe, &stored), 1);
    }

    #[test]
    fn test_best_suffix_equals_min_over_explicit_suffixes() {
        let probe = flat(&[text("b"), command("dot", vec![text("V")])]);
        let stored_forest = vec![
            text("a"),
            command("dot", vec![text("W")]),
            text("b"),
            command("dot", vec![text("V")]),
        ];
        let stored = flat(&stored_forest);
        let explicit_min = (0..stored.suffix_count())
            .map(|i| {
                let suffix = FlatForest::from_labels(stored.labels()[i..].to_vec());
                left_edit_distance(&probe, &suffix)
            })
            .min()
            .unwrap();
        assert_eq!(best_suffix_distance(&probe, &stored), explicit_min);
        assert_eq!(explicit_min, 0);
    }

    #[test]
    fn test_empty_probe_matches_everything() {
        let stored = flat(&[text("a"), text("b")]);
        assert_eq!(best_suffix_distance(&flat(&[]), &stored), 0);
    }
}
