//! Token and forest model for preprocessed LaTeX fragments.
//!
//! A fragment arrives from the preprocessor as a *forest*: an ordered
//! sequence of tokens, where each token is either plain text or a command
//! with its own child forest. The model is immutable once built.
//!
//! For distance computation the tree structure is flattened: deleting a
//! token promotes its children to siblings, so every forest reachable by
//! the edit recursion is a suffix of the preorder label sequence. A
//! [`FlatForest`] is that sequence, and a "suffix forest" is just an offset
//! into it.
//!
//! ## JSON format
//!
//! A token serializes either as a bare string (`"x"`) or as an object
//! (`{"command": "dot", "children": ["V"]}`). A forest is a JSON array of
//! tokens.

use serde::{Deserialize, Serialize};

/// A single preprocessed LaTeX element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    /// A literal text element (symbol, identifier, number).
    Text(String),

    /// A command with an ordered forest of arguments.
    Command {
        #[serde(rename = "command")]
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Token>,
    },
}

/// An ordered sequence of tokens. Equality is structural.
pub type Forest = Vec<Token>;

impl Token {
    /// Cost of a token: 1 for text, 1 plus the cost of the children for a
    /// command.
    pub fn cost(&self) -> usize {
        match self {
            Token::Text(_) => 1,
            Token::Command { children, .. } => 1 + cost_of_forest(children),
        }
    }
}

/// Sum of the token costs of a forest.
pub fn cost_of_forest(forest: &[Token]) -> usize {
    forest.iter().map(Token::cost).sum()
}

/// The label of one node in a flattened forest.
///
/// Text and command nodes never compare equal, even with identical spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Text(String),
    Command(String),
}

/// A forest flattened to its preorder label sequence.
///
/// `suffix(i)` for `0 <= i <= len` denotes the forest obtained by deleting
/// the first `i` tokens in preorder (children promoted at each step), so a
/// flat forest of `n` labels has `n + 1` suffixes, the last one empty.
/// `cost_of_forest` of the suffix at offset `i` is `len - i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatForest(Vec<Label>);

impl FlatForest {
    /// Flatten a forest into its preorder label sequence.
    pub fn from_forest(forest: &[Token]) -> Self {
        let mut labels = Vec::with_capacity(cost_of_forest(forest));
        flatten_into(forest, &mut labels);
        FlatForest(labels)
    }

    /// Build directly from a preorder label sequence.
    pub fn from_labels(labels: Vec<Label>) -> Self {
        FlatForest(labels)
    }

    /// Number of nodes (equals the forest cost).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty forest.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of suffix forests, including the forest itself and the empty
    /// suffix.
    pub fn suffix_count(&self) -> usize {
        self.0.len() + 1
    }

    /// The preorder labels.
    pub fn labels(&self) -> &[Label] {
        &self.0
    }
}

fn flatten_into(forest: &[Token], out: &mut Vec<Label>) {
    for token in forest {
        match token {
            Token::Text(s) => out.push(Label::Text(s.clone())),
            Token::Command { name, children } => {
                out.push(Label::Command(name.clone()));
                flatten_into(children, out);
            }
        }
    }
}
