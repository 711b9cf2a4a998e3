//! An editable character sequence on a height-balanced rank tree.
//!
//! This crate provides [`SequenceTree`], an indexable, mutable sequence of
//! characters intended as the storage core of a text editor:
//!
//! - [`insert`](SequenceTree::insert) - Insert a character at any position
//! - [`remove`](SequenceTree::remove) - Delete and return the character at a position
//! - [`get`](SequenceTree::get) / [`range`](SequenceTree::range) - Positional reads
//!
//! all in O(log n), plus an O(n) bulk constructor
//! ([`from_text`](SequenceTree::from_text)) and O(1)
//! [`len`](SequenceTree::len).
//!
//! # Example
//!
//! ```
//! use rank_tree::SequenceTree;
//!
//! let mut text = SequenceTree::from_text("haystack");
//!
//! // Positional edits route from the root in O(log n).
//! text.insert('_', 3)?;
//! text.remove(0)?;
//! assert_eq!(text.to_string(), "ay_stack");
//!
//! // Positional reads never scan the sequence.
//! assert_eq!(text.get(2)?, '_');
//! assert_eq!(text.range(3, 5)?, "stack");
//! # Ok::<(), rank_tree::OutOfRange>(())
//! ```
//!
//! # Implementation
//!
//! The tree is an AVL tree augmented with per-node *rank*: the size of the
//! node's left subtree. A position query compares against rank at each node
//! and descends left or right, so no operation ever counts nodes to find
//! "where" a position is. Each node also carries a one-of-three balance code;
//! insertions and deletions restore both the rank and balance invariants with
//! at most one (single or double) rotation per level, updating ranks and
//! codes algebraically from local information. Height stays within the AVL
//! bound of roughly 1.45·log2(n), and the early-stop propagation rule bounds
//! rebalancing to O(1) amortized per visited level.
//!
//! There is no persistence, no concurrency support and no undo log; these
//! belong to the layers above a storage core.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod cursor;
mod node;

pub mod sequence_tree;

pub use node::Balance;
pub use sequence_tree::{Chars, NodeView, OutOfRange, SequenceTree};
