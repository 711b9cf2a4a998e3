use core::fmt;
use core::iter::FusedIterator;

use thiserror::Error;

use crate::cursor::RebalanceCursor;
use crate::node::{self, Balance, Link, Node};

/// A position argument violated its documented bound.
///
/// Raised at the facade boundary before any structural change begins, so a
/// failed call always leaves the tree exactly as it was. `len` reports the
/// sequence length at the time of the call.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("position {pos} out of range for sequence of length {len}")]
pub struct OutOfRange {
    /// The offending position.
    pub pos: usize,
    /// The sequence length the position was checked against.
    pub len: usize,
}

/// An indexable, editable sequence of characters backed by a height-balanced,
/// rank-augmented binary tree.
///
/// Every node stores the size of its left subtree (its *rank*) and a balance
/// code, so positional lookups, insertions and removals all route directly
/// from the root to the target in O(log n) and rebalance with at most O(1)
/// work per level. This makes the structure a suitable storage core for a
/// text editor, where `Vec`-like sequences pay O(n) per edit.
///
/// # Examples
///
/// ```
/// use rank_tree::SequenceTree;
///
/// let mut text = SequenceTree::from_text("hello world");
/// text.remove(5)?;
/// text.insert('_', 5)?;
/// assert_eq!(text.to_string(), "hello_world");
/// assert_eq!(text.get(5)?, '_');
/// assert_eq!(text.range(6, 5)?, "world");
/// # Ok::<(), rank_tree::OutOfRange>(())
/// ```
///
/// # Invariants
///
/// After every completed operation, each node's rank equals the size of its
/// left subtree, and each node's balance code equals the sign of the height
/// difference of its subtrees, which never exceeds one (the AVL property).
/// The O(n) predicates [`ranks_match_left_subtree_size`] and
/// [`balance_codes_are_correct`] verify both from scratch and exist for tests
/// and debugging only.
///
/// [`ranks_match_left_subtree_size`]: SequenceTree::ranks_match_left_subtree_size
/// [`balance_codes_are_correct`]: SequenceTree::balance_codes_are_correct
#[derive(Debug)]
pub struct SequenceTree {
    root: Link,
    /// Node count, maintained incrementally; always equals `slow_size()`.
    size: usize,
    /// Per-operation rebalancing context, re-armed by every mutating call.
    cursor: RebalanceCursor,
}

impl SequenceTree {
    /// Makes a new, empty sequence.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let tree = SequenceTree::new();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.to_string(), "");
    /// ```
    #[must_use]
    pub const fn new() -> SequenceTree {
        SequenceTree {
            root: None,
            size: 0,
            cursor: RebalanceCursor::new(),
        }
    }

    /// Builds the sequence whose `to_string` is `text`.
    ///
    /// The tree is built by median splits, so the result is balanced and the
    /// build runs in O(n) — repeated [`push`](SequenceTree::push) calls would
    /// be O(n log n).
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let tree = SequenceTree::from_text("abcdef");
    /// assert_eq!(tree.to_string(), "abcdef");
    /// assert!(tree.balance_codes_are_correct());
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> SequenceTree {
        let chars: Vec<char> = text.chars().collect();
        SequenceTree {
            root: Node::from_chars(&chars),
            size: chars.len(),
            cursor: RebalanceCursor::new(),
        }
    }

    /// Returns the number of characters in the sequence.
    ///
    /// # Complexity
    ///
    /// O(1) — the count is maintained incrementally.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the sequence contains no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Appends `ch` at the end of the sequence.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let mut tree = SequenceTree::new();
    /// for ch in "abc".chars() {
    ///     tree.push(ch);
    /// }
    /// assert_eq!(tree.to_string(), "abc");
    /// ```
    pub fn push(&mut self, ch: char) {
        self.cursor.arm();
        self.root = Some(Node::insert_at(self.root.take(), ch, self.size, &mut self.cursor));
        self.size += 1;
    }

    /// Inserts `ch` so that it ends up at in-order position `pos`.
    ///
    /// Valid positions range from `0` to `len()` inclusive; inserting at
    /// `len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `pos > len()`, leaving the tree unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let mut tree = SequenceTree::from_text("ac");
    /// tree.insert('b', 1)?;
    /// assert_eq!(tree.to_string(), "abc");
    /// assert!(tree.insert('x', 4).is_err());
    /// # Ok::<(), rank_tree::OutOfRange>(())
    /// ```
    pub fn insert(&mut self, ch: char, pos: usize) -> Result<(), OutOfRange> {
        if pos > self.size {
            return Err(OutOfRange { pos, len: self.size });
        }
        self.cursor.arm();
        self.root = Some(Node::insert_at(self.root.take(), ch, pos, &mut self.cursor));
        self.size += 1;
        Ok(())
    }

    /// Removes and returns the character at in-order position `pos`.
    ///
    /// Valid positions range from `0` to `len()` exclusive — there is no
    /// character at `len()`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `pos >= len()`, leaving the tree unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let mut tree = SequenceTree::from_text("abc");
    /// assert_eq!(tree.remove(1)?, 'b');
    /// assert_eq!(tree.to_string(), "ac");
    /// # Ok::<(), rank_tree::OutOfRange>(())
    /// ```
    pub fn remove(&mut self, pos: usize) -> Result<char, OutOfRange> {
        if pos >= self.size {
            return Err(OutOfRange { pos, len: self.size });
        }
        let root = self.root.take().expect("non-zero size with an empty root");
        self.cursor.arm();
        let (rest, removed) = Node::remove_at(root, pos, &mut self.cursor);
        self.root = rest;
        self.size -= 1;
        Ok(removed)
    }

    /// Returns the character at in-order position `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `pos >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get(&self, pos: usize) -> Result<char, OutOfRange> {
        if pos >= self.size {
            return Err(OutOfRange { pos, len: self.size });
        }
        Ok(self.root.as_ref().expect("non-zero size with an empty root").char_at(pos))
    }

    /// Returns the substring of `len` characters starting at position `pos`.
    ///
    /// Only subtrees overlapping `[pos, pos + len)` are visited, so the cost
    /// is O(len + log n) rather than a full traversal. A zero-length range is
    /// valid at any `pos <= len()` and yields the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `pos + len > self.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let tree = SequenceTree::from_text("rank trees route by rank");
    /// assert_eq!(tree.range(5, 5)?, "trees");
    /// assert_eq!(tree.range(24, 0)?, "");
    /// assert!(tree.range(20, 5).is_err());
    /// # Ok::<(), rank_tree::OutOfRange>(())
    /// ```
    pub fn range(&self, pos: usize, len: usize) -> Result<String, OutOfRange> {
        let end = pos
            .checked_add(len)
            .filter(|&end| end <= self.size)
            .ok_or(OutOfRange { pos, len: self.size })?;
        let mut out = String::with_capacity(len);
        if len > 0 {
            self.root
                .as_ref()
                .expect("non-empty range admitted on an empty root")
                .collect_range(pos, end, &mut out);
        }
        Ok(out)
    }

    /// Gets a forward iterator over the characters, in order.
    ///
    /// # Complexity
    ///
    /// O(log n) to create; O(1) amortized per step.
    ///
    /// # Examples
    ///
    /// ```
    /// use rank_tree::SequenceTree;
    ///
    /// let tree = SequenceTree::from_text("abc");
    /// let upper: String = tree.chars().map(|ch| ch.to_ascii_uppercase()).collect();
    /// assert_eq!(upper, "ABC");
    /// ```
    #[must_use]
    pub fn chars(&self) -> Chars<'_> {
        let mut iter = Chars {
            stack: Vec::new(),
            remaining: self.size,
        };
        iter.push_left_spine(&self.root);
        iter
    }

    /// Total number of rotations performed since this tree was created.
    ///
    /// A double rotation counts as two. Purely observational: the balancing
    /// algorithm never reads this.
    #[must_use]
    pub fn rotation_count(&self) -> u64 {
        self.cursor.rotations()
    }

    // ─── Diagnostic views ───────────────────────────────────────────────────

    /// Pre-order `value+rank` rendering, e.g. `"[b1, a0, c0]"` for the tree
    /// with root `b` and children `a` and `c`.
    #[must_use]
    pub fn to_rank_string(&self) -> String {
        let mut entries = Vec::new();
        if let Some(root) = &self.root {
            root.push_rank_entries(&mut entries);
        }
        format!("[{}]", entries.join(", "))
    }

    /// Pre-order `value+rank+balance` rendering, e.g. `"[b1/, a0=]"` for the
    /// tree with root `b` and a left child `a`.
    #[must_use]
    pub fn to_debug_string(&self) -> String {
        let mut entries = Vec::new();
        if let Some(root) = &self.root {
            root.push_debug_entries(&mut entries);
        }
        format!("[{}]", entries.join(", "))
    }

    /// Read-only view of the root node, for external tree renderers.
    ///
    /// The view exposes value, rank, balance code and children, and cannot
    /// mutate the tree.
    #[must_use]
    pub fn root_view(&self) -> Option<NodeView<'_>> {
        self.root.as_deref().map(|node| NodeView { node })
    }

    // ─── Verification surfaces ──────────────────────────────────────────────
    //
    // O(n) reference computations used to validate the fast paths in tests.

    /// True iff every node's rank equals the recounted size of its left
    /// subtree.
    #[must_use]
    pub fn ranks_match_left_subtree_size(&self) -> bool {
        node::ranks_match_left_subtree_size(&self.root)
    }

    /// True iff every node's balance code matches the recomputed height
    /// difference of its subtrees, within the AVL bound.
    #[must_use]
    pub fn balance_codes_are_correct(&self) -> bool {
        node::balance_codes_are_correct(&self.root)
    }

    /// Height in O(log n), trusting balance codes. The empty tree has height
    /// −1.
    #[must_use]
    pub fn fast_height(&self) -> i32 {
        node::fast_height(&self.root)
    }

    /// Height by full O(n) traversal, for validating `fast_height`.
    #[must_use]
    pub fn slow_height(&self) -> i32 {
        node::slow_height(&self.root)
    }

    /// Node count by full O(n) traversal, for validating `len`.
    #[must_use]
    pub fn slow_size(&self) -> usize {
        node::slow_size(&self.root)
    }
}

impl Default for SequenceTree {
    fn default() -> SequenceTree {
        SequenceTree::new()
    }
}

impl Clone for SequenceTree {
    /// Deep copy: all new nodes with the same shape, values, ranks and
    /// balance codes. The copy shares nothing with the source and starts with
    /// a rotation count of zero.
    fn clone(&self) -> SequenceTree {
        SequenceTree {
            root: self.root.clone(),
            size: self.size,
            cursor: RebalanceCursor::new(),
        }
    }
}

impl fmt::Display for SequenceTree {
    /// In-order concatenation of all characters.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => root.write_inorder(f),
            None => Ok(()),
        }
    }
}

impl From<char> for SequenceTree {
    /// Single-character sequence.
    fn from(ch: char) -> SequenceTree {
        let mut tree = SequenceTree::new();
        tree.push(ch);
        tree
    }
}

impl From<&str> for SequenceTree {
    fn from(text: &str) -> SequenceTree {
        SequenceTree::from_text(text)
    }
}

impl FromIterator<char> for SequenceTree {
    /// Bulk O(n) build, like [`SequenceTree::from_text`].
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> SequenceTree {
        let chars: Vec<char> = iter.into_iter().collect();
        SequenceTree {
            root: Node::from_chars(&chars),
            size: chars.len(),
            cursor: RebalanceCursor::new(),
        }
    }
}

/// An iterator over the characters of a [`SequenceTree`], in order.
///
/// Created by [`SequenceTree::chars`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Chars<'a> {
    /// Nodes whose value has not been yielded, each above the left spine of
    /// the next pending subtree.
    stack: Vec<&'a Node>,
    remaining: usize,
}

impl<'a> Chars<'a> {
    fn push_left_spine(&mut self, mut link: &'a Link) {
        while let Some(node) = link {
            self.stack.push(node);
            link = &node.left;
        }
    }
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let node = self.stack.pop()?;
        self.remaining -= 1;
        let right = &node.right;
        let value = node.value;
        self.push_left_spine(right);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Chars<'_> {}
impl FusedIterator for Chars<'_> {}

/// A read-only view of one tree node, for external renderers and debuggers.
///
/// Exposes exactly what a visualizer needs — value, rank, balance code and
/// children — without any way to mutate the tree.
///
/// # Examples
///
/// ```
/// use rank_tree::SequenceTree;
///
/// let mut tree = SequenceTree::new();
/// for ch in "abc".chars() {
///     tree.push(ch);
/// }
/// let root = tree.root_view().unwrap();
/// assert_eq!(root.value(), 'b');
/// assert_eq!(root.rank(), 1);
/// assert_eq!(root.left().unwrap().value(), 'a');
/// ```
#[derive(Clone, Copy)]
pub struct NodeView<'a> {
    node: &'a Node,
}

impl<'a> NodeView<'a> {
    /// The character stored at this node.
    #[must_use]
    pub fn value(&self) -> char {
        self.node.value
    }

    /// The size of this node's left subtree.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.node.rank
    }

    /// This node's balance code.
    #[must_use]
    pub fn balance(&self) -> Balance {
        self.node.balance
    }

    /// The left child, if any.
    #[must_use]
    pub fn left(&self) -> Option<NodeView<'a>> {
        self.node.left.as_deref().map(|node| NodeView { node })
    }

    /// The right child, if any.
    #[must_use]
    pub fn right(&self) -> Option<NodeView<'a>> {
        self.node.right.as_deref().map(|node| NodeView { node })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sequential_appends_trigger_exactly_one_rotation() {
        let mut tree = SequenceTree::new();
        tree.push('a');
        tree.push('b');
        assert_eq!(tree.rotation_count(), 0);
        tree.push('c');
        assert_eq!(tree.rotation_count(), 1);
        assert_eq!(tree.to_rank_string(), "[b1, a0, c0]");
        assert_eq!(tree.to_debug_string(), "[b1=, a0=, c0=]");
    }

    #[test]
    fn debug_string_shows_balance_glyphs() {
        let mut tree = SequenceTree::from('b');
        tree.insert('a', 0).unwrap();
        assert_eq!(tree.to_debug_string(), "[b1/, a0=]");
    }

    #[test]
    fn empty_tree_renders_empty_brackets() {
        let tree = SequenceTree::new();
        assert_eq!(tree.to_string(), "");
        assert_eq!(tree.to_rank_string(), "[]");
        assert_eq!(tree.to_debug_string(), "[]");
        assert_eq!(tree.fast_height(), -1);
        assert_eq!(tree.slow_height(), -1);
    }

    #[test]
    fn bounds_violations_leave_the_tree_unchanged() {
        let mut tree = SequenceTree::from_text("abc");
        let before = tree.to_debug_string();

        assert_eq!(tree.insert('x', 4), Err(OutOfRange { pos: 4, len: 3 }));
        assert_eq!(tree.remove(3), Err(OutOfRange { pos: 3, len: 3 }));
        assert_eq!(tree.get(3), Err(OutOfRange { pos: 3, len: 3 }));
        assert_eq!(tree.range(2, 2), Err(OutOfRange { pos: 2, len: 3 }));

        assert_eq!(tree.to_debug_string(), before);
        assert_eq!(tree.len(), 3);

        let mut empty = SequenceTree::new();
        assert!(empty.remove(0).is_err());
        assert!(empty.get(0).is_err());
        assert!(empty.insert('a', 1).is_err());
    }

    #[test]
    fn remove_uses_the_predecessor_for_two_child_nodes() {
        // Root b with children a and c; removing b promotes the rightmost
        // node of the left subtree.
        let mut tree = SequenceTree::new();
        for ch in "abc".chars() {
            tree.push(ch);
        }
        assert_eq!(tree.remove(1).unwrap(), 'b');
        assert_eq!(tree.to_string(), "ac");
        assert_eq!(tree.to_debug_string(), "[a0\\, c0=]");
        assert!(tree.ranks_match_left_subtree_size());
        assert!(tree.balance_codes_are_correct());
    }

    #[test]
    fn range_reads_interior_substrings() {
        let tree = SequenceTree::from_text("0123456789");
        assert_eq!(tree.range(0, 10).unwrap(), "0123456789");
        assert_eq!(tree.range(3, 4).unwrap(), "3456");
        assert_eq!(tree.range(9, 1).unwrap(), "9");
        assert_eq!(tree.range(10, 0).unwrap(), "");
    }

    #[test]
    fn clone_is_disjoint() {
        let source = SequenceTree::from_text("abcdefg");
        let mut copy = source.clone();
        assert_eq!(copy.to_debug_string(), source.to_debug_string());
        assert_eq!(copy.rotation_count(), 0);

        copy.remove(0).unwrap();
        copy.insert('z', 3).unwrap();
        assert_eq!(source.to_string(), "abcdefg");
        assert_eq!(copy.to_string(), "bcdzefg");
    }

    #[test]
    fn chars_iterates_in_order() {
        let tree = SequenceTree::from_text("editable");
        assert_eq!(tree.chars().count(), 8);
        let collected: String = tree.chars().collect();
        assert_eq!(collected, "editable");
        assert_eq!(tree.chars().size_hint(), (8, Some(8)));
    }

    #[test]
    fn node_views_expose_structure_read_only() {
        let mut tree = SequenceTree::new();
        for ch in "abc".chars() {
            tree.push(ch);
        }
        let root = tree.root_view().unwrap();
        assert_eq!(root.value(), 'b');
        assert_eq!(root.rank(), 1);
        assert_eq!(root.balance(), Balance::Same);
        assert_eq!(root.left().unwrap().value(), 'a');
        assert_eq!(root.right().unwrap().value(), 'c');
        assert!(root.left().unwrap().left().is_none());
    }

    #[test]
    fn out_of_range_formats_both_fields() {
        let err = OutOfRange { pos: 7, len: 3 };
        assert_eq!(err.to_string(), "position 7 out of range for sequence of length 3");
    }
}
