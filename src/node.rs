use core::cmp::Ordering;
use core::fmt;

use crate::cursor::RebalanceCursor;

/// An owned, possibly empty subtree. `None` is the empty subtree; it never
/// holds data and is never mutated.
pub(crate) type Link = Option<Box<Node>>;

/// Which side of a node is taller, if either.
///
/// Every node carries one of these codes, and after every completed mutation
/// the code equals the sign of `height(right) - height(left)`. The `Display`
/// glyphs (`/`, `=`, `\`) appear in [`SequenceTree::to_debug_string`] and are
/// the form an external visualizer is expected to render.
///
/// [`SequenceTree::to_debug_string`]: crate::SequenceTree::to_debug_string
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Balance {
    /// The left subtree is one level taller.
    Left,
    /// Both subtrees have the same height.
    Same,
    /// The right subtree is one level taller.
    Right,
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Balance::Left => "/",
            Balance::Same => "=",
            Balance::Right => "\\",
        })
    }
}

/// One character and the subtree rooted at it.
///
/// `rank` is the number of nodes in the left subtree, which routes positional
/// queries without counting; `balance` tracks the height difference of the two
/// subtrees within the AVL bound. Both are maintained algebraically by the
/// rotations; nothing on the mutation path ever re-scans a subtree.
///
/// A node belongs to exactly one tree. There are no parent pointers: every
/// structural change is an owner-transferring rebuild where each recursive
/// call returns the (possibly rotated) root of its subtree.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) value: char,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) rank: usize,
    pub(crate) balance: Balance,
}

impl Node {
    pub(crate) fn leaf(value: char) -> Node {
        Node {
            value,
            left: None,
            right: None,
            rank: 0,
            balance: Balance::Same,
        }
    }

    /// Inserts `ch` at in-order position `pos` of this subtree and returns its
    /// new root. The cursor must be armed by the top-level caller; it stays
    /// armed while the subtree's height change still has to be reported
    /// upward, and rebalancing stops the first time a node absorbs the change
    /// or rotates.
    pub(crate) fn insert_at(link: Link, ch: char, pos: usize, cursor: &mut RebalanceCursor) -> Box<Node> {
        let Some(mut node) = link else {
            // The new leaf raises its (previously empty) subtree by one level;
            // the armed cursor tells the parent to update its balance code.
            return Box::new(Node::leaf(ch));
        };
        if pos > node.rank {
            let shifted = pos - node.rank - 1;
            node.right = Some(Self::insert_at(node.right.take(), ch, shifted, cursor));
            Self::settle_right_growth(node, cursor)
        } else {
            // Inserting at `pos == rank` lands in the left subtree, directly
            // before this node. Either way the left subtree gains a node.
            node.rank += 1;
            node.left = Some(Self::insert_at(node.left.take(), ch, pos, cursor));
            Self::settle_left_growth(node, cursor)
        }
    }

    /// Removes the character at in-order position `pos` of this subtree.
    /// Returns the remaining subtree and the removed character.
    pub(crate) fn remove_at(mut node: Box<Node>, pos: usize, cursor: &mut RebalanceCursor) -> (Link, char) {
        if pos < node.rank {
            let left = node.left.take().expect("rank admits a position with no left child");
            let (rest, removed) = Self::remove_at(left, pos, cursor);
            node.left = rest;
            node.rank -= 1;
            (Some(Self::settle_left_shrink(node, cursor)), removed)
        } else if pos > node.rank {
            let right = node.right.take().expect("in-range position with no right child");
            let (rest, removed) = Self::remove_at(right, pos - node.rank - 1, cursor);
            node.right = rest;
            (Some(Self::settle_right_shrink(node, cursor)), removed)
        } else {
            match (node.left.take(), node.right.take()) {
                // A leaf or one-child node is spliced out directly. The
                // subtree is now one level shorter, so the cursor stays armed
                // for the ancestors.
                (None, None) => (None, node.value),
                (Some(child), None) | (None, Some(child)) => (Some(child), node.value),
                (Some(left), Some(right)) => {
                    // Two children: splice out the in-order predecessor (the
                    // rightmost node of the left subtree, local position
                    // `rank - 1`) and take over its value in place. The left
                    // subtree lost one node, so rank drops by one and the
                    // usual left-shrink adjustment applies.
                    let (rest, predecessor) = Self::remove_at(left, node.rank - 1, cursor);
                    let removed = node.value;
                    node.value = predecessor;
                    node.left = rest;
                    node.right = Some(right);
                    node.rank -= 1;
                    (Some(Self::settle_left_shrink(node, cursor)), removed)
                }
            }
        }
    }

    /// Returns the character at in-order position `pos`.
    ///
    /// The facade bounds-checks every position before recursing, so an empty
    /// subtree is unreachable here; hitting one is an invariant violation and
    /// panics.
    pub(crate) fn char_at(&self, pos: usize) -> char {
        match pos.cmp(&self.rank) {
            Ordering::Less => self
                .left
                .as_ref()
                .expect("rank admits a position with no left child")
                .char_at(pos),
            Ordering::Greater => self
                .right
                .as_ref()
                .expect("in-range position with no right child")
                .char_at(pos - self.rank - 1),
            Ordering::Equal => self.value,
        }
    }

    /// Appends the characters of local positions `[start, end)` to `out`,
    /// recursing only into subtrees that overlap the range. The caller
    /// guarantees `start < end <= size(self)`.
    pub(crate) fn collect_range(&self, start: usize, end: usize, out: &mut String) {
        if start < self.rank {
            let left = self.left.as_ref().expect("rank admits a position with no left child");
            left.collect_range(start, end.min(self.rank), out);
        }
        if start <= self.rank && self.rank < end {
            out.push(self.value);
        }
        if end > self.rank + 1 {
            let right = self.right.as_ref().expect("in-range position with no right child");
            let shift = self.rank + 1;
            right.collect_range(start.saturating_sub(shift), end - shift, out);
        }
    }

    /// Builds a subtree from a run of characters in O(n) by rooting it at the
    /// median and recursing on the halves. Ranks fall out of the split index;
    /// balance codes come from [`split_balance`].
    pub(crate) fn from_chars(chars: &[char]) -> Link {
        if chars.is_empty() {
            return None;
        }
        let mid = chars.len() / 2;
        Some(Box::new(Node {
            value: chars[mid],
            rank: mid,
            balance: split_balance(mid, chars.len() - mid - 1),
            left: Self::from_chars(&chars[..mid]),
            right: Self::from_chars(&chars[mid + 1..]),
        }))
    }

    // ─── Growth adjustment (insertion) ──────────────────────────────────────

    /// Updates this node after its left subtree grew one level. Absorbing the
    /// growth into `Same` stops propagation; tipping past `Left` triggers the
    /// one rotation that restores the subtree to its pre-insertion height,
    /// which also stops propagation.
    fn settle_left_growth(mut node: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        if !cursor.is_armed() {
            return node;
        }
        match node.balance {
            Balance::Right => {
                node.balance = Balance::Same;
                cursor.stop();
                node
            }
            Balance::Same => {
                node.balance = Balance::Left;
                node
            }
            Balance::Left => {
                cursor.stop();
                let pivot_code = node.left.as_ref().expect("left-heavy node has a left child").balance;
                if pivot_code == Balance::Right {
                    Self::rotate_double_right(node, cursor)
                } else {
                    Self::rotate_single_right(node, cursor)
                }
            }
        }
    }

    /// Mirror of [`Node::settle_left_growth`] for a right subtree that grew.
    fn settle_right_growth(mut node: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        if !cursor.is_armed() {
            return node;
        }
        match node.balance {
            Balance::Left => {
                node.balance = Balance::Same;
                cursor.stop();
                node
            }
            Balance::Same => {
                node.balance = Balance::Right;
                node
            }
            Balance::Right => {
                cursor.stop();
                let pivot_code = node.right.as_ref().expect("right-heavy node has a right child").balance;
                if pivot_code == Balance::Left {
                    Self::rotate_double_left(node, cursor)
                } else {
                    Self::rotate_single_left(node, cursor)
                }
            }
        }
    }

    // ─── Shrink adjustment (deletion) ───────────────────────────────────────

    /// Updates this node after its left subtree shrank one level. The codes
    /// move in the opposite direction from insertion, and the stop rules
    /// differ: settling into `Same` means the whole subtree got shorter, so the change
    /// keeps propagating, while tipping from `Same` to `Right` leaves the
    /// height untouched and stops. A rotation shortens the subtree except in
    /// the one case where the pivot was evenly balanced.
    fn settle_left_shrink(mut node: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        if !cursor.is_armed() {
            return node;
        }
        match node.balance {
            Balance::Left => {
                node.balance = Balance::Same;
                node
            }
            Balance::Same => {
                node.balance = Balance::Right;
                cursor.stop();
                node
            }
            Balance::Right => {
                let pivot_code = node.right.as_ref().expect("right-heavy node has a right child").balance;
                let root = if pivot_code == Balance::Left {
                    Self::rotate_double_left(node, cursor)
                } else {
                    Self::rotate_single_left(node, cursor)
                };
                if pivot_code == Balance::Same {
                    cursor.stop();
                }
                root
            }
        }
    }

    /// Mirror of [`Node::settle_left_shrink`] for a right subtree that shrank.
    fn settle_right_shrink(mut node: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        if !cursor.is_armed() {
            return node;
        }
        match node.balance {
            Balance::Right => {
                node.balance = Balance::Same;
                node
            }
            Balance::Same => {
                node.balance = Balance::Left;
                cursor.stop();
                node
            }
            Balance::Left => {
                let pivot_code = node.left.as_ref().expect("left-heavy node has a left child").balance;
                let root = if pivot_code == Balance::Right {
                    Self::rotate_double_right(node, cursor)
                } else {
                    Self::rotate_single_right(node, cursor)
                };
                if pivot_code == Balance::Same {
                    cursor.stop();
                }
                root
            }
        }
    }

    // ─── Rotation algebra ───────────────────────────────────────────────────
    //
    // Each rotation rewires two or three nodes and fixes their ranks and
    // balance codes from local information only. In-order sequence is
    // preserved; no subtree is re-scanned.

    /// Hoists the right child over `parent`. The child gains the parent's old
    /// left span plus the parent itself.
    ///
    /// An evenly balanced child only reaches a rotation during deletion; that
    /// case keeps one level on each side and leaves the subtree height
    /// unchanged, so the codes land on `Right`/`Left` instead of `Same`.
    fn rotate_single_left(mut parent: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        cursor.count_single();
        let mut child = parent.right.take().expect("single left rotation needs a right child");
        parent.right = child.left.take();
        child.rank += parent.rank + 1;
        if child.balance == Balance::Same {
            parent.balance = Balance::Right;
            child.balance = Balance::Left;
        } else {
            parent.balance = Balance::Same;
            child.balance = Balance::Same;
        }
        child.left = Some(parent);
        child
    }

    /// Mirror of [`Node::rotate_single_left`]. The parent loses the child's
    /// span plus the child itself from its left count.
    fn rotate_single_right(mut parent: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        cursor.count_single();
        let mut child = parent.left.take().expect("single right rotation needs a left child");
        parent.left = child.right.take();
        parent.rank -= child.rank + 1;
        if child.balance == Balance::Same {
            parent.balance = Balance::Left;
            child.balance = Balance::Right;
        } else {
            parent.balance = Balance::Same;
            child.balance = Balance::Same;
        }
        child.right = Some(parent);
        child
    }

    /// Hoists the right child's left grandchild to the local root. The new
    /// codes of parent and child depend on which side of the pivot carried the
    /// extra level; the pivot always ends up even.
    fn rotate_double_left(mut parent: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        cursor.count_double();
        let mut child = parent.right.take().expect("double left rotation needs a right child");
        let mut pivot = child.left.take().expect("double left rotation needs a left grandchild");
        parent.right = pivot.left.take();
        child.left = pivot.right.take();
        child.rank -= pivot.rank + 1;
        pivot.rank += parent.rank + 1;
        match pivot.balance {
            Balance::Left => {
                parent.balance = Balance::Same;
                child.balance = Balance::Right;
            }
            Balance::Same => {
                parent.balance = Balance::Same;
                child.balance = Balance::Same;
            }
            Balance::Right => {
                parent.balance = Balance::Left;
                child.balance = Balance::Same;
            }
        }
        pivot.balance = Balance::Same;
        pivot.left = Some(parent);
        pivot.right = Some(child);
        pivot
    }

    /// Mirror of [`Node::rotate_double_left`]. The pivot's rank must be
    /// updated before the parent's, which subtracts the pivot's new span.
    fn rotate_double_right(mut parent: Box<Node>, cursor: &mut RebalanceCursor) -> Box<Node> {
        cursor.count_double();
        let mut child = parent.left.take().expect("double right rotation needs a left child");
        let mut pivot = child.right.take().expect("double right rotation needs a right grandchild");
        child.right = pivot.left.take();
        parent.left = pivot.right.take();
        pivot.rank += child.rank + 1;
        parent.rank -= pivot.rank + 1;
        match pivot.balance {
            Balance::Left => {
                child.balance = Balance::Same;
                parent.balance = Balance::Right;
            }
            Balance::Same => {
                child.balance = Balance::Same;
                parent.balance = Balance::Same;
            }
            Balance::Right => {
                child.balance = Balance::Left;
                parent.balance = Balance::Same;
            }
        }
        pivot.balance = Balance::Same;
        pivot.left = Some(child);
        pivot.right = Some(parent);
        pivot
    }

    // ─── Diagnostic traversals ──────────────────────────────────────────────

    /// In-order concatenation of the subtree's characters.
    pub(crate) fn write_inorder(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(left) = &self.left {
            left.write_inorder(f)?;
        }
        write!(f, "{}", self.value)?;
        match &self.right {
            Some(right) => right.write_inorder(f),
            None => Ok(()),
        }
    }

    /// Pre-order `value+rank` entries, e.g. `b1`.
    pub(crate) fn push_rank_entries(&self, out: &mut Vec<String>) {
        out.push(format!("{}{}", self.value, self.rank));
        if let Some(left) = &self.left {
            left.push_rank_entries(out);
        }
        if let Some(right) = &self.right {
            right.push_rank_entries(out);
        }
    }

    /// Pre-order `value+rank+balance` entries, e.g. `b1/`.
    pub(crate) fn push_debug_entries(&self, out: &mut Vec<String>) {
        out.push(format!("{}{}{}", self.value, self.rank, self.balance));
        if let Some(left) = &self.left {
            left.push_debug_entries(out);
        }
        if let Some(right) = &self.right {
            right.push_debug_entries(out);
        }
    }
}

/// Balance code for a median-split subtree whose halves have the given
/// lengths. A median split of a run of length `n` always builds a subtree of
/// height `floor(log2 n)` (−1 for the empty run), so the code can be read off
/// the half lengths without measuring the built subtrees.
fn split_balance(left_len: usize, right_len: usize) -> Balance {
    match half_height(right_len).cmp(&half_height(left_len)) {
        Ordering::Less => Balance::Left,
        Ordering::Equal => Balance::Same,
        Ordering::Greater => Balance::Right,
    }
}

fn half_height(len: usize) -> i32 {
    if len == 0 { -1 } else { len.ilog2() as i32 }
}

// ─── Verification traversals ────────────────────────────────────────────────
//
// O(n) reference checks used by tests and debugging, never on the mutation
// path. They trust nothing: sizes and heights are recomputed bottom-up.

/// True iff every node's rank equals the actual size of its left subtree.
pub(crate) fn ranks_match_left_subtree_size(link: &Link) -> bool {
    checked_size(link).is_some()
}

/// Single bottom-up pass: the subtree's size, or `None` on the first rank
/// mismatch.
fn checked_size(link: &Link) -> Option<usize> {
    let Some(node) = link else { return Some(0) };
    let left = checked_size(&node.left)?;
    let right = checked_size(&node.right)?;
    (node.rank == left).then_some(left + right + 1)
}

/// True iff every node's balance code matches the actual height difference of
/// its subtrees, and that difference is within the AVL bound.
pub(crate) fn balance_codes_are_correct(link: &Link) -> bool {
    checked_height(link).0
}

/// Single bottom-up pass returning (codes correct so far, height).
fn checked_height(link: &Link) -> (bool, i32) {
    let Some(node) = link else { return (true, -1) };
    let (left_ok, left_height) = checked_height(&node.left);
    let (right_ok, right_height) = checked_height(&node.right);
    let height = left_height.max(right_height) + 1;
    if !(left_ok && right_ok) {
        return (false, height);
    }
    let expected = match right_height.cmp(&left_height) {
        Ordering::Less => Balance::Left,
        Ordering::Equal => Balance::Same,
        Ordering::Greater => Balance::Right,
    };
    (node.balance == expected && (right_height - left_height).abs() <= 1, height)
}

/// Height in O(log n), trusting the balance codes: the taller side is always
/// the coded side (or the left one when even).
pub(crate) fn fast_height(link: &Link) -> i32 {
    match link {
        None => -1,
        Some(node) if node.balance == Balance::Right => 1 + fast_height(&node.right),
        Some(node) => 1 + fast_height(&node.left),
    }
}

/// Height by full traversal; the empty subtree has height −1.
pub(crate) fn slow_height(link: &Link) -> i32 {
    match link {
        None => -1,
        Some(node) => slow_height(&node.left).max(slow_height(&node.right)) + 1,
    }
}

/// Node count by full traversal.
pub(crate) fn slow_size(link: &Link) -> usize {
    match link {
        None => 0,
        Some(node) => slow_size(&node.left) + slow_size(&node.right) + 1,
    }
}
