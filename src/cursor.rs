/// Mutable context threaded through one top-level insert or remove call.
///
/// Not persistent tree state: the facade owns one cursor, re-arms it at the
/// start of every mutating operation, and lends it to the recursion as `&mut`.
/// The rotation counter, by contrast, is cumulative over the tree's lifetime
/// and is purely observational; the algorithms never read it.
#[derive(Clone, Debug, Default)]
pub(crate) struct RebalanceCursor {
    /// Rotations performed since the tree was created. A double rotation
    /// counts as two.
    rotations: u64,
    /// True while the current operation's height change still has to be
    /// reported to the next ancestor.
    keep_propagating: bool,
}

impl RebalanceCursor {
    pub(crate) const fn new() -> Self {
        Self {
            rotations: 0,
            keep_propagating: false,
        }
    }

    /// Arms the propagation flag for a fresh mutating operation.
    pub(crate) fn arm(&mut self) {
        self.keep_propagating = true;
    }

    /// Clears the flag once a node absorbs the height change or rotates.
    pub(crate) fn stop(&mut self) {
        self.keep_propagating = false;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.keep_propagating
    }

    pub(crate) fn count_single(&mut self) {
        self.rotations += 1;
    }

    pub(crate) fn count_double(&mut self) {
        self.rotations += 2;
    }

    pub(crate) fn rotations(&self) -> u64 {
        self.rotations
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn arming_does_not_disturb_the_rotation_count() {
        let mut cursor = RebalanceCursor::new();
        cursor.count_single();
        cursor.count_double();
        cursor.arm();
        assert!(cursor.is_armed());
        assert_eq!(cursor.rotations(), 3);
        cursor.stop();
        assert!(!cursor.is_armed());
        assert_eq!(cursor.rotations(), 3);
    }
}
