use super::handle::Handle;

/// Height of an empty subtree.
pub(crate) const EMPTY_HEIGHT: i32 = -1;

/// One distinct key of the tree.
///
/// `parent` is `None` for the root, whose logical parent is the tree's sentinel.
/// Multiset repeats of `key` are recorded in `duplicates` rather than as extra nodes.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    /// Insertions of `key` beyond the first.
    pub(crate) duplicates: usize,
    /// Height of the subtree rooted here; a leaf has height 0.
    pub(crate) height: i32,
}

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl<K, V> Node<K, V> {
    pub(crate) fn leaf(key: K, value: V, parent: Option<Handle>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            duplicates: 0,
            height: 0,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Number of logical elements this node stands for.
    #[inline]
    pub(crate) fn multiplicity(&self) -> usize {
        self.duplicates + 1
    }
}

impl Side {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_leaf_has_zero_height_and_no_links() {
        let node = Node::leaf(3, "three", None);
        assert_eq!(node.height, 0);
        assert_eq!(node.duplicates, 0);
        assert_eq!(node.multiplicity(), 1);
        assert!(node.left.is_none() && node.right.is_none() && node.parent.is_none());
    }

    #[test]
    fn set_child_targets_one_side() {
        let mut node = Node::leaf(1, (), None);
        let h = Handle::from_index(7);
        node.set_child(Side::Right, Some(h));
        assert_eq!(node.child(Side::Right), Some(h));
        assert_eq!(node.child(Side::Left), None);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}
