use core::ptr;

use super::handle::Handle;
use super::node::Node;
use super::raw_avl_tree::RawAvlTree;

/// A read-only position in a tree, anchored at the tree's sentinel.
///
/// `current == None` means the cursor sits on the sentinel (the end position).
pub(crate) struct RawCursor<'a, K, V> {
    tree: &'a RawAvlTree<K, V>,
    current: Option<Handle>,
}

impl<'a, K, V> RawCursor<'a, K, V> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, V>, current: Option<Handle>) -> Self {
        Self { tree, current }
    }

    pub(crate) fn current(&self) -> Option<Handle> {
        self.current
    }

    pub(crate) fn node(&self) -> Option<&'a Node<K, V>> {
        let tree = self.tree;
        self.current.map(|handle| tree.node(handle))
    }

    pub(crate) fn move_next(&mut self) {
        self.current = self.tree.successor(self.current);
    }

    pub(crate) fn move_prev(&mut self) {
        self.current = self.tree.predecessor(self.current);
    }
}

impl<K, V> Clone for RawCursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for RawCursor<'_, K, V> {}

impl<K, V> PartialEq for RawCursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<K, V> Eq for RawCursor<'_, K, V> {}

/// Double-ended in-order walk over the nodes of a tree.
pub(crate) struct RawIter<'a, K, V> {
    tree: Option<&'a RawAvlTree<K, V>>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a, K, V> RawIter<'a, K, V> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, V>) -> Self {
        Self {
            tree: Some(tree),
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }

    pub(crate) fn empty() -> Self {
        Self {
            tree: None,
            front: None,
            back: None,
            remaining: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, K, V> Iterator for RawIter<'a, K, V> {
    type Item = &'a Node<K, V>;

    fn next(&mut self) -> Option<&'a Node<K, V>> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let handle = self.front?;
        self.front = tree.successor(Some(handle));
        self.remaining -= 1;
        Some(tree.node(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for RawIter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree?;
        let handle = self.back?;
        self.back = tree.predecessor(Some(handle));
        self.remaining -= 1;
        Some(tree.node(handle))
    }
}

impl<K, V> Clone for RawIter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::KeyMode;
    use alloc::vec::Vec;

    fn tree_of(keys: &[i32]) -> RawAvlTree<i32, ()> {
        let mut tree = RawAvlTree::new();
        for &key in keys {
            tree.insert(key, (), KeyMode::Duplicates);
        }
        tree
    }

    #[test]
    fn cursor_wraps_through_the_sentinel() {
        let tree = tree_of(&[2, 1, 3]);
        let mut cursor = RawCursor::new(&tree, None);
        cursor.move_next();
        assert_eq!(cursor.node().map(|n| n.key), Some(1));
        cursor.move_prev();
        assert!(cursor.node().is_none());
        cursor.move_prev();
        assert_eq!(cursor.node().map(|n| n.key), Some(3));
    }

    #[test]
    fn end_cursors_of_one_tree_are_equal() {
        let tree = tree_of(&[1]);
        let other = tree_of(&[1]);
        assert!(RawCursor::new(&tree, None) == RawCursor::new(&tree, None));
        assert!(RawCursor::new(&tree, None) != RawCursor::new(&other, None));
    }

    #[test]
    fn iter_meets_in_the_middle() {
        let tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let mut iter = RawIter::new(&tree);
        let mut seen = Vec::new();
        while let Some(node) = iter.next() {
            seen.push(node.key);
            if let Some(node) = iter.next_back() {
                seen.push(node.key);
            }
        }
        assert_eq!(seen, [1, 7, 2, 6, 3, 5, 4]);
    }
}
