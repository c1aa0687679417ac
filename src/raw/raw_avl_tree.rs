use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::{Ordering, max};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{EMPTY_HEIGHT, Node, Side};
use crate::Error;
use crate::position::Position;

/// The tree's "end" node.
///
/// It is never part of the key space: a link equal to `None` where a node is
/// expected (a cursor, the result of a search) means "positioned on the sentinel".
/// `root` plays the role of the sentinel's parent link, `first` of its right link
/// (cached minimum) and `last` of its left link (cached maximum).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Sentinel {
    pub(crate) root: Option<Handle>,
    pub(crate) first: Option<Handle>,
    pub(crate) last: Option<Handle>,
}

/// Result of [`RawAvlTree::insert`].
pub(crate) struct Insertion<V> {
    /// The node now holding the key.
    pub(crate) handle: Handle,
    /// The value handed back when the key was already present.
    pub(crate) rejected: Option<V>,
}

impl<V> Insertion<V> {
    pub(crate) fn inserted(&self) -> bool {
        self.rejected.is_none()
    }
}

/// How equal keys are treated by [`RawAvlTree::insert`] and [`RawAvlTree::merge`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum KeyMode {
    /// An equal key is rejected; on merge it stays in the source tree.
    Unique,
    /// An equal key counts as one more occurrence; on merge every node moves and the
    /// occurrences add up.
    Duplicates,
}

/// The AVL tree backing every collection in this crate.
///
/// Rotations relink nodes instead of swapping payloads, so a handle keeps naming the
/// same key until that key is removed.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K, V> {
    nodes: Arena<Node<K, V>>,
    end: Sentinel,
}

impl<K, V> RawAvlTree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            end: Sentinel {
                root: None,
                first: None,
                last: None,
            },
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            end: Sentinel::default(),
        }
    }

    /// Number of distinct keys (nodes), duplicates excluded.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn max_size() -> usize {
        Arena::<Node<K, V>>::max_len()
    }

    pub(crate) fn clear(&mut self) {
        log::debug!("clearing tree of {} nodes", self.len());
        self.nodes.clear();
        self.end = Sentinel::default();
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.end.first
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.end.last
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &Node<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.nodes.get_mut(handle)
    }

    /// Maps a detached position back onto a live node.
    ///
    /// Fails with `OutOfRange` for the end position and for a slot that has been freed.
    pub(crate) fn resolve(&self, position: Position) -> Result<Handle, Error> {
        let handle = position.node.ok_or(Error::OutOfRange("position is past the end"))?;
        if self.nodes.contains(handle) {
            Ok(handle)
        } else {
            Err(Error::OutOfRange("position refers to an erased element"))
        }
    }

    /// Height of the subtree at `link`; `EMPTY_HEIGHT` for no subtree.
    #[inline]
    pub(crate) fn height(&self, link: Option<Handle>) -> i32 {
        link.map_or(EMPTY_HEIGHT, |h| self.node(h).height)
    }

    /// `height(right) - height(left)`.
    fn balance_factor(&self, handle: Handle) -> i32 {
        let node = self.node(handle);
        self.height(node.right) - self.height(node.left)
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.node(handle);
        let height = 1 + max(self.height(node.left), self.height(node.right));
        self.node_mut(handle).height = height;
    }

    /// Leftmost node of the subtree rooted at `handle`.
    pub(crate) fn min_of(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.node(handle).left {
            handle = left;
        }
        handle
    }

    /// Rightmost node of the subtree rooted at `handle`.
    pub(crate) fn max_of(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.node(handle).right {
            handle = right;
        }
        handle
    }

    /// In-order successor. `None` (the sentinel) wraps around to the first node, and
    /// the last node steps onto the sentinel.
    pub(crate) fn successor(&self, link: Option<Handle>) -> Option<Handle> {
        self.step(link, Side::Right)
    }

    /// In-order predecessor, the mirror of [`successor`](Self::successor).
    pub(crate) fn predecessor(&self, link: Option<Handle>) -> Option<Handle> {
        self.step(link, Side::Left)
    }

    // `Side::Right` walks forward, `Side::Left` backward.
    fn step(&self, link: Option<Handle>, toward: Side) -> Option<Handle> {
        let Some(mut current) = link else {
            return match toward {
                Side::Right => self.end.first,
                Side::Left => self.end.last,
            };
        };

        if let Some(child) = self.node(current).child(toward) {
            return Some(match toward {
                Side::Right => self.min_of(child),
                Side::Left => self.max_of(child),
            });
        }

        // Climb while we are the `toward` child; the first ancestor reached from the
        // other side is the answer. Running off the root lands on the sentinel.
        while let Some(parent) = self.node(current).parent {
            if self.node(parent).child(toward) != Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Points whichever link currently holds `old` (a child slot of `parent`, or the
    /// sentinel's root link) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.end.root = new,
            Some(parent) => {
                let node = self.node_mut(parent);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    debug_assert_eq!(node.right, Some(old), "`RawAvlTree::replace_child()` - not a child!");
                    node.right = new;
                }
            }
        }
    }

    /// Rotates the subtree at `handle` toward `toward`, promoting the child on the
    /// opposite side. Returns the new subtree root.
    fn rotate(&mut self, handle: Handle, toward: Side) -> Handle {
        let from = toward.opposite();
        let pivot = self
            .node(handle)
            .child(from)
            .expect("`RawAvlTree::rotate()` - rotation needs a child to promote!");
        let inner = self.node(pivot).child(toward);
        let parent = self.node(handle).parent;

        self.node_mut(handle).set_child(from, inner);
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(handle);
        }

        self.node_mut(pivot).parent = parent;
        self.replace_child(parent, handle, Some(pivot));

        self.node_mut(pivot).set_child(toward, Some(handle));
        self.node_mut(handle).parent = Some(pivot);

        self.update_height(handle);
        self.update_height(pivot);
        log::trace!("rotated {toward:?} at {handle:?}, promoted {pivot:?}");
        pivot
    }

    /// Restores the AVL condition at `handle`, returning the root of its subtree.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        self.update_height(handle);
        match self.balance_factor(handle) {
            -2 => {
                let left = self.node(handle).left.expect("`RawAvlTree::rebalance()` - left-heavy without left child!");
                if self.balance_factor(left) > 0 {
                    self.rotate(left, Side::Left);
                }
                self.rotate(handle, Side::Right)
            }
            2 => {
                let right = self.node(handle).right.expect("`RawAvlTree::rebalance()` - right-heavy without right child!");
                if self.balance_factor(right) < 0 {
                    self.rotate(right, Side::Right);
                }
                self.rotate(handle, Side::Left)
            }
            factor => {
                debug_assert!((-1..=1).contains(&factor), "`RawAvlTree::rebalance()` - balance factor {factor}!");
                handle
            }
        }
    }

    /// Rebalances every node from `link` up to the root, then refreshes the sentinel.
    fn retrace(&mut self, link: Option<Handle>) {
        let mut current = link;
        while let Some(handle) = current {
            let subtree = self.rebalance(handle);
            current = self.node(subtree).parent;
        }
        self.refresh_sentinel();
    }

    fn refresh_sentinel(&mut self) {
        self.end.first = self.end.root.map(|root| self.min_of(root));
        self.end.last = self.end.root.map(|root| self.max_of(root));
    }

    /// Unlinks and frees one node, whatever its duplicate count.
    pub(crate) fn remove(&mut self, handle: Handle) -> (K, V) {
        let (parent, left, right) = {
            let node = self.node(handle);
            (node.parent, node.left, node.right)
        };

        let retrace_from = match (left, right) {
            (Some(left), Some(right)) => {
                // Splice the in-order successor node into the vacated spot.
                let successor = self.min_of(right);
                let retrace_from = if successor == right {
                    successor
                } else {
                    let successor_parent = self
                        .node(successor)
                        .parent
                        .expect("`RawAvlTree::remove()` - successor below `right` has no parent!");
                    let successor_right = self.node(successor).right;
                    self.node_mut(successor_parent).left = successor_right;
                    if let Some(successor_right) = successor_right {
                        self.node_mut(successor_right).parent = Some(successor_parent);
                    }
                    self.node_mut(successor).right = Some(right);
                    self.node_mut(right).parent = Some(successor);
                    successor_parent
                };

                self.node_mut(successor).left = Some(left);
                self.node_mut(left).parent = Some(successor);
                self.node_mut(successor).parent = parent;
                self.replace_child(parent, handle, Some(successor));
                Some(retrace_from)
            }
            (only, None) | (None, only) => {
                if let Some(only) = only {
                    self.node_mut(only).parent = parent;
                }
                self.replace_child(parent, handle, only);
                parent
            }
        };

        let node = self.nodes.take(handle);
        self.retrace(retrace_from);
        (node.key, node.value)
    }

    /// Moves every entry out in ascending order as `(key, value, duplicates)`.
    pub(crate) fn drain(&mut self) -> Vec<(K, V, usize)> {
        let mut handles = Vec::with_capacity(self.len());
        let mut cursor = self.end.first;
        while let Some(handle) = cursor {
            handles.push(handle);
            cursor = self.successor(Some(handle));
        }

        let drained = handles
            .into_iter()
            .map(|handle| {
                let node = self.nodes.take(handle);
                (node.key, node.value, node.duplicates)
            })
            .collect();
        self.clear();
        drained
    }

    pub(crate) fn swap(&mut self, other: &mut Self) {
        log::debug!("swapping trees of {} and {} nodes", self.len(), other.len());
        core::mem::swap(self, other);
    }
}

impl<K: Ord, V> RawAvlTree<K, V> {
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.end.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// First node whose key is not less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.bound(|node_key| node_key.borrow() >= key)
    }

    /// First node whose key is greater than `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.bound(|node_key| node_key.borrow() > key)
    }

    // Leftmost node satisfying a predicate that is monotone over the key order.
    fn bound(&self, mut satisfies: impl FnMut(&K) -> bool) -> Option<Handle> {
        let mut current = self.end.root;
        let mut candidate = None;
        while let Some(handle) = current {
            let node = self.node(handle);
            if satisfies(&node.key) {
                candidate = Some(handle);
                current = node.left;
            } else {
                current = node.right;
            }
        }
        candidate
    }

    /// Inserts `key`. If a node already holds it, `value` is handed back untouched and,
    /// under [`KeyMode::Duplicates`], that node's duplicate count goes up by one.
    pub(crate) fn insert(&mut self, key: K, value: V, mode: KeyMode) -> Insertion<V> {
        let Some(mut current) = self.end.root else {
            let handle = self.nodes.alloc(Node::leaf(key, value, None));
            self.end.root = Some(handle);
            self.refresh_sentinel();
            return Insertion { handle, rejected: None };
        };

        loop {
            let node = self.node(current);
            let side = match key.cmp(&node.key) {
                Ordering::Equal => {
                    if mode == KeyMode::Duplicates {
                        self.node_mut(current).duplicates += 1;
                    }
                    return Insertion {
                        handle: current,
                        rejected: Some(value),
                    };
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };

            match node.child(side) {
                Some(child) => current = child,
                None => {
                    let handle = self.nodes.alloc(Node::leaf(key, value, Some(current)));
                    self.node_mut(current).set_child(side, Some(handle));
                    self.retrace(Some(current));
                    return Insertion { handle, rejected: None };
                }
            }
        }
    }

    /// Moves nodes from `other` into `self` in ascending order and returns how many
    /// logical elements (duplicates included) moved.
    pub(crate) fn merge(&mut self, other: &mut Self, mode: KeyMode) -> usize {
        let mut moved = 0;
        let mut cursor = other.first();
        while let Some(handle) = cursor {
            // Successor first: relinking removal keeps its handle valid.
            cursor = other.successor(Some(handle));
            if mode == KeyMode::Unique && self.find(&other.node(handle).key).is_some() {
                continue;
            }

            let duplicates = other.node(handle).duplicates;
            let (key, value) = other.remove(handle);
            let insertion = self.insert(key, value, KeyMode::Duplicates);
            let target = self.node_mut(insertion.handle);
            if insertion.inserted() {
                target.duplicates = duplicates;
            } else {
                target.duplicates += duplicates;
            }
            moved += duplicates + 1;
        }
        log::debug!("merged {moved} elements, {} nodes left in source", other.len());
        moved
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;
    use proptest::prelude::*;

    impl<K: Ord + core::fmt::Debug, V> RawAvlTree<K, V> {
        /// Checks ordering, balance, heights, parent links, size and sentinel shortcuts.
        fn assert_invariants(&self) {
            let Some(root) = self.end.root else {
                assert_eq!(self.len(), 0);
                assert_eq!(self.end, Sentinel::default());
                return;
            };
            assert_eq!(self.node(root).parent, None, "root must hang off the sentinel");
            let count = self.check_subtree(root, None, None);
            assert_eq!(count, self.len());
            assert_eq!(self.end.first, Some(self.min_of(root)));
            assert_eq!(self.end.last, Some(self.max_of(root)));
        }

        fn check_subtree(&self, handle: Handle, low: Option<&K>, high: Option<&K>) -> usize {
            let node = self.node(handle);
            if let Some(low) = low {
                assert!(*low < node.key, "{low:?} !< {:?}", node.key);
            }
            if let Some(high) = high {
                assert!(node.key < *high, "{:?} !< {high:?}", node.key);
            }
            let mut count = 1;
            for child in [node.left, node.right].into_iter().flatten() {
                assert_eq!(self.node(child).parent, Some(handle), "broken parent link");
            }
            if let Some(left) = node.left {
                count += self.check_subtree(left, low, Some(&node.key));
            }
            if let Some(right) = node.right {
                count += self.check_subtree(right, Some(&node.key), high);
            }
            assert_eq!(node.height, 1 + max(self.height(node.left), self.height(node.right)));
            assert!(self.balance_factor(handle).abs() <= 1, "unbalanced at {:?}", node.key);
            count
        }

        fn keys_in_order(&self) -> Vec<&K> {
            let mut keys = Vec::new();
            let mut cursor = self.first();
            while let Some(handle) = cursor {
                keys.push(&self.node(handle).key);
                cursor = self.successor(cursor);
            }
            keys
        }
    }

    fn tree_of(keys: &[i32]) -> RawAvlTree<i32, ()> {
        let mut tree = RawAvlTree::new();
        for &key in keys {
            tree.insert(key, (), KeyMode::Duplicates);
        }
        tree
    }

    #[test]
    fn empty_tree_sentinel_is_blank() {
        let tree: RawAvlTree<i32, ()> = RawAvlTree::new();
        assert_eq!(tree.end, Sentinel::default());
        assert_eq!(tree.successor(None), None);
        assert_eq!(tree.predecessor(None), None);
        tree.assert_invariants();
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let mut tree = RawAvlTree::new();
        for key in 0..1023 {
            tree.insert(key, (), KeyMode::Duplicates);
            tree.assert_invariants();
        }
        // A perfect tree of 1023 nodes has height 9; AVL never needs more here.
        assert_eq!(tree.height(tree.end.root), 9);
    }

    #[test]
    fn unique_insert_leaves_counter_alone() {
        let mut tree = tree_of(&[5, 3, 7]);
        let insertion = tree.insert(3, (), KeyMode::Unique);
        assert_eq!(insertion.rejected, Some(()));
        assert_eq!(tree.node(insertion.handle).duplicates, 0);
    }

    #[test]
    fn duplicate_insert_bumps_counter_without_new_node() {
        let mut tree = tree_of(&[5, 3, 7]);
        let insertion = tree.insert(3, (), KeyMode::Duplicates);
        assert!(!insertion.inserted());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(insertion.handle).duplicates, 1);
    }

    #[test]
    fn sentinel_tracks_min_and_max() {
        let mut tree = tree_of(&[8, 3, 7, 2, 4, 6, 8, 4, 6, 8, 9, 0, 1, 241_325, 543_565]);
        assert_eq!(tree.len(), 11);
        let end = tree.end;
        assert_eq!(tree.node(end.first.unwrap()).key, 0);
        assert_eq!(tree.node(end.last.unwrap()).key, 543_565);

        let max = tree.last().unwrap();
        tree.remove(max);
        assert_eq!(tree.node(tree.last().unwrap()).key, 241_325);
        tree.assert_invariants();
    }

    #[test]
    fn stepping_off_either_end_reaches_the_sentinel() {
        let tree = tree_of(&[2, 1, 3]);
        assert_eq!(tree.successor(tree.last()), None);
        assert_eq!(tree.predecessor(tree.first()), None);
        assert_eq!(tree.successor(None), tree.first());
        assert_eq!(tree.predecessor(None), tree.last());
    }

    #[test]
    fn handles_survive_rotations() {
        let mut tree = RawAvlTree::new();
        let handles: Vec<_> = (0..64).map(|key| (key, tree.insert(key, (), KeyMode::Duplicates).handle)).collect();
        for (key, handle) in handles {
            assert_eq!(tree.node(handle).key, key);
        }
    }

    #[test]
    fn removing_a_two_child_node_keeps_successor_handle() {
        let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);
        let four = tree.find(&4).unwrap();
        let five = tree.find(&5).unwrap();
        assert_eq!(tree.successor(Some(four)), Some(five));
        assert_eq!(tree.remove(four), (4, ()));
        assert_eq!(tree.node(five).key, 5);
        assert_eq!(tree.find(&5), Some(five));
        tree.assert_invariants();
    }

    #[test]
    fn bounds_descend_the_tree() {
        let tree = tree_of(&[10, 20, 30, 40]);
        let key = |link: Option<Handle>| link.map(|h| tree.node(h).key);
        assert_eq!(key(tree.lower_bound(&20)), Some(20));
        assert_eq!(key(tree.upper_bound(&20)), Some(30));
        assert_eq!(key(tree.lower_bound(&21)), Some(30));
        assert_eq!(key(tree.lower_bound(&5)), Some(10));
        assert_eq!(key(tree.upper_bound(&40)), None);
    }

    #[test]
    fn merge_unique_leaves_collisions_behind() {
        let mut target = tree_of(&[8, 5, 6, 3]);
        let mut source = tree_of(&[6, 13]);
        assert_eq!(target.merge(&mut source, KeyMode::Unique), 1);
        assert_eq!(target.keys_in_order(), vec![&3, &5, &6, &8, &13]);
        assert_eq!(source.keys_in_order(), vec![&6]);
        target.assert_invariants();
        source.assert_invariants();
    }

    #[test]
    fn merge_duplicates_adds_counts() {
        let mut target = tree_of(&[1, 2, 2]);
        let mut source = tree_of(&[2, 2, 3]);
        assert_eq!(target.merge(&mut source, KeyMode::Duplicates), 3);
        assert!(source.is_empty());
        let two = target.find(&2).unwrap();
        assert_eq!(target.node(two).multiplicity(), 4);
        target.assert_invariants();
    }

    #[test]
    fn drain_is_sorted_and_empties() {
        let mut tree = tree_of(&[3, 1, 2, 2]);
        let drained: Vec<_> = tree.drain().into_iter().map(|(k, _, d)| (k, d)).collect();
        assert_eq!(drained, vec![(1, 0), (2, 1), (3, 0)]);
        assert!(tree.is_empty());
        tree.assert_invariants();
    }

    #[test]
    fn swap_moves_sentinels_with_their_nodes() {
        let mut a = tree_of(&[1]);
        let mut b = tree_of(&[3, 4, 5]);
        a.swap(&mut b);
        assert_eq!(a.keys_in_order(), vec![&3, &4, &5]);
        assert_eq!(b.keys_in_order(), vec![&1]);
        a.assert_invariants();
        b.assert_invariants();
    }

    #[test]
    fn resolve_rejects_end_and_freed_positions() {
        let mut tree = tree_of(&[1, 2]);
        let one = tree.find(&1).unwrap();
        assert_eq!(tree.resolve(Position::new(Some(one), 0)), Ok(one));
        assert!(matches!(tree.resolve(Position::new(None, 0)), Err(Error::OutOfRange(_))));
        tree.remove(one);
        assert!(matches!(tree.resolve(Position::new(Some(one), 0)), Err(Error::OutOfRange(_))));
    }

    proptest! {
        #[test]
        fn random_inserts_and_removes_keep_invariants(
            ops in prop::collection::vec((any::<bool>(), 0i32..200), 0..600)
        ) {
            let mut tree = RawAvlTree::new();
            let mut model = alloc::collections::BTreeSet::new();
            for (insert, key) in ops {
                if insert {
                    let fresh = tree.insert(key, (), KeyMode::Duplicates).inserted();
                    prop_assert_eq!(fresh, model.insert(key));
                } else if let Some(handle) = tree.find(&key) {
                    tree.remove(handle);
                    prop_assert!(model.remove(&key));
                } else {
                    prop_assert!(!model.contains(&key));
                }
                tree.assert_invariants();
            }
            let expected: Vec<_> = model.iter().collect();
            prop_assert_eq!(tree.keys_in_order(), expected);
        }

        #[test]
        fn any_erase_order_round_trips(order in Just(vec![5, 3, 7, 2, 4, 6, 8]).prop_shuffle()) {
            let mut tree = tree_of(&[5, 3, 7, 2, 4, 6, 8]);
            for key in &order {
                let handle = tree.find(key).unwrap();
                tree.remove(handle);
                tree.assert_invariants();
            }
            prop_assert!(tree.is_empty());
            for key in &order {
                tree.insert(*key, (), KeyMode::Duplicates);
            }
            tree.assert_invariants();
            prop_assert_eq!(tree.keys_in_order(), vec![&2, &3, &4, &5, &6, &7, &8]);
        }
    }
}
