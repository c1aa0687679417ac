use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::raw::{Handle, KeyMode, RawAvlTree, RawCursor, RawIter};
use crate::{Error, Position};

/// An ordered collection that may hold several equal values, based on an AVL tree.
///
/// Equal values share one tree node carrying a repeat count, so a key inserted a
/// thousand times still costs a single node. Iteration and cursors visit each
/// repeat separately: a value inserted `n` times is seen `n` times in a row.
///
/// # Examples
///
/// ```
/// use avl_collections::AvlMultiset;
///
/// let mut bag = AvlMultiset::from(["This", "is", "is", "multiset"]);
/// bag.insert("is");
/// assert_eq!(bag.len(), 5);
/// assert_eq!(bag.count("is"), 3);
/// assert!(bag.iter().eq(["This", "is", "is", "is", "multiset"].iter()));
/// ```
pub struct AvlMultiset<T> {
    tree: RawAvlTree<T, ()>,
    /// Sum of node multiplicities.
    len: usize,
}

/// A cursor over an [`AvlMultiset`].
///
/// Besides the node it stands on, the cursor remembers which repeat of that node's
/// value it denotes, counted from zero. Moving forward visits every repeat before
/// stepping to the next distinct value.
pub struct Cursor<'a, T> {
    raw: RawCursor<'a, T, ()>,
    duplicate: usize,
}

/// An iterator over the values of an `AvlMultiset`, in ascending order, with repeats.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    nodes: RawIter<'a, T, ()>,
    // A value taken from `nodes` and how many of its repeats are still unreturned.
    front: Option<(&'a T, usize)>,
    back: Option<(&'a T, usize)>,
    remaining: usize,
}

/// An owning iterator over the values of an `AvlMultiset`, in ascending order.
pub struct IntoIter<T> {
    runs: VecDeque<(T, usize)>,
    remaining: usize,
}

impl<T> AvlMultiset<T> {
    /// Makes a new, empty `AvlMultiset`.
    #[must_use]
    pub const fn new() -> Self {
        AvlMultiset {
            tree: RawAvlTree::new(),
            len: 0,
        }
    }

    /// Creates an empty multiset with room for at least `capacity` distinct values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlMultiset {
            tree: RawAvlTree::with_capacity(capacity),
            len: 0,
        }
    }

    /// Returns how many distinct values fit before the node arena reallocates.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the number of values, repeats included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the largest number of distinct values a multiset of this type can hold.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        RawAvlTree::<T, ()>::max_size()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
        self.len = 0;
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first().map(|handle| &self.tree.node(handle).key)
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last().map(|handle| &self.tree.node(handle).key)
    }

    /// Removes one occurrence of the smallest value and returns it.
    pub fn pop_first(&mut self) -> Option<T>
    where
        T: Clone,
    {
        let handle = self.tree.first()?;
        Some(self.remove_one(handle))
    }

    /// Removes one occurrence of the largest value and returns it.
    pub fn pop_last(&mut self) -> Option<T>
    where
        T: Clone,
    {
        let handle = self.tree.last()?;
        Some(self.remove_one(handle))
    }

    fn remove_one(&mut self, handle: Handle) -> T
    where
        T: Clone,
    {
        self.len -= 1;
        let node = self.tree.node_mut(handle);
        if node.duplicates > 0 {
            node.duplicates -= 1;
            node.key.clone()
        } else {
            self.tree.remove(handle).0
        }
    }

    /// Returns a cursor at the first occurrence of the smallest value.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.tree, self.tree.first(), 0)
    }

    /// Returns a cursor at the end sentinel.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(&self.tree, None, 0)
    }

    /// Turns a position back into a cursor.
    pub fn cursor_at(&self, position: Position) -> Cursor<'_, T> {
        Cursor::new(&self.tree, position.node, position.duplicate)
    }

    /// Removes the single occurrence at `position` and returns the position of the
    /// element after it.
    ///
    /// While a value has repeats left only its count drops; the tree node goes away
    /// together with the last occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `position` is the end position or no longer
    /// denotes an occurrence; the multiset is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMultiset;
    ///
    /// let mut bag = AvlMultiset::from([1, 1, 2]);
    /// let next = bag.erase(bag.begin().position()).unwrap();
    /// assert_eq!(bag.cursor_at(next).get(), Some(&1));
    /// assert_eq!(bag.len(), 2);
    /// assert!(bag.erase(bag.end().position()).is_err());
    /// ```
    pub fn erase(&mut self, position: Position) -> Result<Position, Error> {
        let handle = self.tree.resolve(position)?;
        let duplicates = self.tree.node(handle).duplicates;
        if position.duplicate > duplicates {
            return Err(Error::OutOfRange("position refers to an erased element"));
        }

        self.len -= 1;
        if duplicates > 0 {
            self.tree.node_mut(handle).duplicates -= 1;
            // Later repeats shift down by one and take the erased slot.
            if position.duplicate < duplicates {
                return Ok(position);
            }
            return Ok(Position::new(self.tree.successor(Some(handle)), 0));
        }

        let next = self.tree.successor(Some(handle));
        self.tree.remove(handle);
        Ok(Position::new(next, 0))
    }

    /// Exchanges the contents of two multisets.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
        core::mem::swap(&mut self.len, &mut other.len);
    }

    /// Gets an iterator that visits every occurrence in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: RawIter::new(&self.tree),
            front: None,
            back: None,
            remaining: self.len,
        }
    }
}

impl<T: Ord> AvlMultiset<T> {
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(value).is_some()
    }

    /// Returns the number of occurrences of `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMultiset;
    ///
    /// let bag: AvlMultiset<u32> = [21, 22, 23, 26, 26].into_iter().collect();
    /// assert_eq!(bag.count(&26), 2);
    /// assert_eq!(bag.count(&21), 1);
    /// assert_eq!(bag.count(&20), 0);
    /// ```
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(value).map_or(0, |handle| self.tree.node(handle).multiplicity())
    }

    /// Returns a cursor at the first occurrence of `value`, or at the end.
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.find(value), 0)
    }

    /// Returns a cursor at the first element not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.lower_bound(value), 0)
    }

    /// Returns a cursor at the first element greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.upper_bound(value), 0)
    }

    /// Returns the half-open cursor range `[lower_bound, upper_bound)` covering every
    /// occurrence of `value`. Both cursors are equal when `value` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMultiset;
    ///
    /// let bag = AvlMultiset::from([1, 2, 2, 3]);
    /// let (mut first, last) = bag.equal_range(&2);
    /// let mut twos = 0;
    /// while first != last {
    ///     assert_eq!(first.get(), Some(&2));
    ///     twos += 1;
    ///     first.move_next();
    /// }
    /// assert_eq!(twos, 2);
    /// ```
    pub fn equal_range<Q>(&self, value: &Q) -> (Cursor<'_, T>, Cursor<'_, T>)
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        (self.lower_bound(value), self.upper_bound(value))
    }

    /// Adds one occurrence of `value` and returns a cursor at it (the last of its
    /// repeats).
    pub fn insert(&mut self, value: T) -> Cursor<'_, T> {
        let (handle, duplicate) = self.insert_occurrence(value);
        Cursor::new(&self.tree, Some(handle), duplicate)
    }

    fn insert_occurrence(&mut self, value: T) -> (Handle, usize) {
        let handle = self.tree.insert(value, (), KeyMode::Duplicates).handle;
        self.len += 1;
        (handle, self.tree.node(handle).duplicates)
    }

    /// Inserts every value of `values`, returning a cursor per value in argument
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMultiset;
    ///
    /// let mut bag = AvlMultiset::from([1, 2, 3, 4, 4]);
    /// let cursors = bag.insert_many([10, 11, 12, 12]);
    /// assert!(cursors.iter().map(|c| *c.get().unwrap()).eq([10, 11, 12, 12]));
    /// assert!(cursors[2] != cursors[3]);
    /// assert_eq!(bag.len(), 9);
    /// ```
    pub fn insert_many<I>(&mut self, values: I) -> Vec<Cursor<'_, T>>
    where
        I: IntoIterator<Item = T>,
    {
        let occurrences: Vec<_> = values.into_iter().map(|value| self.insert_occurrence(value)).collect();
        let tree = &self.tree;
        occurrences
            .into_iter()
            .map(|(handle, duplicate)| Cursor::new(tree, Some(handle), duplicate))
            .collect()
    }

    /// Removes every occurrence of `value`, returning how many there were.
    pub fn remove<Q>(&mut self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(handle) = self.tree.find(value) else {
            return 0;
        };
        let removed = self.tree.node(handle).multiplicity();
        self.tree.remove(handle);
        self.len -= removed;
        removed
    }

    /// Moves every element of `other` into `self`, leaving `other` empty.
    pub fn merge(&mut self, other: &mut Self) {
        let moved = self.tree.merge(&mut other.tree, KeyMode::Duplicates);
        self.len += moved;
        other.len -= moved;
    }
}

impl<'a, T> Cursor<'a, T> {
    fn new(tree: &'a RawAvlTree<T, ()>, current: Option<Handle>, duplicate: usize) -> Self {
        Cursor {
            raw: RawCursor::new(tree, current),
            duplicate,
        }
    }

    /// Returns the value under the cursor, or `None` at the end.
    #[must_use]
    pub fn get(&self) -> Option<&'a T> {
        self.raw.node().map(|node| &node.key)
    }

    /// Returns the value under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if the cursor is at the end.
    pub fn try_get(&self) -> Result<&'a T, Error> {
        self.get().ok_or(Error::InvalidOperation("dereferencing the end cursor"))
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.raw.current().is_none()
    }

    /// Which repeat of the current value the cursor denotes, counted from zero.
    #[must_use]
    pub fn duplicate(&self) -> usize {
        self.duplicate
    }

    /// Advances to the next occurrence, wrapping from the end to the first one.
    pub fn move_next(&mut self) {
        match self.raw.node() {
            Some(node) if self.duplicate < node.duplicates => self.duplicate += 1,
            _ => {
                self.raw.move_next();
                self.duplicate = 0;
            }
        }
    }

    /// Steps back to the previous occurrence; from the end this is the last repeat of
    /// the largest value.
    pub fn move_prev(&mut self) {
        if self.duplicate > 0 {
            self.duplicate -= 1;
        } else {
            self.raw.move_prev();
            self.duplicate = self.raw.node().map_or(0, |node| node.duplicates);
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.raw.current(), self.duplicate)
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.duplicate == other.duplicate
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("value", &self.get())
            .field("duplicate", &self.duplicate)
            .finish()
    }
}

impl<T: Clone> Clone for AvlMultiset<T> {
    fn clone(&self) -> Self {
        AvlMultiset {
            tree: self.tree.clone(),
            len: self.len,
        }
    }
}

impl<T: Hash> Hash for AvlMultiset<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for AvlMultiset<T> {
    fn eq(&self, other: &AvlMultiset<T>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlMultiset<T> {}

impl<T: fmt::Debug> fmt::Debug for AvlMultiset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for AvlMultiset<T> {
    fn default() -> Self {
        AvlMultiset::new()
    }
}

impl<T: Ord> FromIterator<T> for AvlMultiset<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut multiset = AvlMultiset::new();
        multiset.extend(iter);
        multiset
    }
}

impl<T: Ord> Extend<T> for AvlMultiset<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert_occurrence(value);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for AvlMultiset<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.insert_occurrence(value);
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlMultiset<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> IntoIterator for AvlMultiset<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator moving the contents out in ascending order. Repeats of a value
    /// are clones of the stored one.
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            runs: self.tree.drain().into_iter().map(|(value, (), duplicates)| (value, duplicates + 1)).collect(),
            remaining: self.len,
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlMultiset<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        if !matches!(self.front, Some((_, left)) if left > 0) {
            self.front = match self.nodes.next() {
                Some(node) => Some((&node.key, node.multiplicity())),
                // The rest sits in the run already opened from the back.
                None => self.back.take(),
            };
        }
        let (value, left) = self.front.as_mut()?;
        *left -= 1;
        self.remaining -= 1;
        Some(*value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        if !matches!(self.back, Some((_, left)) if left > 0) {
            self.back = match self.nodes.next_back() {
                Some(node) => Some((&node.key, node.multiplicity())),
                None => self.front.take(),
            };
        }
        let (value, left) = self.back.as_mut()?;
        *left -= 1;
        self.remaining -= 1;
        Some(*value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes.clone(),
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Default for Iter<'_, T> {
    fn default() -> Self {
        Iter {
            nodes: RawIter::empty(),
            front: None,
            back: None,
            remaining: 0,
        }
    }
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let (value, count) = self.runs.front_mut()?;
        self.remaining -= 1;
        if *count > 1 {
            *count -= 1;
            return Some(value.clone());
        }
        self.runs.pop_front().map(|(value, _)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Clone> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        let (value, count) = self.runs.back_mut()?;
        self.remaining -= 1;
        if *count > 1 {
            *count -= 1;
            return Some(value.clone());
        }
        self.runs.pop_back().map(|(value, _)| value)
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T: Clone> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter")
            .field("runs", &self.runs)
            .field("remaining", &self.remaining)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn cursor_walks_repeats_both_ways() {
        let bag = AvlMultiset::from(["This", "is", "is", "multiset"]);
        let mut cursor = bag.begin();
        let mut forward = Vec::new();
        while let Some(value) = cursor.get() {
            forward.push((*value, cursor.duplicate()));
            cursor.move_next();
        }
        assert_eq!(forward, vec![("This", 0), ("is", 0), ("is", 1), ("multiset", 0)]);

        let mut cursor = bag.end();
        let mut backward = Vec::new();
        cursor.move_prev();
        while let Some(value) = cursor.get() {
            backward.push((*value, cursor.duplicate()));
            cursor.move_prev();
        }
        assert_eq!(backward, vec![("multiset", 0), ("is", 1), ("is", 0), ("This", 0)]);
    }

    #[test]
    fn erase_drops_repeats_before_the_node() {
        let mut bag = AvlMultiset::from([7, 7, 7]);
        let position = bag.find(&7).position();
        let position = bag.erase(position).unwrap();
        assert_eq!(bag.count(&7), 2);
        let position = bag.erase(position).unwrap();
        assert_eq!(bag.count(&7), 1);
        let position = bag.erase(position).unwrap();
        assert!(position.is_end());
        assert!(!bag.contains(&7));
        assert!(bag.is_empty());
    }

    #[test]
    fn erase_last_repeat_advances_to_next_value() {
        let mut bag = AvlMultiset::from([1, 1, 2]);
        let mut cursor = bag.begin();
        cursor.move_next();
        let next = bag.erase(cursor.position()).unwrap();
        assert_eq!(bag.cursor_at(next).get(), Some(&2));
        assert_eq!(bag.count(&1), 1);
    }

    #[test]
    fn stale_duplicate_offset_is_rejected() {
        let mut bag = AvlMultiset::from([4, 4]);
        let mut cursor = bag.begin();
        cursor.move_next();
        let second = cursor.position();
        bag.erase(bag.begin().position()).unwrap();
        assert!(matches!(bag.erase(second), Err(Error::OutOfRange(_))));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn iter_meets_in_the_middle_of_a_run() {
        let bag = AvlMultiset::from([5, 5, 5, 5]);
        let mut iter = bag.iter();
        assert_eq!(iter.next(), Some(&5));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.len(), 2);
        assert_eq!(iter.next(), Some(&5));
        assert_eq!(iter.next_back(), Some(&5));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn owned_iter_repeats_values() {
        let bag = AvlMultiset::from([2, 1, 2]);
        let mut iter = bag.into_iter();
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next_back(), Some(2));
        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn pop_first_removes_one_occurrence() {
        let mut bag = AvlMultiset::from([3, 3, 9]);
        assert_eq!(bag.pop_first(), Some(3));
        assert_eq!(bag.count(&3), 1);
        assert_eq!(bag.pop_last(), Some(9));
        assert_eq!(bag.len(), 1);
    }
}
