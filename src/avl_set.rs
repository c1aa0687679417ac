use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::raw::{KeyMode, RawAvlTree, RawCursor, RawIter};
use crate::{Error, Position};

/// An ordered set of unique values, based on an AVL tree.
///
/// Inserting a value that is already present leaves the set unchanged and reports
/// `false`, together with a cursor to the stored value.
///
/// It is a logic error for a value to be modified in such a way that its ordering
/// relative to any other value, as determined by the [`Ord`] trait, changes while it is
/// in the set. The behavior resulting from such a logic error is not specified, but
/// will be encapsulated to the `AvlSet` that observed it and not result in undefined
/// behavior.
///
/// # Examples
///
/// ```
/// use avl_collections::AvlSet;
///
/// let mut set = AvlSet::from([8, 3, 7, 2, 4, 6, 8, 4]);
/// assert_eq!(set.len(), 6);
///
/// let (cursor, inserted) = set.insert(5);
/// assert!(inserted);
/// assert_eq!(cursor.get(), Some(&5));
///
/// assert!(set.iter().copied().eq([2, 3, 4, 5, 6, 7, 8]));
/// ```
pub struct AvlSet<T> {
    tree: RawAvlTree<T, ()>,
}

/// A cursor over an [`AvlSet`].
///
/// A cursor points either at an element or at the end sentinel. Moving forward from
/// the end wraps to the first element; moving backward from the end reaches the last.
/// Two cursors compare equal when they borrow the same set and point at the same
/// place, so every `end()` of one set compares equal to every other.
pub struct Cursor<'a, T> {
    raw: RawCursor<'a, T, ()>,
}

/// An iterator over the values of an `AvlSet`, in ascending order.
///
/// This `struct` is created by the [`iter`](AvlSet::iter) method on [`AvlSet`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: RawIter<'a, T, ()>,
}

/// An owning iterator over the values of an `AvlSet`, in ascending order.
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<(T, (), usize)>,
}

impl<T> AvlSet<T> {
    /// Makes a new, empty `AvlSet`. Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let set: AvlSet<i32> = AvlSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        AvlSet { tree: RawAvlTree::new() }
    }

    /// Creates an empty set with room for at least `capacity` values before the node
    /// arena reallocates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlSet {
            tree: RawAvlTree::with_capacity(capacity),
        }
    }

    /// Returns the number of values the node arena can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the number of values in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the set contains no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the largest number of values a set of this type can hold.
    ///
    /// Derived from the arena's index width and the node size; it is a reporting
    /// value and not reachable in practice.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        RawAvlTree::<T, ()>::max_size()
    }

    /// Removes every value from the set.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns a reference to the smallest value, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut set = AvlSet::new();
    /// assert_eq!(set.first(), None);
    /// set.insert(2);
    /// set.insert(1);
    /// assert_eq!(set.first(), Some(&1));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.begin().get()
    }

    /// Returns a reference to the largest value, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last().map(|handle| &self.tree.node(handle).key)
    }

    /// Removes and returns the smallest value, if any.
    pub fn pop_first(&mut self) -> Option<T> {
        let handle = self.tree.first()?;
        Some(self.tree.remove(handle).0)
    }

    /// Removes and returns the largest value, if any.
    pub fn pop_last(&mut self) -> Option<T> {
        let handle = self.tree.last()?;
        Some(self.tree.remove(handle).0)
    }

    /// Returns a cursor at the smallest value, or at the end if the set is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(&self.tree, self.tree.first())
    }

    /// Returns a cursor at the end sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let set = AvlSet::from([1, 2, 3]);
    /// let mut cursor = set.end();
    /// assert_eq!(cursor.get(), None);
    /// cursor.move_prev();
    /// assert_eq!(cursor.get(), Some(&3));
    /// ```
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(&self.tree, None)
    }

    /// Removes the value at `position` and returns the position of the value after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `position` is the end position; the set is left
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::{AvlSet, Error};
    ///
    /// let mut set = AvlSet::from([1, 2, 3]);
    /// let next = set.erase(set.begin().position()).unwrap();
    /// assert_eq!(set.cursor_at(next).get(), Some(&2));
    /// assert!(matches!(set.erase(set.end().position()), Err(Error::OutOfRange(_))));
    /// assert_eq!(set.len(), 2);
    /// ```
    pub fn erase(&mut self, position: Position) -> Result<Position, Error> {
        let handle = self.tree.resolve(position)?;
        let next = self.tree.successor(Some(handle));
        self.tree.remove(handle);
        Ok(Position::new(next, 0))
    }

    /// Turns a position back into a cursor.
    pub fn cursor_at(&self, position: Position) -> Cursor<'_, T> {
        Cursor::new(&self.tree, position.node)
    }

    /// Retains only the values specified by the predicate, visiting them in
    /// ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut set: AvlSet<i32> = (0..8).collect();
    /// set.retain(|&k| k % 2 == 0);
    /// assert!(set.iter().eq([0, 2, 4, 6].iter()));
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut cursor = self.tree.first();
        while let Some(handle) = cursor {
            cursor = self.tree.successor(cursor);
            if !keep(&self.tree.node(handle).key) {
                self.tree.remove(handle);
            }
        }
    }

    /// Exchanges the contents of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut a = AvlSet::from([1]);
    /// let mut b = AvlSet::from([3, 4, 5]);
    /// a.swap(&mut b);
    /// assert_eq!((a.len(), b.len()), (3, 1));
    /// assert_eq!(a.first(), Some(&3));
    /// ```
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Gets an iterator that visits the values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: RawIter::new(&self.tree),
        }
    }
}

impl<T: Ord> AvlSet<T> {
    /// Returns `true` if the set contains a value equal to `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(value).is_some()
    }

    /// Returns a reference to the stored value equal to `value`, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(value).get()
    }

    /// Returns a cursor at `value`, or at the end if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let set = AvlSet::from(["apple", "banana", "cherry"]);
    /// assert_eq!(set.find("banana").get(), Some(&"banana"));
    /// assert!(set.find("durian").is_end());
    /// assert!(set.find("durian") == set.end());
    /// ```
    pub fn find<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.find(value))
    }

    /// Returns a cursor at the first value not less than `value`.
    pub fn lower_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.lower_bound(value))
    }

    /// Returns a cursor at the first value greater than `value`.
    pub fn upper_bound<Q>(&self, value: &Q) -> Cursor<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.upper_bound(value))
    }

    /// Adds a value to the set.
    ///
    /// Returns a cursor at the stored value and whether `value` was newly inserted. If
    /// an equal value was already present, the set keeps it and drops `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut set = AvlSet::from(["This", "is", "my", "set"]);
    /// assert!(!set.insert("is").1);
    /// let (cursor, inserted) = set.insert("best");
    /// assert!(inserted);
    /// assert_eq!(cursor.get(), Some(&"best"));
    /// ```
    pub fn insert(&mut self, value: T) -> (Cursor<'_, T>, bool) {
        let insertion = self.tree.insert(value, (), KeyMode::Unique);
        let inserted = insertion.inserted();
        (Cursor::new(&self.tree, Some(insertion.handle)), inserted)
    }

    /// Inserts every value of `values`, returning one `(cursor, inserted)` pair per
    /// value in argument order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut set = AvlSet::from([1, 2, 3, 4, 4]);
    /// let results = set.insert_many([10, 11, 12, 12]);
    /// let summary: Vec<_> = results.iter().map(|(c, new)| (*c.get().unwrap(), *new)).collect();
    /// assert_eq!(summary, [(10, true), (11, true), (12, true), (12, false)]);
    /// assert_eq!(set.len(), 7);
    /// ```
    pub fn insert_many<I>(&mut self, values: I) -> Vec<(Cursor<'_, T>, bool)>
    where
        I: IntoIterator<Item = T>,
    {
        let insertions: Vec<_> = values
            .into_iter()
            .map(|value| {
                let insertion = self.tree.insert(value, (), KeyMode::Unique);
                (insertion.handle, insertion.inserted())
            })
            .collect();
        let tree = &self.tree;
        insertions
            .into_iter()
            .map(|(handle, inserted)| (Cursor::new(tree, Some(handle)), inserted))
            .collect()
    }

    /// Removes a value from the set. Returns whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`, if any.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.tree.find(value)?;
        Some(self.tree.remove(handle).0)
    }

    /// Moves every value of `other` that is not already in `self` into `self`.
    ///
    /// Values present in both sets stay in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let mut a = AvlSet::from([1, 4]);
    /// let mut b = AvlSet::from([3, 4, 5]);
    /// a.merge(&mut b);
    /// assert!(a.iter().eq([1, 3, 4, 5].iter()));
    /// assert!(b.iter().eq([4].iter()));
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge(&mut other.tree, KeyMode::Unique);
    }
}

impl<'a, T> Cursor<'a, T> {
    fn new(tree: &'a RawAvlTree<T, ()>, current: Option<crate::raw::Handle>) -> Self {
        Cursor {
            raw: RawCursor::new(tree, current),
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

    /// Returns `true` if the cursor is at the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.raw.current().is_none()
    }

    /// Advances to the next value; from the last value this reaches the end, and from
    /// the end it wraps to the first value.
    pub fn move_next(&mut self) {
        self.raw.move_next();
    }

    /// Steps back to the previous value; from the first value this reaches the end,
    /// and from the end it moves to the last value.
    pub fn move_prev(&mut self) {
        self.raw.move_prev();
    }

    /// Detaches the cursor's location from the borrow, for use with
    /// [`AvlSet::erase`].
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.raw.current(), 0)
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
        self.raw == other.raw
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<T: Clone> Clone for AvlSet<T> {
    fn clone(&self) -> Self {
        AvlSet {
            tree: self.tree.clone(),
        }
    }
}

impl<T: Hash> Hash for AvlSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for AvlSet<T> {
    fn eq(&self, other: &AvlSet<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for AvlSet<T> {}

impl<T: fmt::Debug> fmt::Debug for AvlSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for AvlSet<T> {
    fn default() -> AvlSet<T> {
        AvlSet::new()
    }
}

impl<T: Ord> FromIterator<T> for AvlSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> AvlSet<T> {
        let mut set = AvlSet::new();
        set.extend(iter);
        set
    }
}

impl<T: Ord> Extend<T> for AvlSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: 'a + Ord + Copy> Extend<&'a T> for AvlSet<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for AvlSet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> IntoIterator for AvlSet<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an iterator for moving out the set's contents in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let set = AvlSet::from([3, 1, 2]);
    /// let v: Vec<_> = set.into_iter().collect();
    /// assert_eq!(v, [1, 2, 3]);
    /// ```
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.tree.drain().into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a AvlSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|node| &node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a T> {
        self.next_back()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        self.inner.next_back().map(|node| &node.key)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Default for Iter<'_, T> {
    /// Creates an empty `avl_set::Iter`.
    ///
    /// ```
    /// # use avl_collections::avl_set;
    /// let iter: avl_set::Iter<'_, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter { inner: RawIter::empty() }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(value, (), _)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(value, (), _)| value)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice().iter().map(|(value, (), _)| value)).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn insert_existing_returns_cursor_to_stored_value() {
        let mut set = AvlSet::from([5, 4, 3]);
        let (cursor, inserted) = set.insert(4);
        assert!(!inserted);
        assert_eq!(cursor.get(), Some(&4));
        let position = cursor.position();
        assert_eq!(set.find(&4).position(), position);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn erase_and_advance_walks_the_whole_set() {
        let mut set: AvlSet<i32> = (0..50).collect();
        let mut position = set.begin().position();
        let mut erased = 0;
        while !position.is_end() {
            position = set.erase(position).unwrap();
            erased += 1;
        }
        assert_eq!(erased, 50);
        assert!(set.is_empty());
    }

    #[test]
    fn try_get_at_end_is_invalid() {
        let set: AvlSet<u8> = AvlSet::new();
        assert_eq!(set.end().try_get(), Err(Error::InvalidOperation("dereferencing the end cursor")));
        assert!(set.begin().is_end());
    }

    #[test]
    fn max_size_is_positive() {
        let set: AvlSet<u64> = AvlSet::new();
        assert!(set.max_size() > 0);
    }
}
