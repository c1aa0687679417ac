use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::raw::{Handle, KeyMode, RawAvlTree, RawCursor, RawIter};
use crate::{Error, Position};

mod access;

/// An ordered map based on an AVL tree.
///
/// Keys are unique. [`insert`](AvlMap::insert) never replaces the value stored under
/// an existing key; use [`insert_or_assign`](AvlMap::insert_or_assign) for that, or
/// [`get_or_insert_default`](AvlMap::get_or_insert_default) to reach a value that is
/// created on first access.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering
/// relative to any other key, as determined by the [`Ord`] trait, changes while it is in
/// the map. The behavior resulting from such a logic error is not specified, but will be
/// encapsulated to the `AvlMap` that observed it and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use avl_collections::AvlMap;
///
/// let mut movie_reviews = AvlMap::new();
/// movie_reviews.insert("Office Space", "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction", "Masterpiece.");
/// movie_reviews.insert("The Godfather", "Very enjoyable.");
///
/// // An existing key keeps its review.
/// let (cursor, inserted) = movie_reviews.insert("Pulp Fiction", "Overrated.");
/// assert!(!inserted);
/// assert_eq!(cursor.value(), Some(&"Masterpiece."));
///
/// movie_reviews.insert_or_assign("Pulp Fiction", "Overrated.");
/// assert_eq!(movie_reviews["Pulp Fiction"], "Overrated.");
///
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
/// ```
pub struct AvlMap<K, V> {
    tree: RawAvlTree<K, V>,
}

/// A cursor over the entries of an [`AvlMap`].
///
/// Behaves like the set cursor: it stands on an entry or on the end sentinel, wraps
/// from the end to the first entry and steps from the end back to the last one.
pub struct Cursor<'a, K, V> {
    raw: RawCursor<'a, K, V>,
}

/// An iterator over the entries of an `AvlMap`, sorted by key.
///
/// This `struct` is created by the [`iter`](AvlMap::iter) method on [`AvlMap`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

/// An iterator over the keys of an `AvlMap`, in ascending order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `AvlMap`, in order by key.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An owning iterator over the entries of an `AvlMap`, sorted by key.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V, usize)>,
}

impl<K, V> AvlMap<K, V> {
    /// Makes a new, empty `AvlMap`. Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        AvlMap { tree: RawAvlTree::new() }
    }

    /// Creates an empty map with room for at least `capacity` entries before the node
    /// arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let map: AvlMap<i32, i32> = AvlMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        AvlMap {
            tree: RawAvlTree::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tree.capacity()
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the largest number of entries a map of this type can hold.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        RawAvlTree::<K, V>::max_size()
    }

    /// Clears the map, removing all entries.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the entry with the smallest key, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let map = AvlMap::from([(2, "b"), (1, "a")]);
    /// assert_eq!(map.first_key_value(), Some((&1, &"a")));
    /// assert_eq!(map.last_key_value(), Some((&2, &"b")));
    /// ```
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.begin().get()
    }

    /// Returns the entry with the largest key, if any.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        Cursor::new(&self.tree, self.tree.last()).get()
    }

    /// Removes and returns the entry with the smallest key, if any.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.tree.first()?;
        Some(self.tree.remove(handle))
    }

    /// Removes and returns the entry with the largest key, if any.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.tree.last()?;
        Some(self.tree.remove(handle))
    }

    /// Returns a cursor at the entry with the smallest key, or at the end.
    pub fn begin(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.tree, self.tree.first())
    }

    /// Returns a cursor at the end sentinel.
    pub fn end(&self) -> Cursor<'_, K, V> {
        Cursor::new(&self.tree, None)
    }

    /// Turns a position back into a cursor.
    pub fn cursor_at(&self, position: Position) -> Cursor<'_, K, V> {
        Cursor::new(&self.tree, position.node)
    }

    /// Removes the entry at `position` and returns the position of the entry after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `position` is the end position; the map is left
    /// unchanged.
    ///
    /// # Examples
    ///
    /// Erasing the entry before the end, over and over, empties the map from the top:
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut map: AvlMap<i32, char> = (1..=3).zip('a'..).collect();
    /// let mut erased = Vec::new();
    /// while !map.is_empty() {
    ///     let mut cursor = map.end();
    ///     cursor.move_prev();
    ///     erased.push(*cursor.key().unwrap());
    ///     let next = map.erase(cursor.position()).unwrap();
    ///     assert!(next.is_end());
    /// }
    /// assert_eq!(erased, [3, 2, 1]);
    /// ```
    pub fn erase(&mut self, position: Position) -> Result<Position, Error> {
        let handle = self.tree.resolve(position)?;
        let next = self.tree.successor(Some(handle));
        self.tree.remove(handle);
        Ok(Position::new(next, 0))
    }

    /// Retains only the entries specified by the predicate, visiting them in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut map: AvlMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, v| {
    ///     *v += 1;
    ///     k % 2 == 0
    /// });
    /// assert!(map.iter().eq([(&0, &1), (&2, &21), (&4, &41), (&6, &61)]));
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.tree.first();
        while let Some(handle) = cursor {
            cursor = self.tree.successor(cursor);
            let node = self.tree.node_mut(handle);
            if !keep(&node.key, &mut node.value) {
                self.tree.remove(handle);
            }
        }
    }

    /// Exchanges the contents of two maps.
    pub fn swap(&mut self, other: &mut Self) {
        self.tree.swap(&mut other.tree);
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let map = AvlMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: RawIter::new(&self.tree),
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let map = AvlMap::from([(2, "b"), (1, "hello")]);
    /// let values: Vec<&str> = map.values().cloned().collect();
    /// assert_eq!(values, ["hello", "b"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.tree.find(key).is_some()
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).value()
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find(key).get()
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut map = AvlMap::from([(1, "a")]);
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.tree.find(key)?;
        Some(&mut self.tree.node_mut(handle).value)
    }

    /// Returns a cursor at the entry for `key`, or at the end if it is absent.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.find(key))
    }

    /// Returns a cursor at the first entry whose key is not less than `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.lower_bound(key))
    }

    /// Returns a cursor at the first entry whose key is greater than `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        Cursor::new(&self.tree, self.tree.upper_bound(key))
    }

    /// Inserts an entry unless the key is already present.
    ///
    /// Returns a cursor at the entry now stored under `key` and whether the new entry
    /// was inserted. An existing entry is left as it was and `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor<'_, K, V>, bool) {
        let insertion = self.tree.insert(key, value, KeyMode::Unique);
        let inserted = insertion.inserted();
        (Cursor::new(&self.tree, Some(insertion.handle)), inserted)
    }

    /// Inserts an entry, or overwrites the value of an existing one.
    ///
    /// The flag is `true` only if the key was new; the stored key is kept either way.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut map = AvlMap::from([(37, "a")]);
    /// let (cursor, inserted) = map.insert_or_assign(37, "b");
    /// assert!(!inserted);
    /// assert_eq!(cursor.get(), Some((&37, &"b")));
    /// ```
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Cursor<'_, K, V>, bool) {
        let insertion = self.tree.insert(key, value, KeyMode::Unique);
        let inserted = insertion.inserted();
        if let Some(value) = insertion.rejected {
            self.tree.node_mut(insertion.handle).value = value;
        }
        (Cursor::new(&self.tree, Some(insertion.handle)), inserted)
    }

    /// Inserts every entry of `entries`, returning one `(cursor, inserted)` pair per
    /// entry in argument order. Existing keys keep their values.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut map = AvlMap::from([(1, 'a')]);
    /// let results = map.insert_many([(2, 'b'), (1, 'z')]);
    /// let flags: Vec<_> = results.iter().map(|(_, inserted)| *inserted).collect();
    /// assert_eq!(flags, [true, false]);
    /// assert_eq!(results[1].0.value(), Some(&'a'));
    /// ```
    pub fn insert_many<I>(&mut self, entries: I) -> Vec<(Cursor<'_, K, V>, bool)>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let insertions: Vec<(Handle, bool)> = entries
            .into_iter()
            .map(|(key, value)| {
                let insertion = self.tree.insert(key, value, KeyMode::Unique);
                (insertion.handle, insertion.inserted())
            })
            .collect();
        let tree = &self.tree;
        insertions
            .into_iter()
            .map(|(handle, inserted)| (Cursor::new(tree, Some(handle)), inserted))
            .collect()
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.tree.find(key)?;
        Some(self.tree.remove(handle))
    }

    /// Moves every entry of `other` whose key is absent from `self` into `self`.
    ///
    /// Entries whose keys are present in both maps stay in `other`, values untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut a = AvlMap::from([(8, 'a'), (5, 'b'), (6, 'c'), (3, 'd')]);
    /// let mut b = AvlMap::from([(6, 'x'), (13, 'y')]);
    /// a.merge(&mut b);
    /// assert!(a.keys().eq([3, 5, 6, 8, 13].iter()));
    /// assert_eq!(a[&6], 'c');
    /// assert_eq!(b.get(&6), Some(&'x'));
    /// assert_eq!(b.len(), 1);
    /// ```
    pub fn merge(&mut self, other: &mut Self) {
        self.tree.merge(&mut other.tree, KeyMode::Unique);
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    fn new(tree: &'a RawAvlTree<K, V>, current: Option<Handle>) -> Self {
        Cursor {
            raw: RawCursor::new(tree, current),
        }
    }

    /// Returns the entry under the cursor, or `None` at the end.
    #[must_use]
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.raw.node().map(|node| (&node.key, &node.value))
    }

    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.raw.node().map(|node| &node.key)
    }

    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.raw.node().map(|node| &node.value)
    }

    /// Returns the entry under the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOperation`] if the cursor is at the end.
    pub fn try_get(&self) -> Result<(&'a K, &'a V), Error> {
        self.get().ok_or(Error::InvalidOperation("dereferencing the end cursor"))
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.raw.current().is_none()
    }

    /// Advances to the next entry, wrapping from the end to the first one.
    pub fn move_next(&mut self) {
        self.raw.move_next();
    }

    /// Steps back to the previous entry; from the end this is the last one.
    pub fn move_prev(&mut self) {
        self.raw.move_prev();
    }

    /// Detaches the cursor's location from the borrow, for use with [`AvlMap::erase`].
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.raw.current(), 0)
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.get()).finish()
    }
}

impl<K: Clone, V: Clone> Clone for AvlMap<K, V> {
    fn clone(&self) -> Self {
        AvlMap {
            tree: self.tree.clone(),
        }
    }
}

impl<K: Hash, V: Hash> Hash for AvlMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for entry in self {
            entry.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlMap<K, V> {
    fn eq(&self, other: &AvlMap<K, V>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for AvlMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    /// Creates an empty `AvlMap`.
    fn default() -> AvlMap<K, V> {
        AvlMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> AvlMap<K, V> {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    /// Inserts every entry; keys already present keep their values.
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.tree.insert(key, value, KeyMode::Unique);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for AvlMap<K, V> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    /// Converts a `[(K, V); N]` into an `AvlMap`. The first of several equal keys wins.
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, K, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V> IntoIterator for AvlMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.tree.drain().into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next().map(|node| (&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<(&'a K, &'a V)> {
        self.next_back()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<(&'a K, &'a V)> {
        self.inner.next_back().map(|node| (&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Iter<'_, K, V> {
    /// Creates an empty `avl_map::Iter`.
    ///
    /// ```
    /// # use avl_collections::avl_map;
    /// let iter: avl_map::Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Iter { inner: RawIter::empty() }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Keys<'_, K, V> {
    fn default() -> Self {
        Keys {
            inner: Iter::default(),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn last(mut self) -> Option<&'a V> {
        self.next_back()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Default for Values<'_, K, V> {
    /// Creates an empty `avl_map::Values`.
    ///
    /// ```
    /// # use avl_collections::avl_map;
    /// let iter: avl_map::Values<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Values {
            inner: Iter::default(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next().map(|(key, value, _)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back().map(|(key, value, _)| (key, value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.as_slice().iter().map(|(key, value, _)| (key, value)))
            .finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: Vec::new().into_iter(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn insert_keeps_the_stored_value() {
        let mut map = AvlMap::from([(1, "one")]);
        let (cursor, inserted) = map.insert(1, "uno");
        assert!(!inserted);
        assert_eq!(cursor.get(), Some((&1, &"one")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn insert_or_assign_reports_new_keys() {
        let mut map = AvlMap::new();
        assert!(map.insert_or_assign(5, 'a').1);
        assert!(!map.insert_or_assign(5, 'b').1);
        assert_eq!(map.get(&5), Some(&'b'));
    }

    #[test]
    fn erase_end_is_out_of_range() {
        let mut map = AvlMap::from([(1, ())]);
        let end = map.end().position();
        assert_eq!(map.erase(end), Err(Error::OutOfRange("position is past the end")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn into_iter_moves_entries_in_order() {
        let map = AvlMap::from([(3, 'c'), (1, 'a'), (2, 'b')]);
        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(entries, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }
}
