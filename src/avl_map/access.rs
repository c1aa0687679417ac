use core::borrow::Borrow;
use core::ops::Index;

use super::AvlMap;
use crate::Error;
use crate::raw::KeyMode;

impl<K: Ord, V> AvlMap<K, V> {
    /// Returns a reference to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::{AvlMap, Error};
    ///
    /// let map = AvlMap::from([(1, "one")]);
    /// assert_eq!(map.at(&1), Ok(&"one"));
    /// assert!(matches!(map.at(&2), Err(Error::OutOfRange(_))));
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(key).ok_or(Error::OutOfRange("key not found"))
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the key is absent; the map is not modified.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_mut(key).ok_or(Error::OutOfRange("key not found"))
    }

    /// Returns a mutable reference to the value under `key`, first inserting
    /// `V::default()` if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlMap;
    ///
    /// let mut counts: AvlMap<&str, u32> = AvlMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let handle = match self.tree.find(&key) {
            Some(handle) => handle,
            None => self.tree.insert(key, V::default(), KeyMode::Unique).handle,
        };
        &mut self.tree.node_mut(handle).value
    }
}

impl<K, Q, V> Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `AvlMap`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}
