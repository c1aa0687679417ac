use crate::raw::Handle;

/// A detached cursor position.
///
/// Cursors borrow their collection, so they cannot be held across a mutation. A
/// `Position` carries the same location without the borrow and is what the `erase`
/// methods consume. Obtain one with `Cursor::position()`.
///
/// A position stays meaningful until the element it denotes is erased. Using it
/// afterwards (or on a different collection) is a logic error: the call may fail with
/// [`Error::OutOfRange`](crate::Error::OutOfRange), panic, or act on another element,
/// but it never causes undefined behavior.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    pub(crate) node: Option<Handle>,
    /// Which repeat of a multiset key, counted from zero. Always zero for sets and maps.
    pub(crate) duplicate: usize,
}

impl Position {
    pub(crate) const fn new(node: Option<Handle>, duplicate: usize) -> Self {
        Self { node, duplicate }
    }

    /// Returns `true` for the past-the-end position.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_collections::AvlSet;
    ///
    /// let set = AvlSet::from([1]);
    /// assert!(set.end().position().is_end());
    /// assert!(!set.begin().position().is_end());
    /// ```
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }
}
