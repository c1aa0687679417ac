use thiserror::Error;

/// Errors reported by the collections in this crate.
///
/// Every fallible operation checks its preconditions before touching the tree, so a
/// returned error means the collection is unchanged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A key or position lies outside the collection: `at` on an absent key, or
    /// `erase` at the end position.
    #[error("out of range: {0}")]
    OutOfRange(&'static str),

    /// The operation is not defined for the cursor's current state, such as reading
    /// the element under an end cursor.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_condition() {
        assert_eq!(Error::OutOfRange("key not found").to_string(), "out of range: key not found");
        assert_eq!(
            Error::InvalidOperation("cursor is at the end").to_string(),
            "invalid operation: cursor is at the end"
        );
    }
}
