//! Ordered collections backed by an arena-allocated AVL tree.
//!
//! This crate provides [`AvlSet`], [`AvlMultiset`] and [`AvlMap`], ordered containers
//! with the familiar `std` surface (`insert`, `get`, `remove`, double-ended `iter`,
//! `FromIterator`, ...) plus a cursor API in the style of C++'s `set`, `multiset` and
//! `map`:
//!
//! - `begin()` / `end()` / `find()` / `lower_bound()` / `upper_bound()` return a
//!   [`Cursor`](avl_set::Cursor) that steps through the sorted order in both directions.
//! - `insert` reports the position of the element together with whether it was new.
//! - `erase` takes a detached [`Position`] and returns the position that follows the
//!   erased element, so elements can be removed while walking the collection.
//!
//! # Example
//!
//! ```
//! use avl_collections::{AvlMap, Error};
//!
//! let mut numbers = AvlMap::new();
//! numbers.insert(1, "one");
//! numbers.insert(2, "two");
//!
//! assert_eq!(numbers.at(&1), Ok(&"one"));
//! assert!(matches!(numbers.at(&3), Err(Error::OutOfRange(_))));
//!
//! // Walk the map backwards with a cursor, starting from the end sentinel.
//! let mut cursor = numbers.end();
//! cursor.move_prev();
//! assert_eq!(cursor.get(), Some((&2, &"two")));
//! ```
//!
//! # Implementation
//!
//! All three collections share one AVL tree whose nodes live in an arena and refer to
//! each other by index, parent links included. Each tree carries a sentinel that marks
//! the end of iteration and caches the minimum and maximum, so `begin()` and
//! `end().move_prev()` are O(1) and a cursor walks the tree without recursion or an
//! auxiliary stack. Multisets keep one node per distinct key with a count of repeats.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod position;
mod raw;

pub mod avl_map;
pub mod avl_multiset;
pub mod avl_set;

pub use avl_map::AvlMap;
pub use avl_multiset::AvlMultiset;
pub use avl_set::AvlSet;
pub use error::Error;
pub use position::Position;
