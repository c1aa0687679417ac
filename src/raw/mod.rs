mod arena;
mod cursor;
mod handle;
mod node;
mod raw_avl_tree;

pub(crate) use cursor::{RawCursor, RawIter};
pub(crate) use handle::Handle;
pub(crate) use raw_avl_tree::{KeyMode, RawAvlTree};
