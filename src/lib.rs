#![forbid(unsafe_code)]

// red-black tree (single-threaded, arena backed)
pub mod rbtree;

pub use rbtree::{Color, InvariantViolation, Iter, NodeRef, RBTree};
