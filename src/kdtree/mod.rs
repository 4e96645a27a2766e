//! An immutable 2D kd-tree built by recursive median splits.

#![warn(missing_docs)]

mod builder;
mod index;
mod r#trait;
pub mod traversal;

pub use builder::KdTreeBuilder;
pub use index::{KdNode, KdTree};
pub use r#trait::KdTreeIndex;
pub use traversal::{Cell, Node, Split};

#[cfg(test)]
mod test;
