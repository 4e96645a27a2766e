#![doc = include_str!("../README.md")]

mod engine;
mod error;
pub mod kdtree;
mod linear;
mod r#type;

pub use engine::{QueryEngine, QueryMode, QueryOptions};
pub use error::{KdTreeError, Result};
pub use linear::{nearest_naive, nearest_naive_with_distance};
pub use r#type::{Axis, IndexableFloat, Point};

#[cfg(test)]
pub(crate) mod test;
