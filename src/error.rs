use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdTreeError {
    /// The provided points cannot be indexed or searched, e.g. an empty point set or a point
    /// with a non-finite coordinate.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, KdTreeError>;
