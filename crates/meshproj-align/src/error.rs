//! Error types for view alignment.

use thiserror::Error;

/// Errors that can occur while aligning a selection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    /// Nothing left to align.
    #[error("selection is empty")]
    EmptySelection,

    /// The parent's world transform cannot be inverted.
    #[error("object {0} has a singular world transform")]
    SingularTransform(String),
}

/// Result type for alignment operations.
pub type Result<T> = std::result::Result<T, AlignError>;
