//! Error types for table detection.
//!
//! The engine is almost entirely infallible: degenerate input (no content,
//! too few dividers, a grid that simplifies away) is a normal outcome and
//! reports zero tables rather than an error. The only failure surfaced to
//! callers is a page that violates the documented preconditions.

use thiserror::Error;

/// Errors reported by the public API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GridTableError {
    /// The page's block tree violates a precondition of
    /// [`detect_tables`](crate::hunt::detect_tables): struct sibling indices
    /// must be strictly increasing per parent and all geometry finite.
    #[error("malformed page: {reason}")]
    MalformedPage {
        /// Which precondition failed, and where in the tree.
        reason: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridTableError>;
