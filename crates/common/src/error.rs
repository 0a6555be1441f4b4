//! Common error types for optx

use thiserror::Error;

/// Common error type used across optx crates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Address could not be decoded from its hex form
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress { input: String, reason: String },
}

/// Result type alias using the common Error type
pub type Result<T> = std::result::Result<T, Error>;
