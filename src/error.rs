//! Error types for the calculation library.
use thiserror::Error;

/// Errors which can occur when loading a process configuration or running a calculation.
///
/// None of these leave partial output behind: a failed calculation produces no records at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MfcaError {
    /// The configuration blob is absent, unreadable or structurally invalid
    #[error("Malformed process configuration: {0}")]
    MalformedConfiguration(String),

    /// A dynamically supplied material input row violates a field constraint
    #[error("Invalid material input at row {row}: {reason}")]
    InvalidInputItem {
        /// 0-based index of the offending row
        row: usize,
        /// Which constraint was violated
        reason: String,
    },

    /// A calculation was attempted before any configuration was successfully loaded
    #[error("Please configure the process before running a calculation")]
    NotConfigured,
}

/// Shorthand for results returned by the calculation library
pub type MfcaResult<T> = Result<T, MfcaError>;
