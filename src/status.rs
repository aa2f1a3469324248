//! Status codes returned by store operations
//!
//! Stores report failures with a compact `Status` code; the benchmark layer
//! lifts these into [`crate::error::BenchError`] with the key that triggered them.

use std::fmt;

/// Status code returned by `KvStore` operations and the record codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Status {
    /// Operation completed successfully
    #[default]
    Ok = 0,
    /// Key was not found
    NotFound = 1,
    /// Encoded record bytes are malformed
    Corruption = 2,
    /// Invalid argument provided (e.g. record does not match the schema)
    InvalidArgument = 3,
    /// Invalid operation in current state (e.g. store already closed)
    InvalidOperation = 4,
    /// Operation was aborted by the store
    Aborted = 5,
    /// A size limit of the record layout was exceeded
    ResourceExhausted = 6,
}

impl Status {
    /// Check if the status indicates success
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    /// Check if the key was not found
    #[inline]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Status::NotFound)
    }

    /// Check if the status indicates an error
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(
            self,
            Status::Corruption
                | Status::InvalidArgument
                | Status::InvalidOperation
                | Status::Aborted
                | Status::ResourceExhausted
        )
    }

    /// Get the status as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "Ok",
            Status::NotFound => "NotFound",
            Status::Corruption => "Corruption",
            Status::InvalidArgument => "InvalidArgument",
            Status::InvalidOperation => "InvalidOperation",
            Status::Aborted => "Aborted",
            Status::ResourceExhausted => "ResourceExhausted",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::error::Error for Status {}
