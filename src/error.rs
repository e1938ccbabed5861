//! Error types for the laser-path crate.

use std::error::Error as StdError;
use std::fmt;

/// Crate-wide error type.
///
/// Two classes matter here: configuration errors surfaced at construction
/// time, and internal invariant violations that indicate a bug rather than
/// bad input. Internal errors abort the operation; callers must not try to
/// salvage partial data from them.
#[derive(Debug)]
pub enum Error {
    /// Invalid tuning values or API misuse (non-positive rate, oversized
    /// path, negative density). Fail-fast; never silently clamped.
    InvalidConfig(String),

    /// An internal invariant was violated (unequal sample-array lengths,
    /// out-of-range beam state). This is a bug, not a user-facing condition.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for Error {}

impl Error {
    /// Create an invalid config error with a message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Create an internal error with a message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// Returns true if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }

    /// Returns true if this is an internal invariant violation.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::Internal(_))
    }
}

/// Result type for laser-path operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::invalid_config("sample_rate must be > 0");
        assert_eq!(
            e.to_string(),
            "invalid configuration: sample_rate must be > 0"
        );
        assert!(e.is_invalid_config());
        assert!(!e.is_internal());

        let e = Error::internal("sample arrays diverged");
        assert_eq!(e.to_string(), "internal error: sample arrays diverged");
        assert!(e.is_internal());
    }
}
