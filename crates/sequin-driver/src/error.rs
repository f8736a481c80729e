//! Driver-level error types.

use thiserror::Error;

/// The exact message produced when a running query is terminated by
/// `KILL QUERY`. The adapter compares the rendered error against this
/// sentinel to distinguish cancellation from real failures.
pub const QUERY_INTERRUPTED_SENTINEL: &str = "1317 (70100): Query execution was interrupted";

/// An error reported by the MySQL server.
///
/// Rendered as `"{code} ({sqlstate}): {message}"`, matching the format the
/// server uses on the wire and the format the interrupt sentinel is written
/// in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} ({sqlstate}): {message}")]
pub struct ServerError {
    /// Server error code (e.g. 1064 for a syntax error).
    pub code: u16,
    /// Five-character SQLSTATE value.
    pub sqlstate: String,
    /// Human-readable message text.
    pub message: String,
}

impl ServerError {
    /// Create a new server error.
    pub fn new(code: u16, sqlstate: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            sqlstate: sqlstate.into(),
            message: message.into(),
        }
    }

    /// The error produced when a running query is killed (ER_QUERY_INTERRUPTED).
    #[must_use]
    pub fn query_interrupted() -> Self {
        Self::new(1317, "70100", "Query execution was interrupted")
    }
}

/// Errors that can occur at the driver seam.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The server rejected or aborted a statement.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// A cursor was requested while a previous result set on the same
    /// connection was never fully consumed. Recoverable by draining.
    #[error("unread result found")]
    UnreadResult,

    /// A physical connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection was lost mid-operation.
    #[error("lost connection to MySQL server: {0}")]
    Io(String),
}

impl DriverError {
    /// Whether this is the recoverable unread-result condition.
    #[must_use]
    pub fn is_unread_result(&self) -> bool {
        matches!(self, Self::UnreadResult)
    }

    /// Whether this error is the fixed query-interrupt sentinel produced by
    /// `KILL QUERY`. Matched on the full rendered message.
    #[must_use]
    pub fn is_query_interrupted(&self) -> bool {
        match self {
            Self::Server(e) => e.to_string() == QUERY_INTERRUPTED_SENTINEL,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display_format() {
        let e = ServerError::new(1064, "42000", "You have an error in your SQL syntax");
        assert_eq!(
            e.to_string(),
            "1064 (42000): You have an error in your SQL syntax"
        );
    }

    #[test]
    fn interrupt_sentinel_matches() {
        let e = DriverError::from(ServerError::query_interrupted());
        assert!(e.is_query_interrupted());
        assert_eq!(e.to_string(), QUERY_INTERRUPTED_SENTINEL);
    }

    #[test]
    fn other_errors_are_not_interrupts() {
        let e = DriverError::from(ServerError::new(1317, "HY000", "Query execution was interrupted"));
        assert!(!e.is_query_interrupted(), "sqlstate must match exactly");
        assert!(!DriverError::UnreadResult.is_query_interrupted());
        assert!(!DriverError::Io("gone".into()).is_query_interrupted());
    }

    #[test]
    fn unread_result_detection() {
        assert!(DriverError::UnreadResult.is_unread_result());
        assert!(!DriverError::Connect("refused".into()).is_unread_result());
    }
}
