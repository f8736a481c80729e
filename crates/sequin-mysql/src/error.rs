//! Adapter error types.

use thiserror::Error;

/// Errors surfaced by the adapter to its caller (the interactive tool).
///
/// Pool exhaustion is deliberately split by call site: the execute path
/// reports it as `Ok(None)` (a backpressure signal, not a fault), while the
/// catalog-introspection path raises [`AdapterError::ConnectionExhausted`]
/// because catalog population is not retried on demand.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Malformed adapter configuration, caught before any network activity.
    #[error("adapter received bad config value: {0}")]
    Config(String),

    /// The connection pool could not be established at connect time.
    #[error("could not connect to the database: {0}")]
    Connection(String),

    /// A server-reported fault during statement execution or fetch.
    /// Carries the server's message verbatim.
    #[error("{message}")]
    Query {
        /// The server's error message.
        message: String,
    },

    /// No pooled connection was available for a catalog introspection query.
    #[error("connection pool is exhausted; all connections are in use")]
    ConnectionExhausted,
}

impl AdapterError {
    /// Wrap a driver fault as a query error, preserving its message.
    pub(crate) fn query(e: impl std::fmt::Display) -> Self {
        Self::Query {
            message: e.to_string(),
        }
    }
}
