//! Connection, cursor, and factory traits.
//!
//! These traits are the boundary between the adapter and a concrete MySQL
//! driver. The pool and adapter are written entirely against them; tests use
//! the in-memory implementation from `sequin-testing`.

use crate::config::ConnectionConfig;
use crate::error::DriverError;
use crate::types::{Column, Value};

/// Opens physical connections. Implemented by concrete drivers.
pub trait ConnectionFactory: Send + Sync {
    /// Establish a new physical connection.
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, DriverError>;
}

/// A physical MySQL connection.
///
/// At any instant a connection is owned by exactly one party: the pool's
/// idle set or a single checkout. A connection allows at most one unfetched
/// result set; [`Connection::cursor`] fails with
/// [`DriverError::UnreadResult`] while one is pending.
pub trait Connection: Send {
    /// The server-assigned connection (thread) id, used by `KILL QUERY`.
    fn connection_id(&self) -> u32;

    /// The session's current database, if one is selected.
    fn database(&self) -> Option<String>;

    /// Switch the session to another database (`COM_INIT_DB`).
    fn select_database(&mut self, database: &str) -> Result<(), DriverError>;

    /// Create a statement cursor.
    ///
    /// With `buffered` set, the driver materializes all rows at execute time
    /// and the connection carries no pending result afterwards; unbuffered
    /// cursors stream and keep the connection busy until fetched or drained.
    fn cursor(&mut self, buffered: bool) -> Result<Box<dyn Cursor>, DriverError>;

    /// Consume and discard any pending result sets on this connection.
    fn drain_results(&mut self) -> Result<(), DriverError>;

    /// Close the physical connection. Infallible; errors during teardown
    /// are the driver's to swallow.
    fn close(&mut self);
}

/// A statement cursor bound to one connection.
pub trait Cursor: Send {
    /// Execute a statement verbatim.
    fn execute(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Column metadata of the last executed statement.
    ///
    /// `Some` iff the statement produced a result set; `None` for DDL/DML.
    fn description(&self) -> Option<Vec<Column>>;

    /// Fetch every remaining row.
    fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>, DriverError>;

    /// Fetch at most `n` rows (fewer if the result set is smaller).
    fn fetch_many(&mut self, n: usize) -> Result<Vec<Vec<Value>>, DriverError>;

    /// Close the cursor, discarding any unfetched rows of the current set.
    fn close(&mut self) -> Result<(), DriverError>;
}
