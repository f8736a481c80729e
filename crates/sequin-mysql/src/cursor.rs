//! The adapter's result cursor.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use sequin_driver::{Column, Cursor, Value};
use sequin_pool::PooledConnection;

use crate::error::AdapterError;
use crate::types::short_type;

/// A lazily-materialized result set bound to one pooled connection.
///
/// The connection stays checked out (and registered in the in-use set for
/// cancellation) until the cursor is finalized. [`MysqlCursor::fetch_all`]
/// is a one-shot terminal operation: whatever its outcome, it drains the
/// connection, returns it to the pool, and deregisters it.
pub struct MysqlCursor {
    conn: Option<PooledConnection>,
    cursor: Option<Box<dyn Cursor>>,
    columns: Vec<(String, String)>,
    limit: Option<usize>,
    in_use: Arc<Mutex<HashSet<u32>>>,
}

impl std::fmt::Debug for MysqlCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlCursor")
            .field("columns", &self.columns)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl MysqlCursor {
    pub(crate) fn new(
        conn: PooledConnection,
        cursor: Box<dyn Cursor>,
        description: Vec<Column>,
        in_use: Arc<Mutex<HashSet<u32>>>,
    ) -> Self {
        // Metadata is snapshotted here; the live driver cursor may be torn
        // down before columns() is ever read.
        let columns = description
            .into_iter()
            .map(|c| (c.name, short_type(c.column_type).to_string()))
            .collect();
        Self {
            conn: Some(conn),
            cursor: Some(cursor),
            columns,
            limit: None,
            in_use,
        }
    }

    /// Ordered `(name, short_type)` pairs for the result columns.
    ///
    /// Duplicate names are reported unaltered, exactly as the server sent
    /// them.
    #[must_use]
    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    /// Cap the number of rows a subsequent [`MysqlCursor::fetch_all`]
    /// returns.
    #[must_use]
    pub fn set_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Fetch the result rows and finalize the cursor.
    ///
    /// Returns every remaining row, or at most the configured limit. A fetch
    /// terminated by `cancel()` yields an empty row set rather than an
    /// error. On every exit path the cursor is closed, the connection is
    /// drained and released, and its id leaves the in-use set.
    pub fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>, AdapterError> {
        let fetched = match self.cursor.as_mut() {
            Some(cursor) => match self.limit {
                None => cursor.fetch_all(),
                Some(n) => cursor.fetch_many(n),
            },
            None => Ok(Vec::new()),
        };
        let outcome = match fetched {
            Ok(rows) => Ok(rows),
            Err(e) if e.is_query_interrupted() => {
                tracing::debug!("fetch interrupted by cancellation");
                Ok(Vec::new())
            }
            Err(e) => Err(AdapterError::query(e)),
        };
        self.finalize();
        outcome
    }

    /// Abandon the result set without fetching.
    pub fn close(mut self) {
        self.finalize();
    }

    /// Idempotent teardown. Driver faults here must never mask the fetch
    /// outcome, so they are logged and dropped.
    fn finalize(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(e) = cursor.close() {
                tracing::debug!(error = %e, "cursor close failed during teardown");
            }
        }
        if let Some(mut conn) = self.conn.take() {
            if let Err(e) = conn.drain_results() {
                tracing::debug!(error = %e, "drain failed during teardown");
            }
            self.in_use.lock().remove(&conn.connection_id());
        }
    }
}

impl Drop for MysqlCursor {
    fn drop(&mut self) {
        self.finalize();
    }
}
