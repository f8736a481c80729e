//! The adapter connection: pooled execution, cancellation, and catalog
//! introspection.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use sequin_driver::{Cursor, Value};
use sequin_pool::{Pool, PooledConnection};

use crate::catalog::{Catalog, CatalogItem, RelationKind};
use crate::cursor::MysqlCursor;
use crate::error::AdapterError;
use crate::types::short_column_type;

/// Matches a statement that switches the session's active database and
/// captures the target name: 1-64 characters, stopping at whitespace,
/// quoting, and path/wildcard specials.
static USE_DATABASE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)^\s*use\s+([^\s;`'"\\/.*?%]{1,64})"#).unwrap());

const LIST_DATABASES: &str = "\
show databases
where `Database` not in (
    'sys', 'information_schema', 'performance_schema', 'mysql'
)";

/// An open adapter connection owning the pool for its lifetime.
///
/// All methods take `&self`; the pool and the in-use connection-id set are
/// the only shared mutable state, both behind their own locks, so the
/// connection can be driven from concurrently-issued operations (the
/// interactive tool runs queries on worker threads).
pub struct MysqlConnection {
    pool: Pool,
    /// Ids of connections checked out with an unfetched result cursor.
    /// This set is the sole state cancellation acts upon.
    in_use: Arc<Mutex<HashSet<u32>>>,
}

impl std::fmt::Debug for MysqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MysqlConnection")
            .finish_non_exhaustive()
    }
}

impl MysqlConnection {
    pub(crate) fn new(pool: Pool) -> Self {
        Self {
            pool,
            in_use: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Check out a connection and open a cursor on it.
    ///
    /// Returns `Ok(None)` when the pool is exhausted. If the checked-out
    /// connection still carries an unread result set (a recoverable leftover
    /// from earlier misuse), it is drained and cursor creation is retried
    /// exactly once; a second failure propagates.
    pub fn acquire(
        &self,
        buffered: bool,
    ) -> Result<Option<(PooledConnection, Box<dyn Cursor>)>, AdapterError> {
        let Some(mut conn) = self.pool.try_acquire().map_err(AdapterError::query)? else {
            return Ok(None);
        };
        match conn.cursor(buffered) {
            Ok(cursor) => Ok(Some((conn, cursor))),
            Err(e) if e.is_unread_result() => {
                tracing::debug!(
                    connection_id = conn.connection_id(),
                    "unread results on checkout; draining and retrying cursor"
                );
                conn.drain_results().map_err(AdapterError::query)?;
                let cursor = conn.cursor(buffered).map_err(AdapterError::query)?;
                Ok(Some((conn, cursor)))
            }
            Err(e) => Err(AdapterError::query(e)),
        }
    }

    /// Execute one statement.
    ///
    /// Returns `Ok(Some(cursor))` when the statement produced a result set;
    /// the connection stays checked out until the cursor is finalized.
    /// Returns `Ok(None)` for statements without a result set (DDL/DML),
    /// for a statement killed by [`MysqlConnection::cancel`], and, as a
    /// silent backpressure signal, when the pool is exhausted; callers
    /// must treat the latter as "could not run, try again later."
    pub fn execute(&self, sql: &str) -> Result<Option<MysqlCursor>, AdapterError> {
        let outcome = self.run_statement(sql);
        // Inspected on every outcome path: a database switch must reach the
        // pool even when the statement itself failed or was shed.
        self.sync_session_state(sql);
        outcome
    }

    fn run_statement(&self, sql: &str) -> Result<Option<MysqlCursor>, AdapterError> {
        let Some((conn, mut cursor)) = self.acquire(false)? else {
            tracing::debug!("pool exhausted; statement shed");
            return Ok(None);
        };
        let id = conn.connection_id();
        // Registered before execution so a concurrently-issued cancel can
        // already find and kill this connection.
        self.in_use.lock().insert(id);
        tracing::debug!(connection_id = id, sql, "executing statement");

        match cursor.execute(sql) {
            Err(e) if e.is_query_interrupted() => {
                tracing::debug!(connection_id = id, "statement killed by cancellation");
                self.in_use.lock().remove(&id);
                Ok(None)
            }
            Err(e) => {
                self.in_use.lock().remove(&id);
                Err(AdapterError::query(e))
            }
            Ok(()) => match cursor.description() {
                Some(description) => Ok(Some(MysqlCursor::new(
                    conn,
                    cursor,
                    description,
                    Arc::clone(&self.in_use),
                ))),
                None => {
                    self.in_use.lock().remove(&id);
                    Ok(None)
                }
            },
        }
    }

    fn sync_session_state(&self, sql: &str) {
        if let Some(database) = parse_use_database(sql) {
            // Only one unfetched cursor is allowed per physical connection
            // and there is no dedicated control connection, so the change
            // cannot be replayed onto live sessions; instead every future
            // checkout inherits the new default.
            tracing::debug!(database, "database switch detected; updating pool default");
            self.pool.set_default_database(database);
        }
    }

    /// Kill the active query on every in-use connection, best-effort.
    ///
    /// Never fails visibly: if no auxiliary connection can be acquired the
    /// cancellation is silently skipped, and individual kill failures (the
    /// target may have finished already) are swallowed. The in-use set is
    /// cleared regardless; a connection that ignored its kill completes or
    /// errors on its own and self-releases through the normal teardown path.
    pub fn cancel(&self) {
        let acquired = match self.acquire(false) {
            Ok(acquired) => acquired,
            Err(e) => {
                tracing::debug!(error = %e, "cancellation could not acquire a connection");
                None
            }
        };
        let Some((_conn, mut cursor)) = acquired else {
            tracing::debug!("cancellation skipped; pool exhausted");
            return;
        };

        let ids: Vec<u32> = self.in_use.lock().iter().copied().collect();
        for id in ids {
            tracing::debug!(connection_id = id, "killing query");
            if let Err(e) = cursor.execute(&format!("KILL QUERY {id}")) {
                tracing::debug!(connection_id = id, error = %e, "kill query failed");
            }
        }
        self.in_use.lock().clear();
    }

    /// Names of all non-system databases, ordered by name.
    pub fn get_databases(&self) -> Result<Vec<String>, AdapterError> {
        let rows = self.introspect(LIST_DATABASES)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .map(|v| v.to_string())
            .collect())
    }

    /// Tables and views in `database`, ordered by name.
    pub fn get_relations(&self, database: &str) -> Result<Vec<(String, RelationKind)>, AdapterError> {
        let sql = format!(
            "\
select
    table_name,
    case
        when table_type like '%TABLE' then 't'
        else 'v'
    end as table_type
from information_schema.tables
where table_schema = '{database}'
order by table_name"
        );
        let rows = self.introspect(&sql)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                let name = cells.next()?.to_string();
                let kind = RelationKind::from_label(&cells.next()?.to_string());
                Some((name, kind))
            })
            .collect())
    }

    /// Visible columns of one relation as `(name, data_type)`, in
    /// declaration order.
    pub fn get_columns(
        &self,
        database: &str,
        relation: &str,
    ) -> Result<Vec<(String, String)>, AdapterError> {
        let sql = format!(
            "\
select column_name, data_type
from information_schema.columns
where
    table_schema = '{database}'
    and table_name = '{relation}'
    and extra not like '%INVISIBLE%'
order by ordinal_position"
        );
        let rows = self.introspect(&sql)?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let mut cells = row.into_iter();
                Some((cells.next()?.to_string(), cells.next()?.to_string()))
            })
            .collect())
    }

    /// Build the full database → relation → column tree.
    pub fn get_catalog(&self) -> Result<Catalog, AdapterError> {
        let mut databases = Vec::new();
        for db in self.get_databases()? {
            let mut relations = Vec::new();
            for (rel, kind) in self.get_relations(&db)? {
                let columns = self
                    .get_columns(&db, &rel)?
                    .into_iter()
                    .map(|(col, data_type)| {
                        CatalogItem::column(&db, &rel, &col, short_column_type(&data_type))
                    })
                    .collect();
                relations.push(CatalogItem::relation(&db, &rel, kind, columns));
            }
            databases.push(CatalogItem::database(&db, relations));
        }
        Ok(Catalog { items: databases })
    }

    /// Run one buffered, fetch-immediately introspection query.
    ///
    /// Unlike [`MysqlConnection::execute`], exhaustion here is an error:
    /// catalog population is not re-driven by retry-on-demand.
    fn introspect(&self, sql: &str) -> Result<Vec<Vec<Value>>, AdapterError> {
        let Some((_conn, mut cursor)) = self.acquire(true)? else {
            return Err(AdapterError::ConnectionExhausted);
        };
        cursor.execute(sql).map_err(AdapterError::query)?;
        let rows = cursor.fetch_all().map_err(AdapterError::query)?;
        Ok(rows)
    }

    /// Drain the pool. Tolerates repeated calls and already-closed state.
    pub fn close(&self) {
        self.pool.close();
    }
}

/// Extract the target database from a session database-switch statement.
pub(crate) fn parse_use_database(sql: &str) -> Option<&str> {
    USE_DATABASE_RE
        .captures(sql)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::parse_use_database;
    use proptest::prelude::*;

    #[test]
    fn matches_plain_use_statements() {
        assert_eq!(parse_use_database("use mydb"), Some("mydb"));
        assert_eq!(parse_use_database("USE mydb;"), Some("mydb"));
        assert_eq!(parse_use_database("  Use  analytics_2 "), Some("analytics_2"));
    }

    #[test]
    fn stops_at_path_and_wildcard_characters() {
        assert_eq!(parse_use_database("use one.two"), Some("one"));
        assert_eq!(parse_use_database("use db%"), Some("db"));
        assert_eq!(parse_use_database("use /etc/passwd"), None);
        assert_eq!(parse_use_database("use `quoted`"), None);
        assert_eq!(parse_use_database("use 'quoted'"), None);
    }

    #[test]
    fn ignores_other_statements() {
        assert_eq!(parse_use_database("select 1"), None);
        assert_eq!(parse_use_database("used_tables()"), None);
        assert_eq!(parse_use_database("use"), None);
        assert_eq!(parse_use_database("-- use mydb"), None);
    }

    proptest! {
        #[test]
        fn captures_any_identifier(name in "[A-Za-z0-9_$]{1,64}") {
            let sql = format!("use {name}");
            prop_assert_eq!(parse_use_database(&sql), Some(name.as_str()));
        }

        #[test]
        fn capture_is_capped_at_64_chars(name in "[A-Za-z0-9_]{65,128}") {
            let sql = format!("use {name}");
            let captured = parse_use_database(&sql).unwrap_or_default();
            prop_assert_eq!(captured.len(), 64);
            prop_assert_eq!(captured, &name[..64]);
        }

        #[test]
        fn capture_stops_before_specials(
            name in "[A-Za-z0-9_]{1,16}",
            special in prop::sample::select(vec!['.', '/', '\\', '*', '?', '%', ';', '`', '\'', '"']),
        ) {
            let sql = format!("use {name}{special}rest");
            prop_assert_eq!(parse_use_database(&sql), Some(name.as_str()));
        }
    }
}
