//! The scripted in-memory server and its driver-seam implementation.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use sequin_driver::{
    Column, ColumnType, Connection, ConnectionConfig, ConnectionFactory, Cursor, DriverError,
    ServerError, Value,
};

/// Schemas hidden by the adapter's `show databases` query.
const SYSTEM_SCHEMAS: [&str; 4] = ["sys", "information_schema", "performance_schema", "mysql"];

static USE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*use\s+`?([^\s;`]+)`?").unwrap());
static SCHEMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"table_schema\s*=\s*'([^']*)'").unwrap());
static TABLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"table_name\s*=\s*'([^']*)'").unwrap());

/// A scripted MySQL server.
///
/// Clone handles share state; hand [`MockServer::factory`] to a pool and
/// keep a clone around to adjust fixtures mid-test.
#[derive(Clone)]
pub struct MockServer {
    state: Arc<Mutex<ServerState>>,
}

#[derive(Default)]
struct ServerState {
    next_connection_id: u32,
    connections_opened: usize,
    fail_connections: bool,
    databases: BTreeMap<String, BTreeMap<String, Relation>>,
    scripts: HashMap<String, Script>,
    sessions: HashMap<u32, SessionHandle>,
}

struct Relation {
    is_view: bool,
    columns: Vec<(String, String)>,
}

#[derive(Clone)]
enum Script {
    Rows {
        columns: Vec<Column>,
        rows: Vec<Vec<Value>>,
    },
    Fail(ServerError),
}

type SessionHandle = Arc<Mutex<SessionState>>;

struct SessionState {
    id: u32,
    database: Option<String>,
    /// A result set was produced and not yet fully consumed.
    unread: bool,
    /// The session's pending query was killed; the next fetch reports it.
    interrupted: bool,
}

impl MockServer {
    /// Create an empty server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServerState::default())),
        }
    }

    /// A connection factory bound to this server.
    #[must_use]
    pub fn factory(&self) -> Arc<dyn ConnectionFactory> {
        Arc::new(MockFactory {
            state: Arc::clone(&self.state),
        })
    }

    /// Make all subsequent connection attempts fail.
    pub fn fail_connections(&self, fail: bool) {
        self.state.lock().fail_connections = fail;
    }

    /// Register an empty database.
    pub fn add_database(&self, name: &str) {
        self.state
            .lock()
            .databases
            .entry(name.to_string())
            .or_default();
    }

    /// Register a base table in `db`.
    pub fn add_table(&self, db: &str, name: &str) {
        self.add_relation(db, name, false);
    }

    /// Register a view in `db`.
    pub fn add_view(&self, db: &str, name: &str) {
        self.add_relation(db, name, true);
    }

    fn add_relation(&self, db: &str, name: &str, is_view: bool) {
        self.state
            .lock()
            .databases
            .entry(db.to_string())
            .or_default()
            .insert(
                name.to_string(),
                Relation {
                    is_view,
                    columns: Vec::new(),
                },
            );
    }

    /// Append a column to a registered relation. Declaration order is
    /// preserved and reported as ordinal position.
    pub fn add_column(&self, db: &str, relation: &str, name: &str, data_type: &str) {
        let mut state = self.state.lock();
        if let Some(rel) = state
            .databases
            .get_mut(db)
            .and_then(|rels| rels.get_mut(relation))
        {
            rel.columns.push((name.to_string(), data_type.to_string()));
        }
    }

    /// Script a result set for an exact statement (whitespace- and
    /// case-insensitive match).
    pub fn expect_query(&self, sql: &str, columns: Vec<Column>, rows: Vec<Vec<Value>>) {
        self.state
            .lock()
            .scripts
            .insert(normalize(sql), Script::Rows { columns, rows });
    }

    /// Script a server error for an exact statement.
    pub fn expect_error(&self, sql: &str, error: ServerError) {
        self.state
            .lock()
            .scripts
            .insert(normalize(sql), Script::Fail(error));
    }

    /// Mark every session as having an unread result set, simulating
    /// connections returned to a pool without being drained.
    pub fn set_all_unread(&self) {
        let state = self.state.lock();
        for session in state.sessions.values() {
            session.lock().unread = true;
        }
    }

    /// Total physical connections opened since the server was created.
    #[must_use]
    pub fn connections_opened(&self) -> usize {
        self.state.lock().connections_opened
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

struct MockFactory {
    state: Arc<Mutex<ServerState>>,
}

impl ConnectionFactory for MockFactory {
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Connection>, DriverError> {
        let mut state = self.state.lock();
        if state.fail_connections {
            return Err(DriverError::Connect(format!(
                "Access denied for user {:?}@{}",
                config.user, config.host
            )));
        }
        state.next_connection_id += 1;
        state.connections_opened += 1;
        let id = state.next_connection_id;
        let session = Arc::new(Mutex::new(SessionState {
            id,
            database: config.database.clone(),
            unread: false,
            interrupted: false,
        }));
        state.sessions.insert(id, Arc::clone(&session));
        Ok(Box::new(MockConnection {
            session,
            server: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    session: SessionHandle,
    server: Arc<Mutex<ServerState>>,
}

impl Connection for MockConnection {
    fn connection_id(&self) -> u32 {
        self.session.lock().id
    }

    fn database(&self) -> Option<String> {
        self.session.lock().database.clone()
    }

    fn select_database(&mut self, database: &str) -> Result<(), DriverError> {
        let (known, any_registered) = {
            let state = self.server.lock();
            (
                state.databases.contains_key(database),
                !state.databases.is_empty(),
            )
        };
        // When no fixtures are registered at all, accept any name so pure
        // pool tests need no catalog setup.
        if any_registered && !known {
            return Err(
                ServerError::new(1049, "42000", format!("Unknown database '{database}'")).into(),
            );
        }
        self.session.lock().database = Some(database.to_string());
        Ok(())
    }

    fn cursor(&mut self, buffered: bool) -> Result<Box<dyn Cursor>, DriverError> {
        if self.session.lock().unread {
            return Err(DriverError::UnreadResult);
        }
        Ok(Box::new(MockCursor {
            session: Arc::clone(&self.session),
            server: Arc::clone(&self.server),
            buffered,
            result: None,
        }))
    }

    fn drain_results(&mut self) -> Result<(), DriverError> {
        let mut session = self.session.lock();
        session.unread = false;
        session.interrupted = false;
        Ok(())
    }

    fn close(&mut self) {
        let id = self.session.lock().id;
        self.server.lock().sessions.remove(&id);
    }
}

struct MockCursor {
    session: SessionHandle,
    server: Arc<Mutex<ServerState>>,
    buffered: bool,
    result: Option<ResultSet>,
}

struct ResultSet {
    columns: Vec<Column>,
    rows: VecDeque<Vec<Value>>,
}

impl MockCursor {
    fn install(&mut self, columns: Vec<Column>, rows: Vec<Vec<Value>>) {
        self.result = Some(ResultSet {
            columns,
            rows: rows.into(),
        });
        if !self.buffered {
            self.session.lock().unread = true;
        }
    }

    fn discard(&mut self) {
        if self.result.take().is_some() && !self.buffered {
            let mut session = self.session.lock();
            session.unread = false;
            session.interrupted = false;
        }
    }

    fn take_rows(&mut self, limit: Option<usize>) -> Result<Vec<Vec<Value>>, DriverError> {
        {
            let mut session = self.session.lock();
            if session.interrupted {
                session.interrupted = false;
                session.unread = false;
                self.result = None;
                return Err(ServerError::query_interrupted().into());
            }
        }
        let Some(result) = self.result.as_mut() else {
            return Err(DriverError::Io("no result set to fetch from".into()));
        };
        let n = match limit {
            None => result.rows.len(),
            Some(n) => n.min(result.rows.len()),
        };
        let rows: Vec<Vec<Value>> = result.rows.drain(..n).collect();
        if result.rows.is_empty() && !self.buffered {
            self.session.lock().unread = false;
        }
        Ok(rows)
    }

    fn kill_query(&self, id_text: &str) -> Result<(), DriverError> {
        let unknown = || {
            DriverError::from(ServerError::new(
                1094,
                "HY000",
                format!("Unknown thread id: {id_text}"),
            ))
        };
        let id: u32 = id_text.parse().map_err(|_| unknown())?;
        let target = self.server.lock().sessions.get(&id).cloned();
        match target {
            Some(session) => {
                let mut session = session.lock();
                if session.unread {
                    session.interrupted = true;
                }
                Ok(())
            }
            None => Err(unknown()),
        }
    }
}

impl Cursor for MockCursor {
    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.discard();
        let normalized = normalize(sql);

        let script = self.server.lock().scripts.get(&normalized).cloned();
        if let Some(script) = script {
            return match script {
                Script::Rows { columns, rows } => {
                    self.install(columns, rows);
                    Ok(())
                }
                Script::Fail(e) => Err(e.into()),
            };
        }

        if let Some(rest) = normalized.strip_prefix("kill query ") {
            return self.kill_query(rest.trim().trim_end_matches(';'));
        }

        if normalized.starts_with("use ") {
            if let Some(captures) = USE_RE.captures(sql) {
                self.session.lock().database = Some(captures[1].to_string());
            }
            return Ok(());
        }

        if normalized.starts_with("show databases") {
            let state = self.server.lock();
            let rows: Vec<Vec<Value>> = state
                .databases
                .keys()
                .filter(|name| !SYSTEM_SCHEMAS.contains(&name.as_str()))
                .map(|name| vec![Value::Text(name.clone())])
                .collect();
            drop(state);
            self.install(vec![Column::new("Database", ColumnType::VarString)], rows);
            return Ok(());
        }

        if normalized.contains("from information_schema.tables") {
            let db = SCHEMA_RE
                .captures(sql)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let state = self.server.lock();
            let rows: Vec<Vec<Value>> = state
                .databases
                .get(&db)
                .map(|rels| {
                    rels.iter()
                        .map(|(name, rel)| {
                            vec![
                                Value::Text(name.clone()),
                                Value::Text(if rel.is_view { "v" } else { "t" }.to_string()),
                            ]
                        })
                        .collect()
                })
                .unwrap_or_default();
            drop(state);
            self.install(
                vec![
                    Column::new("table_name", ColumnType::VarString),
                    Column::new("table_type", ColumnType::VarString),
                ],
                rows,
            );
            return Ok(());
        }

        if normalized.contains("from information_schema.columns") {
            let db = SCHEMA_RE
                .captures(sql)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let table = TABLE_RE
                .captures(sql)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let state = self.server.lock();
            let rows: Vec<Vec<Value>> = state
                .databases
                .get(&db)
                .and_then(|rels| rels.get(&table))
                .map(|rel| {
                    rel.columns
                        .iter()
                        .map(|(name, data_type)| {
                            vec![Value::Text(name.clone()), Value::Text(data_type.clone())]
                        })
                        .collect()
                })
                .unwrap_or_default();
            drop(state);
            self.install(
                vec![
                    Column::new("column_name", ColumnType::VarString),
                    Column::new("data_type", ColumnType::VarString),
                ],
                rows,
            );
            return Ok(());
        }

        const NO_RESULT_PREFIXES: [&str; 9] = [
            "create ", "drop ", "alter ", "insert ", "update ", "delete ", "set ", "truncate ",
            "grant ",
        ];
        if NO_RESULT_PREFIXES.iter().any(|p| normalized.starts_with(p)) {
            return Ok(());
        }

        let snippet: String = sql.trim().chars().take(32).collect();
        Err(ServerError::new(
            1064,
            "42000",
            format!("You have an error in your SQL syntax near '{snippet}'"),
        )
        .into())
    }

    fn description(&self) -> Option<Vec<Column>> {
        self.result.as_ref().map(|r| r.columns.clone())
    }

    fn fetch_all(&mut self) -> Result<Vec<Vec<Value>>, DriverError> {
        self.take_rows(None)
    }

    fn fetch_many(&mut self, n: usize) -> Result<Vec<Vec<Value>>, DriverError> {
        self.take_rows(Some(n))
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.discard();
        Ok(())
    }
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(server: &MockServer) -> Box<dyn Connection> {
        server
            .factory()
            .connect(&ConnectionConfig::default())
            .expect("mock connect")
    }

    #[test]
    fn unread_result_blocks_next_cursor() {
        let server = MockServer::new();
        server.expect_query(
            "select 1",
            vec![Column::new("1", ColumnType::LongLong)],
            vec![vec![Value::Int(1)]],
        );
        let mut conn = open(&server);
        let mut cur = conn.cursor(false).expect("cursor");
        cur.execute("select 1").expect("execute");
        assert!(matches!(
            conn.cursor(false),
            Err(DriverError::UnreadResult)
        ));
        conn.drain_results().expect("drain");
        assert!(conn.cursor(false).is_ok());
    }

    #[test]
    fn buffered_execution_leaves_session_clean() {
        let server = MockServer::new();
        server.expect_query(
            "select 1",
            vec![Column::new("1", ColumnType::LongLong)],
            vec![vec![Value::Int(1)]],
        );
        let mut conn = open(&server);
        let mut cur = conn.cursor(true).expect("cursor");
        cur.execute("select 1").expect("execute");
        assert!(conn.cursor(true).is_ok());
    }

    #[test]
    fn kill_query_interrupts_pending_fetch() {
        let server = MockServer::new();
        server.expect_query(
            "select sleep(100)",
            vec![Column::new("sleep(100)", ColumnType::LongLong)],
            vec![vec![Value::Int(0)]],
        );
        let mut victim = open(&server);
        let id = victim.connection_id();
        let mut victim_cur = victim.cursor(false).expect("cursor");
        victim_cur.execute("select sleep(100)").expect("execute");

        let mut killer = open(&server);
        let mut killer_cur = killer.cursor(false).expect("cursor");
        killer_cur
            .execute(&format!("KILL QUERY {id}"))
            .expect("kill");

        let err = victim_cur.fetch_all().expect_err("interrupted");
        assert!(err.is_query_interrupted());
    }

    #[test]
    fn kill_unknown_thread_fails() {
        let server = MockServer::new();
        let mut conn = open(&server);
        let mut cur = conn.cursor(false).expect("cursor");
        let err = cur.execute("KILL QUERY 9999").expect_err("unknown id");
        assert!(err.to_string().contains("Unknown thread id"));
    }

    #[test]
    fn use_statement_switches_session_database() {
        let server = MockServer::new();
        let mut conn = open(&server);
        let mut cur = conn.cursor(false).expect("cursor");
        cur.execute("use Analytics;").expect("use");
        assert_eq!(conn.database().as_deref(), Some("Analytics"));
    }

    #[test]
    fn unknown_statement_is_a_syntax_error() {
        let server = MockServer::new();
        let mut conn = open(&server);
        let mut cur = conn.cursor(false).expect("cursor");
        let err = cur.execute("selec;").expect_err("syntax error");
        assert!(err.to_string().starts_with("1064 (42000):"));
    }
}
