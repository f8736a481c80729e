//! Connection pool implementation.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use sequin_driver::{Connection, ConnectionConfig, ConnectionFactory};

use crate::error::PoolError;

/// A fixed-capacity pool of physical MySQL connections.
///
/// All `capacity` connections are opened eagerly by [`Pool::connect`].
/// Checkouts are strictly single-owner: a [`PooledConnection`] is never
/// shared, and it returns itself to the idle set when dropped.
pub struct Pool {
    shared: Arc<PoolShared>,
}

struct PoolShared {
    factory: Arc<dyn ConnectionFactory>,
    capacity: usize,
    state: Mutex<PoolState>,
}

struct PoolState {
    idle: VecDeque<Box<dyn Connection>>,
    checked_out: usize,
    config: ConnectionConfig,
    closed: bool,
}

impl Pool {
    /// Create a pool and eagerly open `capacity` connections.
    ///
    /// Any connect failure closes the partially-filled set and surfaces as
    /// [`PoolError::Setup`], so configuration problems (bad credentials,
    /// unreachable host, bad TLS material) are reported before the pool is
    /// ever used.
    pub fn connect(
        factory: Arc<dyn ConnectionFactory>,
        config: ConnectionConfig,
        capacity: usize,
    ) -> Result<Self, PoolError> {
        let mut idle: VecDeque<Box<dyn Connection>> = VecDeque::with_capacity(capacity);
        for _ in 0..capacity {
            match factory.connect(&config) {
                Ok(conn) => idle.push_back(conn),
                Err(e) => {
                    for mut conn in idle {
                        conn.close();
                    }
                    return Err(PoolError::Setup(e));
                }
            }
        }

        tracing::debug!(
            capacity,
            host = %config.host,
            database = ?config.database,
            "connection pool established"
        );

        Ok(Self {
            shared: Arc::new(PoolShared {
                factory,
                capacity,
                state: Mutex::new(PoolState {
                    idle,
                    checked_out: 0,
                    config,
                    closed: false,
                }),
            }),
        })
    }

    /// Check out a connection without waiting.
    ///
    /// Returns `Ok(None)` when every connection is checked out. The popped
    /// connection is switched to the pool's current default database before
    /// it is handed out, so a default mutated after this connection was last
    /// used takes effect here and not earlier.
    pub fn try_acquire(&self) -> Result<Option<PooledConnection>, PoolError> {
        let (mut conn, target_db) = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return Err(PoolError::Closed);
            }
            let Some(conn) = state.idle.pop_front() else {
                tracing::trace!("pool exhausted");
                return Ok(None);
            };
            state.checked_out += 1;
            (conn, state.config.database.clone())
        };

        if let Some(db) = target_db {
            if conn.database().as_deref() != Some(db.as_str()) {
                if let Err(e) = conn.select_database(&db) {
                    // Stale connection; replace it with a fresh one rather
                    // than returning a session in an unknown state. One
                    // attempt only.
                    tracing::debug!(database = %db, error = %e, "select database failed, reconnecting");
                    conn.close();
                    let config = self.default_config();
                    conn = match self.shared.factory.connect(&config) {
                        Ok(fresh) => fresh,
                        Err(e) => {
                            self.shared.state.lock().checked_out -= 1;
                            return Err(PoolError::Driver(e));
                        }
                    };
                }
            }
        }

        tracing::trace!(connection_id = conn.connection_id(), "connection checked out");
        Ok(Some(PooledConnection {
            conn: Some(conn),
            shared: Arc::clone(&self.shared),
        }))
    }

    /// Point all *future* checkouts at another database.
    ///
    /// Connections currently checked out (or idle) keep their session
    /// database until they are released and reacquired.
    pub fn set_default_database(&self, database: &str) {
        let mut state = self.shared.state.lock();
        state.config.database = Some(database.to_string());
        tracing::debug!(database, "pool default database updated");
    }

    /// A snapshot of the current default connection configuration.
    #[must_use]
    pub fn default_config(&self) -> ConnectionConfig {
        self.shared.state.lock().config.clone()
    }

    /// Current pool occupancy.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.shared.state.lock();
        PoolStatus {
            available: state.idle.len(),
            in_use: state.checked_out,
            capacity: self.shared.capacity,
        }
    }

    /// The configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Close the pool, closing every idle connection.
    ///
    /// Connections still checked out are closed as they come back. Repeated
    /// calls are a no-op.
    pub fn close(&self) {
        let idle = {
            let mut state = self.shared.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            std::mem::take(&mut state.idle)
        };
        for mut conn in idle {
            conn.close();
        }
        tracing::debug!("connection pool closed");
    }

    /// Whether the pool has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }
}

impl PoolShared {
    fn restore(&self, mut conn: Box<dyn Connection>) {
        {
            let mut state = self.state.lock();
            state.checked_out = state.checked_out.saturating_sub(1);
            if !state.closed {
                tracing::trace!(connection_id = conn.connection_id(), "connection returned");
                state.idle.push_back(conn);
                return;
            }
        }
        // Pool closed while this connection was checked out.
        conn.close();
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Number of idle connections available.
    pub available: usize,
    /// Number of connections currently checked out.
    pub in_use: usize,
    /// Fixed pool capacity.
    pub capacity: usize,
}

/// A connection checked out from the pool.
///
/// Dereferences to [`Connection`]. Returned to the pool exactly once, on
/// drop; if the pool was closed in the meantime the physical connection is
/// closed instead.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    shared: Arc<PoolShared>,
}

impl Deref for PooledConnection {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        // Invariant: `conn` is only None after drop.
        #[allow(clippy::expect_used)]
        self.conn
            .as_ref()
            .expect("connection already returned to pool")
            .as_ref()
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        #[allow(clippy::expect_used)]
        self.conn
            .as_mut()
            .expect("connection already returned to pool")
            .as_mut()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.shared.restore(conn);
        }
    }
}
