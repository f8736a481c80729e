//! Pool behavior against the in-memory driver.

use sequin_driver::ConnectionConfig;
use sequin_pool::{Pool, PoolError};
use sequin_testing::MockServer;

fn pool_of(server: &MockServer, capacity: usize, database: Option<&str>) -> Pool {
    let mut config = ConnectionConfig::new();
    config.database = database.map(str::to_string);
    Pool::connect(server.factory(), config, capacity).expect("pool connect")
}

#[test]
fn fills_eagerly_at_construction() {
    let server = MockServer::new();
    let _pool = pool_of(&server, 4, None);
    assert_eq!(server.connections_opened(), 4);
}

#[test]
fn setup_failure_surfaces_immediately() {
    let server = MockServer::new();
    server.fail_connections(true);
    let result = Pool::connect(server.factory(), ConnectionConfig::new(), 3);
    assert!(matches!(result, Err(PoolError::Setup(_))));
}

#[test]
fn exhaustion_yields_empty_not_error() {
    let server = MockServer::new();
    let pool = pool_of(&server, 3, None);

    let mut held = Vec::new();
    for _ in 0..3 {
        held.push(pool.try_acquire().expect("acquire").expect("connection"));
    }
    assert!(pool.try_acquire().expect("acquire").is_none());

    let status = pool.status();
    assert_eq!(status.in_use, 3);
    assert_eq!(status.available, 0);

    held.pop();
    assert!(pool.try_acquire().expect("acquire").is_some());
}

#[test]
fn dropped_checkout_is_readmitted() {
    let server = MockServer::new();
    let pool = pool_of(&server, 1, None);

    let conn = pool.try_acquire().expect("acquire").expect("connection");
    drop(conn);
    assert_eq!(pool.status().available, 1);
    assert!(pool.try_acquire().expect("acquire").is_some());
    // No reconnects happened; the same physical connection cycled.
    assert_eq!(server.connections_opened(), 1);
}

#[test]
fn default_database_applies_only_to_future_checkouts() {
    let server = MockServer::new();
    let pool = pool_of(&server, 2, Some("one"));

    let first = pool.try_acquire().expect("acquire").expect("connection");
    assert_eq!(first.database().as_deref(), Some("one"));

    pool.set_default_database("two");

    // Already checked out: unaffected.
    assert_eq!(first.database().as_deref(), Some("one"));

    // Fresh checkout: switched at acquisition.
    let second = pool.try_acquire().expect("acquire").expect("connection");
    assert_eq!(second.database().as_deref(), Some("two"));

    drop(first);
    drop(second);

    // Reacquired connections inherit the new default.
    let again = pool.try_acquire().expect("acquire").expect("connection");
    assert_eq!(again.database().as_deref(), Some("two"));
}

#[test]
fn close_is_idempotent_and_rejects_checkouts() {
    let server = MockServer::new();
    let pool = pool_of(&server, 2, None);

    let held = pool.try_acquire().expect("acquire").expect("connection");

    pool.close();
    pool.close();
    assert!(pool.is_closed());
    assert!(matches!(pool.try_acquire(), Err(PoolError::Closed)));

    // A connection returned after close is closed, not readmitted.
    drop(held);
    assert_eq!(pool.status().available, 0);
}
