//! # sequin-testing
//!
//! An in-memory, scripted MySQL stand-in implementing the `sequin-driver`
//! seam. Pool and adapter tests run against a [`MockServer`] instead of a
//! real server.
//!
//! The mock honors the driver behaviors the adapter is built around:
//!
//! - one unfetched result set per connection (`cursor()` fails with
//!   `UnreadResult` while one is pending; `drain_results()` recovers);
//! - buffered execution materializes rows at execute time and leaves the
//!   session clean;
//! - `KILL QUERY <id>` marks the target session interrupted, making its
//!   next fetch fail with the exact interrupt sentinel;
//! - sessions track their current database, switchable by `USE` or
//!   `select_database`.
//!
//! Catalog fixtures ([`MockServer::add_table`] and friends) answer the
//! adapter's introspection queries; everything else is answered from
//! statements scripted with [`MockServer::expect_query`] /
//! [`MockServer::expect_error`], or rejected with a syntax error.

pub mod server;

pub use server::MockServer;
