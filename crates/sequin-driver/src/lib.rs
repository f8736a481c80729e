//! # sequin-driver
//!
//! Driver seam for the sequin MySQL adapter.
//!
//! The adapter layer never speaks the MySQL wire protocol itself. Instead it
//! consumes the traits defined here: a [`ConnectionFactory`] opens physical
//! connections, a [`Connection`] hands out statement [`Cursor`]s, and rows
//! come back as [`Value`]s described by [`Column`] metadata.
//!
//! The seam preserves two MySQL-specific constraints that shape everything
//! built on top of it:
//!
//! - A physical connection allows at most one unfetched result set. Asking
//!   for a cursor while a previous result is still pending fails with
//!   [`DriverError::UnreadResult`]; callers recover by draining.
//! - A query terminated by `KILL QUERY` surfaces as a server error with a
//!   fixed message (see [`QUERY_INTERRUPTED_SENTINEL`]), which callers treat
//!   as a normal cancellation outcome rather than a failure.

pub mod config;
pub mod connection;
pub mod error;
pub mod types;

pub use config::{ConnectionConfig, TlsOptions};
pub use connection::{Connection, ConnectionFactory, Cursor};
pub use error::{DriverError, ServerError, QUERY_INTERRUPTED_SENTINEL};
pub use types::{Column, ColumnType, Value};
