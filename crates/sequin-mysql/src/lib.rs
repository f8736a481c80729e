//! # sequin-mysql
//!
//! Pooled MySQL adapter for the sequin interactive SQL tool.
//!
//! The adapter keeps an interactive session responsive under three
//! conditions that are easy to get wrong together:
//!
//! - **Pool exhaustion** degrades gracefully: an `execute` that cannot get a
//!   connection returns `Ok(None)` instead of failing, and catalog
//!   introspection raises a distinct [`AdapterError::ConnectionExhausted`].
//! - **Cancellation** is cooperative and server-side: every connection
//!   holding an unfetched result cursor is tracked by id, and
//!   [`MysqlConnection::cancel`] issues `KILL QUERY` for each. A killed
//!   statement or fetch is a normal outcome (`None` / empty rows), not an
//!   error.
//! - **Database switches** (`USE x`) are propagated to the pool's default
//!   configuration so every *future* checkout lands in the new database.
//!   The driver allows only one unfetched result set per connection, so the
//!   change cannot be replayed onto live sessions.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sequin_mysql::{AdapterOptions, MysqlAdapter};
//!
//! let adapter = MysqlAdapter::new(options, driver_factory)?;
//! let conn = adapter.connect()?;
//!
//! if let Some(mut cursor) = conn.execute("select * from users")? {
//!     let columns = cursor.columns().to_vec();
//!     let rows = cursor.set_limit(500).fetch_all()?;
//! }
//! ```

pub mod adapter;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod error;
pub mod types;

pub use adapter::MysqlAdapter;
pub use catalog::{Catalog, CatalogItem, CatalogItemKind, RelationKind};
pub use config::{AdapterOptions, DEFAULT_POOL_SIZE};
pub use connection::MysqlConnection;
pub use cursor::MysqlCursor;
pub use error::AdapterError;
pub use types::{short_column_type, short_type};
