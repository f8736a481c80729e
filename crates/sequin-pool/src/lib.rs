//! # sequin-pool
//!
//! Fixed-capacity connection pool for the sequin MySQL adapter.
//!
//! Unlike generic pools, this one is shaped by the needs of an interactive
//! SQL tool sitting on a driver that allows one unfetched result set per
//! physical connection:
//!
//! - The pool is filled eagerly at construction, so bad credentials or an
//!   unreachable host fail at connect time rather than mid-session.
//! - [`Pool::try_acquire`] never blocks and never errors on exhaustion; an
//!   exhausted pool yields `Ok(None)` and the caller decides what that
//!   means. Blocking here could deadlock the whole interactive session.
//! - The default configuration can be mutated while connections are checked
//!   out ([`Pool::set_default_database`]); the change is applied to each
//!   connection at its next checkout, never to live checkouts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sequin_pool::Pool;
//!
//! let pool = Pool::connect(factory, config, 5)?;
//! match pool.try_acquire()? {
//!     Some(conn) => { /* use connection; returned to pool on drop */ }
//!     None => { /* all 5 checked out; try again later */ }
//! }
//! ```

pub mod error;
pub mod pool;

pub use error::PoolError;
pub use pool::{Pool, PoolStatus, PooledConnection};
