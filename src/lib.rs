//! Cancellable async access layer over an embedded `SQLite` database.
//!
//! Blocking, cursor-based engine calls are dispatched onto a bounded worker
//! pool so that asynchronous callers never block their own thread on
//! database I/O. The layer provides:
//!
//! - [`DatabaseAccess`] — the asynchronous facade: `query`, `execute`,
//!   `transact`, and `cleanup` (vacuum), each suspending the caller until a
//!   worker thread resolves the outcome, with cooperative cancellation by
//!   dropping the returned future.
//! - [`Transaction`] — a synchronous scoped context handed to `transact`
//!   blocks; the engine-level transaction commits only if the block returns
//!   `Ok` and is ended unconditionally on every exit path.
//! - [`Record`] — a positional, typed view over one result row, applied
//!   through a caller-supplied row mapper.
//! - [`Database`] — the shared handle to one open database file, created by
//!   [`Database::open`] with pragma-style configuration and a one-time
//!   schema-initialization callback.
//!
//! The engine's own locking serializes conflicting writes; callers needing
//! read-modify-write atomicity across statements must use a single
//! `transact` block, not separate calls.
//!
//! ```ignore
//! let access = DatabaseAccess::with_default_workers()?;
//! let db = Database::open(&DatabaseConfig::new("items.db"), |conn| {
//!     conn.execute_batch("CREATE TABLE item (name TEXT NOT NULL, data BLOB NOT NULL)")
//! })?;
//!
//! access
//!     .transact(&db, |tx| {
//!         tx.execute("INSERT INTO item VALUES (?, ?)", &["a".into(), vec![1u8, 2].into()])
//!     })
//!     .await?;
//!
//! let names = access
//!     .query(&db, "SELECT name FROM item", Vec::new(), |record| record.text(0))
//!     .await?;
//! ```

mod access;
mod config;
mod db;
mod error;
mod params;
mod record;
mod stats;
mod transaction;
mod worker;

pub use access::{DEFAULT_WORKERS, DatabaseAccess};
pub use config::{DatabaseConfig, JournalMode, SecureDeleteMode, SynchronousMode};
pub use db::Database;
pub use error::DbAccessError;
pub use params::SqlParam;
pub use record::{ColumnType, Record};
pub use stats::DatabaseStats;
pub use transaction::Transaction;
