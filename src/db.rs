use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, InterruptHandle};

use crate::config::DatabaseConfig;
use crate::error::DbAccessError;

/// Shared handle to one open database file.
///
/// Exactly one `Database` should exist per file; clones share the same
/// underlying connection. [`DatabaseAccess`](crate::DatabaseAccess) borrows
/// the connection for the duration of each dispatched operation and never
/// closes it. No worker owns the connection exclusively; each operation
/// takes the lock only while it runs, and serialization of conflicting
/// writes beyond that is the engine's job.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
    path: Arc<PathBuf>,
}

impl Database {
    /// Open or create the database file named by `config`, apply its pragma
    /// directives, and run `schema_init` exactly once if the file is newly
    /// created.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if the file cannot be opened, a pragma is
    /// rejected, or `schema_init` fails.
    pub fn open<F>(config: &DatabaseConfig, schema_init: F) -> Result<Self, DbAccessError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<()>,
    {
        let fresh = !config.path.exists();
        let conn = Connection::open(&config.path)?;
        conn.pragma_update(None, "journal_mode", config.journal_mode.as_str())?;
        conn.pragma_update(None, "synchronous", config.synchronous.as_str())?;
        conn.pragma_update(None, "cache_size", config.cache_size_pages)?;
        conn.pragma_update(None, "secure_delete", config.secure_delete.as_str())?;
        conn.pragma_update(None, "wal_autocheckpoint", config.wal_autocheckpoint_pages)?;
        if fresh {
            schema_init(&conn)?;
        }
        tracing::debug!(path = %config.path.display(), fresh, "opened database");

        let interrupt = conn.get_interrupt_handle();
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt: Arc::new(interrupt),
            path: Arc::new(config.path.clone()),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic in a caller-supplied mapper or block poisons the lock;
        // the connection itself is still usable, so recover the guard.
        self.conn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub(crate) fn interrupt_handle(&self) -> Arc<InterruptHandle> {
        Arc::clone(&self.interrupt)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}
