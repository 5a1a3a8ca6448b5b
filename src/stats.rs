use crate::access::DatabaseAccess;
use crate::db::Database;
use crate::error::DbAccessError;

/// Snapshot of engine-level space accounting for one database file.
///
/// Collected through the ordinary [`DatabaseAccess::query`] path; nothing
/// here is special-cased inside the access layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStats {
    pub journal_mode: String,
    pub freelist_pages: i64,
    pub size_bytes: u64,
    pub cache_size_pages: i64,
    pub page_size_bytes: i64,
}

impl DatabaseStats {
    /// Checkpoint the write-ahead log, then read the engine's introspection
    /// pragmas and the on-disk file size.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if any introspection query fails.
    pub async fn collect(
        access: &DatabaseAccess,
        db: &Database,
    ) -> Result<Self, DbAccessError> {
        access
            .query(db, "PRAGMA wal_checkpoint", Vec::new(), |_| Ok(()))
            .await?;
        let journal_mode = single_row(
            access
                .query(db, "PRAGMA journal_mode", Vec::new(), |record| {
                    record.text(0)
                })
                .await?,
        )?;
        let freelist_pages = single_row(
            access
                .query(db, "PRAGMA freelist_count", Vec::new(), |record| {
                    record.long(0)
                })
                .await?,
        )?;
        let cache_size_pages = single_row(
            access
                .query(db, "PRAGMA cache_size", Vec::new(), |record| record.long(0))
                .await?,
        )?;
        let page_size_bytes = single_row(
            access
                .query(db, "PRAGMA page_size", Vec::new(), |record| record.long(0))
                .await?,
        )?;
        let size_bytes = std::fs::metadata(db.path()).map_or(0, |meta| meta.len());

        Ok(Self {
            journal_mode,
            freelist_pages,
            size_bytes,
            cache_size_pages,
            page_size_bytes,
        })
    }
}

fn single_row<T>(rows: Vec<T>) -> Result<T, DbAccessError> {
    rows.into_iter()
        .next()
        .ok_or(DbAccessError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}
