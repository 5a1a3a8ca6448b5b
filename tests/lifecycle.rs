use sqlite_dispatch::{
    Database, DatabaseAccess, DatabaseConfig, DatabaseStats, JournalMode, SynchronousMode,
};
use tempfile::tempdir;

fn unique_db_config(prefix: &str) -> DatabaseConfig {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    std::mem::forget(dir);
    DatabaseConfig::new(path).synchronous(SynchronousMode::Normal)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn schema_init_runs_only_on_creation() -> Result<(), Box<dyn std::error::Error>> {
    let config = unique_db_config("lifecycle");

    {
        let access = DatabaseAccess::with_default_workers()?;
        // Plain CREATE TABLE: a second invocation would fail.
        let db = Database::open(&config, |conn| {
            conn.execute_batch(
                "CREATE TABLE t (name TEXT NOT NULL); INSERT INTO t VALUES ('persisted');",
            )
        })?;
        let counts = access
            .query(&db, "SELECT COUNT(*) FROM t", Vec::new(), |record| {
                record.long(0)
            })
            .await?;
        assert_eq!(counts, vec![1]);
    }

    // Reopening the existing file must skip schema_init and keep the data.
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&config, |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)")
    })?;
    let names = access
        .query(&db, "SELECT name FROM t", Vec::new(), |record| {
            record.text(0)
        })
        .await?;
    assert_eq!(names, vec!["persisted".to_owned()]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stats_reflect_open_configuration() -> Result<(), Box<dyn std::error::Error>> {
    let config = unique_db_config("stats")
        .journal_mode(JournalMode::Wal)
        .cache_size_pages(1);
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&config, |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)")
    })?;

    let stats = DatabaseStats::collect(&access, &db).await?;
    assert_eq!(stats.journal_mode.to_ascii_lowercase(), "wal");
    assert_eq!(stats.cache_size_pages, 1);
    assert!(stats.page_size_bytes > 0);
    assert!(stats.size_bytes > 0);
    Ok(())
}
