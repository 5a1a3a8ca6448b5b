use std::sync::Arc;

use sqlite_dispatch::{
    Database, DatabaseAccess, DatabaseConfig, DbAccessError, SqlParam, SynchronousMode,
};
use tempfile::tempdir;

fn unique_db_config(prefix: &str) -> DatabaseConfig {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    DatabaseConfig::new(path).synchronous(SynchronousMode::Normal)
}

async fn row_count(
    access: &DatabaseAccess,
    db: &Database,
) -> Result<i64, DbAccessError> {
    let rows = access
        .query(db, "SELECT COUNT(*) FROM t", Vec::new(), |record| {
            record.long(0)
        })
        .await?;
    Ok(rows.into_iter().next().unwrap_or(0))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn committed_transaction_is_visible() -> Result<(), Box<dyn std::error::Error>> {
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&unique_db_config("commit"), |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)")
    })?;

    access
        .transact(&db, |tx| {
            for i in 0..3 {
                tx.execute(
                    "INSERT INTO t (name) VALUES (?)",
                    &[SqlParam::from(format!("row-{i}"))],
                )?;
            }
            Ok(())
        })
        .await?;

    assert_eq!(row_count(&access, &db).await?, 3);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_transaction_rolls_back_every_statement() -> Result<(), Box<dyn std::error::Error>>
{
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&unique_db_config("rollback"), |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)")
    })?;

    let outcome = access
        .transact(&db, |tx| {
            tx.execute("INSERT INTO t (name) VALUES (?)", &[SqlParam::from("kept?")])?;
            // NOT NULL violation fails the block partway through.
            tx.execute("INSERT INTO t (name) VALUES (?)", &[SqlParam::Null])?;
            Ok(())
        })
        .await;

    assert!(matches!(outcome, Err(DbAccessError::Sqlite(_))));
    assert_eq!(row_count(&access, &db).await?, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reads_inside_transaction_observe_its_writes() -> Result<(), Box<dyn std::error::Error>>
{
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&unique_db_config("ryw"), |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)")
    })?;

    let in_tx_count = access
        .transact(&db, |tx| {
            tx.execute("INSERT INTO t (name) VALUES (?)", &[SqlParam::from("one")])?;
            let counts =
                tx.query("SELECT COUNT(*) FROM t", &[], |record| record.long(0))?;
            Ok(counts.into_iter().next().unwrap_or(0))
        })
        .await?;

    assert_eq!(in_tx_count, 1);
    assert_eq!(row_count(&access, &db).await?, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increment_transactions_serialize() -> Result<(), Box<dyn std::error::Error>>
{
    let access = Arc::new(DatabaseAccess::new(4)?);
    let db = Database::open(&unique_db_config("increments"), |conn| {
        conn.execute_batch(
            "CREATE TABLE counter (id INTEGER PRIMARY KEY, value INTEGER NOT NULL);
             INSERT INTO counter (id, value) VALUES (1, 0);",
        )
    })?;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let access = Arc::clone(&access);
        let db = db.clone();
        handles.push(tokio::spawn(async move {
            access
                .transact(&db, |tx| {
                    let current = tx
                        .query("SELECT value FROM counter WHERE id = 1", &[], |record| {
                            record.long(0)
                        })?
                        .into_iter()
                        .next()
                        .unwrap_or(0);
                    tx.execute(
                        "UPDATE counter SET value = ? WHERE id = 1",
                        &[SqlParam::from(current + 1)],
                    )
                })
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    let values = access
        .query(
            &db,
            "SELECT value FROM counter WHERE id = 1",
            Vec::new(),
            |record| record.long(0),
        )
        .await?;
    assert_eq!(values, vec![20]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_statement_leaves_connection_usable() -> Result<(), Box<dyn std::error::Error>> {
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&unique_db_config("usable"), |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL)")
    })?;

    let err = access
        .execute(&db, "INSERT INTO no_such_table VALUES (?)", vec!["x".into()])
        .await
        .unwrap_err();
    assert!(matches!(err, DbAccessError::Sqlite(_)));

    access
        .execute(&db, "INSERT INTO t (name) VALUES (?)", vec!["ok".into()])
        .await?;
    assert_eq!(row_count(&access, &db).await?, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn panicking_row_mapper_leaves_connection_usable()
-> Result<(), Box<dyn std::error::Error>> {
    let access = DatabaseAccess::with_default_workers()?;
    let db = Database::open(&unique_db_config("panic"), |conn| {
        conn.execute_batch("CREATE TABLE t (name TEXT NOT NULL); INSERT INTO t VALUES ('x');")
    })?;

    // The unwinding worker drops the reply channel mid-job.
    let outcome = access
        .query(
            &db,
            "SELECT name FROM t",
            Vec::new(),
            |_record| -> Result<String, DbAccessError> { panic!("mapper blew up") },
        )
        .await;
    assert!(matches!(outcome, Err(DbAccessError::Connection(_))));

    // The lock the panic poisoned is recovered; later work still succeeds.
    access
        .execute(&db, "INSERT INTO t (name) VALUES (?)", vec!["ok".into()])
        .await?;
    assert_eq!(row_count(&access, &db).await?, 2);
    Ok(())
}
