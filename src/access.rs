use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use rusqlite::InterruptHandle;
use tokio::sync::oneshot;

use crate::db::Database;
use crate::error::DbAccessError;
use crate::params::SqlParam;
use crate::record::Record;
use crate::transaction::{Transaction, run_mapped_query};
use crate::worker::WorkerPool;

/// Worker-pool size used by [`DatabaseAccess::with_default_workers`].
pub const DEFAULT_WORKERS: usize = 4;

/// Asynchronous facade over one or more [`Database`] handles.
///
/// Every operation is dispatched onto a bounded worker pool and executed
/// synchronously against the connection there; the caller suspends until
/// the worker resolves the outcome. Dispatched work is not guaranteed to
/// run in submission order.
///
/// Cancellation is cooperative: dropping a returned future raises an abort
/// signal against that call's own statement, which the engine observes at
/// its next interruption checkpoint (typically between row fetches). Work
/// that has not started yet is skipped instead; work that already finished
/// is unaffected (cancellation is advisory and racy by nature). Any open
/// transaction is rolled back before the worker unwinds.
///
/// A panic in a caller-supplied row mapper or `transact` block unwinds its
/// worker thread; the connection stays usable, but the pool is left one
/// thread smaller and the caller observes a connection error.
pub struct DatabaseAccess {
    pool: WorkerPool,
}

impl DatabaseAccess {
    /// Start a facade backed by `workers` dedicated threads.
    ///
    /// # Errors
    /// Returns [`DbAccessError::Connection`] if `workers` is zero or a
    /// worker thread cannot be spawned.
    pub fn new(workers: usize) -> Result<Self, DbAccessError> {
        Ok(Self {
            pool: WorkerPool::spawn(workers)?,
        })
    }

    /// Start a facade with [`DEFAULT_WORKERS`] threads.
    ///
    /// # Errors
    /// Returns [`DbAccessError::Connection`] if a worker thread cannot be
    /// spawned.
    pub fn with_default_workers() -> Result<Self, DbAccessError> {
        Self::new(DEFAULT_WORKERS)
    }

    /// Run a read statement on the pool, applying `row_mapper` to a fresh
    /// [`Record`] per row, and return the mapped results in row order.
    ///
    /// Cancelling the returned future aborts the in-flight statement; the
    /// caller never observes a partial result.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if preparation, binding, evaluation, or
    /// `row_mapper` fails, or [`DbAccessError::Cancelled`] if the work was
    /// cancelled before it started.
    pub async fn query<T, F>(
        &self,
        db: &Database,
        sql: &str,
        params: Vec<SqlParam>,
        row_mapper: F,
    ) -> Result<Vec<T>, DbAccessError>
    where
        F: FnMut(&Record<'_>) -> Result<T, DbAccessError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let state = JobState::new();
        let job_state = Arc::clone(&state);
        let job_db = db.clone();
        let sql = sql.to_owned();
        self.pool.submit(move || {
            let outcome = if job_state.try_start() {
                let conn = job_db.lock();
                let outcome = run_mapped_query(&conn, &sql, &params, row_mapper);
                job_state.finish();
                outcome
            } else {
                Err(DbAccessError::Cancelled)
            };
            let _ = reply_tx.send(outcome);
        })?;

        let guard = CancelGuard::arm(db.interrupt_handle(), state);
        let reply = reply_rx.await;
        guard.disarm();
        await_outcome(reply)
    }

    /// Run a single write or DDL statement wrapped in its own transaction.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if the statement fails; the transaction is
    /// rolled back.
    pub async fn execute(
        &self,
        db: &Database,
        sql: &str,
        params: Vec<SqlParam>,
    ) -> Result<(), DbAccessError> {
        let sql = sql.to_owned();
        self.transact(db, move |tx| tx.execute(&sql, &params)).await
    }

    /// Run `block` as one atomic unit of work on a worker thread.
    ///
    /// An engine-level transaction is begun before the block and ended
    /// unconditionally after it: committed if the block returns `Ok`,
    /// rolled back on error or cancellation. The block's result is only
    /// delivered once the transaction has been ended.
    ///
    /// # Errors
    /// Returns the block's error after rollback, or
    /// [`DbAccessError::Cancelled`] if a statement inside the block was
    /// interrupted by cancellation.
    pub async fn transact<T, F>(&self, db: &Database, block: F) -> Result<T, DbAccessError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, DbAccessError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let state = JobState::new();
        let job_state = Arc::clone(&state);
        let job_db = db.clone();
        self.pool.submit(move || {
            let outcome = if job_state.try_start() {
                let outcome = run_transact(&job_db, block);
                job_state.finish();
                outcome
            } else {
                Err(DbAccessError::Cancelled)
            };
            let _ = reply_tx.send(outcome);
        })?;

        let guard = CancelGuard::arm(db.interrupt_handle(), state);
        let reply = reply_rx.await;
        guard.disarm();
        await_outcome(reply)
    }

    /// Rewrite the database file compactly, reclaiming space left by prior
    /// deletions (`VACUUM`).
    ///
    /// Blocks all other readers and writers on the connection for its
    /// duration. Not cancellable; the engine cannot safely interrupt a
    /// vacuum mid-rewrite.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if the engine rejects the vacuum.
    pub async fn cleanup(&self, db: &Database) -> Result<(), DbAccessError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job_db = db.clone();
        self.pool.submit(move || {
            let conn = job_db.lock();
            let started = Instant::now();
            let outcome = conn.execute_batch("VACUUM").map_err(DbAccessError::from);
            tracing::debug!(
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "vacuum finished"
            );
            let _ = reply_tx.send(outcome);
        })?;
        await_outcome(reply_rx.await)
    }
}

fn run_transact<T, F>(db: &Database, block: F) -> Result<T, DbAccessError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, DbAccessError>,
{
    let mut conn = db.lock();
    let tx = conn.transaction()?;
    match block(&Transaction::new(&tx)) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

fn await_outcome<T>(
    reply: Result<Result<T, DbAccessError>, oneshot::error::RecvError>,
) -> Result<T, DbAccessError> {
    match reply {
        Ok(outcome) => outcome,
        Err(_) => Err(DbAccessError::Connection(
            "database worker dropped the reply channel".into(),
        )),
    }
}

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const DONE: u8 = 2;
const ABORTED: u8 = 3;

/// Lifecycle of one dispatched job, shared between the worker executing it
/// and the [`CancelGuard`] watching it. Scopes the connection-wide
/// interrupt to the job it belongs to: cancellation skips work that never
/// started, interrupts work that is running, and is a no-op for work that
/// already finished.
struct JobState(AtomicU8);

impl JobState {
    fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(NOT_STARTED)))
    }

    /// Claim the job for execution; `false` means it was cancelled while
    /// still queued and must not touch the engine.
    fn try_start(&self) -> bool {
        self.0
            .compare_exchange(NOT_STARTED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn finish(&self) {
        self.0.store(DONE, Ordering::Release);
    }

    /// Record the cancellation; `true` means the job is currently running
    /// and its statement needs an interrupt.
    fn cancel(&self) -> bool {
        match self
            .0
            .compare_exchange(NOT_STARTED, ABORTED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => false,
            Err(observed) => observed == RUNNING,
        }
    }
}

/// Bridges dropping the caller's future to the engine's statement-interrupt
/// hook. Armed for the duration of the await; disarmed once the worker has
/// replied.
struct CancelGuard {
    interrupt: Arc<InterruptHandle>,
    state: Arc<JobState>,
    armed: bool,
}

impl CancelGuard {
    fn arm(interrupt: Arc<InterruptHandle>, state: Arc<JobState>) -> Self {
        Self {
            interrupt,
            state,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        // Interrupt only while our own job runs; a job that finished
        // between the check and the interrupt is the inherent racy window
        // of an advisory signal.
        if self.armed && self.state.cancel() {
            self.interrupt.interrupt();
        }
    }
}
