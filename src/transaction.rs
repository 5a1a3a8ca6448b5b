use rusqlite::params_from_iter;

use crate::error::DbAccessError;
use crate::params::{SqlParam, ensure_param_count, to_engine_values};
use crate::record::Record;

/// Synchronous execution context scoped to one atomic unit of work.
///
/// Constructed by [`DatabaseAccess::transact`](crate::DatabaseAccess::transact)
/// on a worker thread and handed to the caller's block. Statements issued
/// through it share the engine-level transaction and observe each other's
/// writes immediately; the transaction commits only if the block returns
/// `Ok`, and is ended unconditionally before control returns to the caller.
pub struct Transaction<'conn> {
    conn: &'conn rusqlite::Connection,
}

impl<'conn> Transaction<'conn> {
    pub(crate) fn new(conn: &'conn rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Execute a read statement and apply `row_mapper` to a fresh [`Record`]
    /// for every row, accumulating results in row order.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if the statement fails to prepare or
    /// evaluate, if the bind list length does not match the placeholder
    /// count, or if `row_mapper` fails.
    pub fn query<T, F>(
        &self,
        sql: &str,
        params: &[SqlParam],
        row_mapper: F,
    ) -> Result<Vec<T>, DbAccessError>
    where
        F: FnMut(&Record<'_>) -> Result<T, DbAccessError>,
    {
        run_mapped_query(self.conn, sql, params, row_mapper)
    }

    /// Execute a single write or DDL statement with positional binding.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if preparation, binding, or execution
    /// fails.
    pub fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<(), DbAccessError> {
        run_execute(self.conn, sql, params)
    }
}

/// Prepare, bind, and iterate a read statement, mapping each row.
///
/// Shared by [`Transaction::query`] and the facade's standalone query path.
pub(crate) fn run_mapped_query<T, F>(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[SqlParam],
    mut row_mapper: F,
) -> Result<Vec<T>, DbAccessError>
where
    F: FnMut(&Record<'_>) -> Result<T, DbAccessError>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    ensure_param_count(&stmt, params.len())?;
    let mut rows = stmt.query(params_from_iter(to_engine_values(params)))?;
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        results.push(row_mapper(&Record::new(row))?);
    }
    Ok(results)
}

pub(crate) fn run_execute(
    conn: &rusqlite::Connection,
    sql: &str,
    params: &[SqlParam],
) -> Result<(), DbAccessError> {
    let mut stmt = conn.prepare_cached(sql)?;
    ensure_param_count(&stmt, params.len())?;
    stmt.execute(params_from_iter(to_engine_values(params)))?;
    Ok(())
}
