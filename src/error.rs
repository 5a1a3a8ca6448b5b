use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbAccessError {
    #[error(transparent)]
    Sqlite(rusqlite::Error),

    /// The caller's asynchronous context was cancelled while the operation
    /// was in flight. Any open transaction has already been rolled back.
    #[error("operation cancelled")]
    Cancelled,

    #[error("parameter binding error: {0}")]
    Parameter(String),

    #[error("connection error: {0}")]
    Connection(String),
}

impl From<rusqlite::Error> for DbAccessError {
    fn from(err: rusqlite::Error) -> Self {
        if is_interrupted(&err) {
            DbAccessError::Cancelled
        } else {
            DbAccessError::Sqlite(err)
        }
    }
}

/// An interrupted statement surfaces as `SQLITE_INTERRUPT`; we report it as
/// cancellation rather than a statement failure.
fn is_interrupted(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::OperationInterrupted
    )
}
