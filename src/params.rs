use rusqlite::types::Value;

use crate::error::DbAccessError;

/// A positionally bound statement parameter.
///
/// Values are handed to the engine through its own binding API, never by
/// splicing into statement text, so text is injection-safe and blobs survive
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlParam {
    pub(crate) fn to_engine(&self) -> Value {
        match self {
            SqlParam::Null => Value::Null,
            SqlParam::Integer(i) => Value::Integer(*i),
            SqlParam::Real(f) => Value::Real(*f),
            SqlParam::Text(s) => Value::Text(s.clone()),
            SqlParam::Blob(b) => Value::Blob(b.clone()),
        }
    }
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        SqlParam::Text(value.to_owned())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        SqlParam::Text(value)
    }
}

impl From<i16> for SqlParam {
    fn from(value: i16) -> Self {
        SqlParam::Integer(i64::from(value))
    }
}

impl From<i32> for SqlParam {
    fn from(value: i32) -> Self {
        SqlParam::Integer(i64::from(value))
    }
}

impl From<i64> for SqlParam {
    fn from(value: i64) -> Self {
        SqlParam::Integer(value)
    }
}

impl From<f64> for SqlParam {
    fn from(value: f64) -> Self {
        SqlParam::Real(value)
    }
}

impl From<Vec<u8>> for SqlParam {
    fn from(value: Vec<u8>) -> Self {
        SqlParam::Blob(value)
    }
}

impl From<&[u8]> for SqlParam {
    fn from(value: &[u8]) -> Self {
        SqlParam::Blob(value.to_vec())
    }
}

impl<T> From<Option<T>> for SqlParam
where
    T: Into<SqlParam>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlParam::Null, Into::into)
    }
}

pub(crate) fn to_engine_values(params: &[SqlParam]) -> Vec<Value> {
    params.iter().map(SqlParam::to_engine).collect()
}

/// Reject a bind list whose length disagrees with the statement's
/// placeholder count before any row is stepped.
pub(crate) fn ensure_param_count(
    stmt: &rusqlite::Statement<'_>,
    supplied: usize,
) -> Result<(), DbAccessError> {
    let expected = stmt.parameter_count();
    if expected == supplied {
        Ok(())
    } else {
        Err(DbAccessError::Parameter(format!(
            "statement expects {expected} bound parameters, got {supplied}"
        )))
    }
}
