use rusqlite::types::Type;

use crate::error::DbAccessError;

/// Native storage class of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl From<Type> for ColumnType {
    fn from(value: Type) -> Self {
        match value {
            Type::Null => ColumnType::Null,
            Type::Integer => ColumnType::Integer,
            Type::Real => ColumnType::Real,
            Type::Text => ColumnType::Text,
            Type::Blob => ColumnType::Blob,
        }
    }
}

/// Read-only view over the current row of an in-flight result set.
///
/// A `Record` is only valid for the duration of the row-mapper invocation
/// that received it; the borrow prevents it from outliving the iteration
/// step. Accessors take a zero-based field index and never advance the
/// cursor. An out-of-range index, or a coercion the underlying value cannot
/// satisfy, is a caller error surfaced through the accessor's `Result`.
pub struct Record<'a> {
    row: &'a rusqlite::Row<'a>,
}

impl<'a> Record<'a> {
    pub(crate) fn new(row: &'a rusqlite::Row<'a>) -> Self {
        Self { row }
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// is not a blob.
    pub fn blob(&self, field_index: usize) -> Result<Vec<u8>, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// cannot be read as text.
    pub fn text(&self, field_index: usize) -> Result<String, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// does not fit a 16-bit signed integer.
    pub fn short(&self, field_index: usize) -> Result<i16, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// does not fit a 32-bit signed integer.
    pub fn int(&self, field_index: usize) -> Result<i32, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// is not an integer.
    pub fn long(&self, field_index: usize) -> Result<i64, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// is not numeric.
    pub fn float(&self, field_index: usize) -> Result<f32, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range or the value
    /// is not numeric.
    pub fn double(&self, field_index: usize) -> Result<f64, DbAccessError> {
        Ok(self.row.get(field_index)?)
    }

    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range.
    pub fn is_null(&self, field_index: usize) -> Result<bool, DbAccessError> {
        Ok(self.row.get_ref(field_index)?.data_type() == Type::Null)
    }

    /// Native storage class of the field, independent of any coercion.
    ///
    /// # Errors
    /// Returns [`DbAccessError`] if the index is out of range.
    pub fn column_type(&self, field_index: usize) -> Result<ColumnType, DbAccessError> {
        Ok(self.row.get_ref(field_index)?.data_type().into())
    }
}
