//! Minimal columnar row batch.
//!
//! The routing functions only need "read typed scalar at row i of column j"; this
//! module provides that contract over plain vectors so the functions can be driven
//! by a host pipeline, the CLI and tests alike.

use crate::error::BatchError;
use crate::scalar::{DataType, ScalarValue};

/// Values of a single column
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    String(Vec<String>),
    UInt8(Vec<u8>),
    Int8(Vec<i8>),
    Int64(Vec<i64>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    /// Column of a type without accessor; values are opaque
    Other { data_type: DataType, rows: usize },
    /// The same value repeated on every row
    Const { value: ScalarValue, rows: usize },
}

impl Column {
    pub fn constant(value: ScalarValue, rows: usize) -> Self {
        Column::Const { value, rows }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::String(v) => v.len(),
            Column::UInt8(v) => v.len(),
            Column::Int8(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::UInt32(v) => v.len(),
            Column::UInt64(v) => v.len(),
            Column::Other { rows, .. } | Column::Const { rows, .. } => *rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Column::Const { .. })
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Column::String(_) => DataType::String,
            Column::UInt8(_) => DataType::UInt8,
            Column::Int8(_) => DataType::Int8,
            Column::Int64(_) => DataType::Int64,
            Column::UInt32(_) => DataType::UInt32,
            Column::UInt64(_) => DataType::UInt64,
            Column::Other { data_type, .. } => data_type.clone(),
            Column::Const { value, .. } => value.data_type(),
        }
    }

    fn check_row(&self, row: usize) -> Result<(), BatchError> {
        let rows = self.len();
        if row >= rows {
            return Err(BatchError::RowOutOfRange { row, rows });
        }
        Ok(())
    }

    fn mismatch(&self, expected: DataType) -> BatchError {
        BatchError::TypeMismatch {
            expected,
            found: self.data_type(),
        }
    }

    pub fn read_string(&self, row: usize) -> Result<&str, BatchError> {
        self.check_row(row)?;
        match self {
            Column::String(v) => Ok(&v[row]),
            Column::Const {
                value: ScalarValue::String(s),
                ..
            } => Ok(s),
            _ => Err(self.mismatch(DataType::String)),
        }
    }

    pub fn read_u8(&self, row: usize) -> Result<u8, BatchError> {
        self.check_row(row)?;
        match self {
            Column::UInt8(v) => Ok(v[row]),
            Column::Const {
                value: ScalarValue::UInt8(x),
                ..
            } => Ok(*x),
            _ => Err(self.mismatch(DataType::UInt8)),
        }
    }

    pub fn read_i8(&self, row: usize) -> Result<i8, BatchError> {
        self.check_row(row)?;
        match self {
            Column::Int8(v) => Ok(v[row]),
            Column::Const {
                value: ScalarValue::Int8(x),
                ..
            } => Ok(*x),
            _ => Err(self.mismatch(DataType::Int8)),
        }
    }

    pub fn read_i64(&self, row: usize) -> Result<i64, BatchError> {
        self.check_row(row)?;
        match self {
            Column::Int64(v) => Ok(v[row]),
            Column::Const {
                value: ScalarValue::Int64(x),
                ..
            } => Ok(*x),
            _ => Err(self.mismatch(DataType::Int64)),
        }
    }

    pub fn read_u32(&self, row: usize) -> Result<u32, BatchError> {
        self.check_row(row)?;
        match self {
            Column::UInt32(v) => Ok(v[row]),
            Column::Const {
                value: ScalarValue::UInt32(x),
                ..
            } => Ok(*x),
            _ => Err(self.mismatch(DataType::UInt32)),
        }
    }

    pub fn read_u64(&self, row: usize) -> Result<u64, BatchError> {
        self.check_row(row)?;
        match self {
            Column::UInt64(v) => Ok(v[row]),
            Column::Const {
                value: ScalarValue::UInt64(x),
                ..
            } => Ok(*x),
            _ => Err(self.mismatch(DataType::UInt64)),
        }
    }

    /// Read the value at `row` whatever its type
    pub fn read_scalar(&self, row: usize) -> Result<ScalarValue, BatchError> {
        self.check_row(row)?;
        let value = match self {
            Column::String(v) => ScalarValue::String(v[row].clone()),
            Column::UInt8(v) => ScalarValue::UInt8(v[row]),
            Column::Int8(v) => ScalarValue::Int8(v[row]),
            Column::Int64(v) => ScalarValue::Int64(v[row]),
            Column::UInt32(v) => ScalarValue::UInt32(v[row]),
            Column::UInt64(v) => ScalarValue::UInt64(v[row]),
            Column::Other { data_type, .. } => ScalarValue::Unsupported(data_type.clone()),
            Column::Const { value, .. } => value.clone(),
        };
        Ok(value)
    }
}

/// A named, typed column inside a batch
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColumn {
    pub name: String,
    pub column: Column,
}

/// A set of equally sized columns
#[derive(Debug, Clone, Default)]
pub struct RowBatch {
    columns: Vec<NamedColumn>,
    rows: usize,
}

impl RowBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, returning its position.
    pub fn push(&mut self, name: impl Into<String>, column: Column) -> Result<usize, BatchError> {
        if !self.columns.is_empty() && column.len() != self.rows {
            return Err(BatchError::LengthMismatch(self.rows, column.len()));
        }
        self.rows = column.len();
        self.columns.push(NamedColumn {
            name: name.into(),
            column,
        });
        Ok(self.columns.len() - 1)
    }

    /// Builder form of [`RowBatch::push`]
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, BatchError> {
        self.push(name, column)?;
        Ok(self)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, position: usize) -> Result<&Column, BatchError> {
        self.columns
            .get(position)
            .map(|c| &c.column)
            .ok_or(BatchError::ColumnNotFound(position))
    }

    pub fn column_name(&self, position: usize) -> Result<&str, BatchError> {
        self.columns
            .get(position)
            .map(|c| c.name.as_str())
            .ok_or(BatchError::ColumnNotFound(position))
    }

    /// Declared types of the columns at `positions`
    pub fn types_of(&self, positions: &[usize]) -> Result<Vec<DataType>, BatchError> {
        positions
            .iter()
            .map(|p| self.column(*p).map(Column::data_type))
            .collect()
    }
}
