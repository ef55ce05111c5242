//! Scalar types and values flowing through the routing functions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a function argument or column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    UInt8,
    Int8,
    Int64,
    UInt32,
    UInt64,
    /// Any type the routing core has no accessor for (Date, Float64, ...)
    Other(String),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::String => f.write_str("String"),
            DataType::UInt8 => f.write_str("UInt8"),
            DataType::Int8 => f.write_str("Int8"),
            DataType::Int64 => f.write_str("Int64"),
            DataType::UInt32 => f.write_str("UInt32"),
            DataType::UInt64 => f.write_str("UInt64"),
            DataType::Other(name) => f.write_str(name),
        }
    }
}

/// One typed value read at a single row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarValue {
    UInt8(u8),
    Int8(i8),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    String(String),
    /// A value of a type without accessor; only its type is known
    Unsupported(DataType),
}

impl ScalarValue {
    pub fn data_type(&self) -> DataType {
        match self {
            ScalarValue::UInt8(_) => DataType::UInt8,
            ScalarValue::Int8(_) => DataType::Int8,
            ScalarValue::Int64(_) => DataType::Int64,
            ScalarValue::UInt32(_) => DataType::UInt32,
            ScalarValue::UInt64(_) => DataType::UInt64,
            ScalarValue::String(_) => DataType::String,
            ScalarValue::Unsupported(data_type) => data_type.clone(),
        }
    }

    /// Parse a typed literal such as `u8:7`, `i64:-3` or `str:orders`.
    ///
    /// Text without a known prefix is taken as a string.
    pub fn parse_literal(literal: &str) -> Result<Self, String> {
        let Some((prefix, raw)) = literal.split_once(':') else {
            return Ok(ScalarValue::String(literal.to_string()));
        };

        let parsed = match prefix {
            "u8" => raw.parse().map(ScalarValue::UInt8).map_err(|e| e.to_string()),
            "i8" => raw.parse().map(ScalarValue::Int8).map_err(|e| e.to_string()),
            "i64" => raw.parse().map(ScalarValue::Int64).map_err(|e| e.to_string()),
            "u32" => raw.parse().map(ScalarValue::UInt32).map_err(|e| e.to_string()),
            "u64" => raw.parse().map(ScalarValue::UInt64).map_err(|e| e.to_string()),
            "str" => Ok(ScalarValue::String(raw.to_string())),
            _ => return Ok(ScalarValue::String(literal.to_string())),
        };

        parsed.map_err(|e| format!("invalid {} literal '{}': {}", prefix, raw, e))
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::UInt8(v) => write!(f, "{}", v),
            ScalarValue::Int8(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::UInt32(v) => write!(f, "{}", v),
            ScalarValue::UInt64(v) => write!(f, "{}", v),
            ScalarValue::String(v) => f.write_str(v),
            ScalarValue::Unsupported(data_type) => write!(f, "<{}>", data_type),
        }
    }
}
