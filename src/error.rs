use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::scalar::DataType;

/// The full lookup context of one shard resolution.
///
/// Carried by every [`RoutingError`] so a failure can be diagnosed from the
/// message alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupContext {
    pub table: String,
    pub date: u32,
    pub range_id: u32,
    pub version: String,
}

impl fmt::Display for LookupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table: {}, date: {}, rangeId: {}, activeVersion: {}",
            self.table, self.date, self.range_id, self.version
        )
    }
}

/// Shard resolution failures. All of them are terminal for the call.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Mapping dictionary '{dictionary}' can't be loaded for {context}: {reason}")]
    MappingUnavailable {
        dictionary: String,
        context: LookupContext,
        reason: String,
    },

    #[error("Mapping dictionary '{dictionary}' is malformed for {context}: {reason}")]
    MappingMalformed {
        dictionary: String,
        context: LookupContext,
        reason: String,
    },

    #[error("Shard not found in dictionary '{dictionary}' for {context}")]
    ShardNotFound {
        dictionary: String,
        context: LookupContext,
    },
}

impl RoutingError {
    /// Lookup context of the failed resolution
    pub fn context(&self) -> &LookupContext {
        match self {
            RoutingError::MappingUnavailable { context, .. }
            | RoutingError::MappingMalformed { context, .. }
            | RoutingError::ShardNotFound { context, .. } => context,
        }
    }
}

/// Errors reading a typed value out of a row batch
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    #[error("Column {0} does not exist in batch")]
    ColumnNotFound(usize),

    #[error("Row {row} out of range for column of {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("Column type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: DataType, found: DataType },

    #[error("Columns have different row counts: {0} vs {1}")]
    LengthMismatch(usize, usize),
}

/// Errors raised while binding or executing a scalar function
#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Number of arguments for function {function} doesn't match: passed {passed}, should be {expected}")]
    ArgumentCount {
        function: String,
        passed: usize,
        expected: String,
    },

    #[error("Illegal type {found} of argument {position} of function {function}, expected {expected}")]
    ArgumentType {
        function: String,
        position: usize,
        expected: String,
        found: DataType,
    },

    #[error("Invalid argument for function {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Errors of the reference dictionary collaborator
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Dictionary '{0}' not found")]
    NotFound(String),

    #[error("Dictionary '{name}' failed to load: {reason}")]
    Load { name: String, reason: String },

    #[error("Dictionary '{dictionary}' has no attribute '{attribute}'")]
    UnknownAttribute {
        dictionary: String,
        attribute: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
pub type FunctionResult<T> = Result<T, FunctionError>;
pub type DictionaryResult<T> = Result<T, DictionaryError>;

impl Serialize for RoutingError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl Serialize for FunctionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
