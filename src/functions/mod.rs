//! Scalar functions exposed to the host query engine.
//!
//! - `ConsistentHashShard(table, date, range_id)`: shard owning a routing key
//! - `HashRangeBucket(v1, v2, ...)`: hash-range bucket of a sharding-key tuple
//! - `JumpConsistentHash(key, buckets)`: mapping-free jump hash bucket
//!
//! Functions are created per query by the [`FunctionFactory`], bound against the
//! argument types once, then executed over row batches.

mod bucket;
mod jump;
mod shard;

use std::sync::Arc;

pub use bucket::HashRangeBucket;
pub use jump::JumpConsistentHash;
pub use shard::ConsistentHashShard;

use crate::batch::{Column, RowBatch};
use crate::config::RouterConfig;
use crate::dictionary::MappingLookup;
use crate::error::{ConfigError, FunctionError, FunctionResult};
use crate::scalar::{DataType, ScalarValue};
use crate::sharding::{BucketBoundaryTable, BucketResolver, MappingVersion, ShardResolver};

/// Per-query settings visible to the functions
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    active_sharding_version: Option<String>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve shards with `version` for the whole query, e.g. to read a
    /// consistent snapshot while a reshard is in progress.
    pub fn with_active_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.active_sharding_version = (!version.is_empty()).then_some(version);
        self
    }

    pub fn active_sharding_version(&self) -> Option<&str> {
        self.active_sharding_version.as_deref()
    }
}

/// A scalar function over a row batch. Routing functions all produce UInt32.
pub trait ScalarFunction: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_variadic(&self) -> bool {
        false
    }

    /// Exact arity of non-variadic functions
    fn number_of_arguments(&self) -> usize;

    /// Validate argument types and return the result type
    fn return_type(&self, arguments: &[DataType]) -> FunctionResult<DataType>;

    /// Bind-time validation; called once by the host before execution
    fn bind(&self, arguments: &[DataType]) -> FunctionResult<DataType> {
        self.return_type(arguments)
    }

    fn execute_row(&self, batch: &RowBatch, arguments: &[usize], row: usize) -> FunctionResult<u32>;

    /// Evaluate once and broadcast when every argument is constant
    fn use_default_implementation_for_constants(&self) -> bool {
        true
    }

    fn execute(&self, batch: &RowBatch, arguments: &[usize]) -> FunctionResult<Column> {
        let types = batch.types_of(arguments)?;
        self.return_type(&types)?;

        let rows = batch.rows();
        if self.use_default_implementation_for_constants() && !arguments.is_empty() && rows > 0 {
            let mut all_const = true;
            for position in arguments {
                all_const &= batch.column(*position)?.is_const();
            }
            if all_const {
                let value = self.execute_row(batch, arguments, 0)?;
                return Ok(Column::constant(ScalarValue::UInt32(value), rows));
            }
        }

        let values = (0..rows)
            .map(|row| self.execute_row(batch, arguments, row))
            .collect::<FunctionResult<Vec<u32>>>()?;
        Ok(Column::UInt32(values))
    }
}

/// Evaluate `function` over a single row of constant values
pub fn evaluate(function: &dyn ScalarFunction, values: &[ScalarValue]) -> FunctionResult<u32> {
    let mut batch = RowBatch::new();
    for (i, value) in values.iter().enumerate() {
        batch.push(format!("arg{}", i), Column::constant(value.clone(), 1))?;
    }
    let arguments: Vec<usize> = (0..values.len()).collect();
    let types = batch.types_of(&arguments)?;
    function.bind(&types)?;
    function.execute_row(&batch, &arguments, 0)
}

pub(crate) fn check_arity(function: &str, arguments: &[DataType], expected: usize) -> FunctionResult<()> {
    if arguments.len() != expected {
        return Err(FunctionError::ArgumentCount {
            function: function.to_string(),
            passed: arguments.len(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_type(
    function: &str,
    arguments: &[DataType],
    position: usize,
    expected: DataType,
) -> FunctionResult<()> {
    if arguments[position] != expected {
        return Err(FunctionError::ArgumentType {
            function: function.to_string(),
            position,
            expected: expected.to_string(),
            found: arguments[position].clone(),
        });
    }
    Ok(())
}

/// Creates routing functions bound to the configured mapping and bucket table
pub struct FunctionFactory {
    config: RouterConfig,
    table: Arc<BucketBoundaryTable>,
    shard_resolver: ShardResolver,
}

impl FunctionFactory {
    pub const FUNCTIONS: [&'static str; 3] = [
        ConsistentHashShard::NAME,
        HashRangeBucket::NAME,
        JumpConsistentHash::NAME,
    ];

    pub fn new(config: RouterConfig, lookup: Arc<dyn MappingLookup>) -> Result<Self, ConfigError> {
        config.validate()?;
        let table = Arc::new(BucketBoundaryTable::new(config.routing.bucket_count)?);
        let shard_resolver = ShardResolver::with_dictionary(lookup, config.dictionary.name.clone());
        Ok(Self {
            config,
            table,
            shard_resolver,
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn bucket_resolver(&self) -> BucketResolver {
        BucketResolver::with_table(self.table.clone())
    }

    pub fn shard_resolver(&self) -> &ShardResolver {
        &self.shard_resolver
    }

    /// Mapping version shard lookups of this query resolve with
    pub fn version_for(&self, context: &QueryContext) -> MappingVersion {
        match context.active_sharding_version() {
            Some(version) => {
                tracing::debug!(version, "Found active sharding version");
                MappingVersion::new(version)
            }
            None => MappingVersion::new(self.config.routing.default_version.as_str()),
        }
    }

    /// Create the function `name` (case-insensitive) for one query
    pub fn get(&self, name: &str, context: &QueryContext) -> FunctionResult<Box<dyn ScalarFunction>> {
        let upper_name = name.to_uppercase();
        let function: Box<dyn ScalarFunction> = match upper_name.as_str() {
            "CONSISTENTHASHSHARD" => Box::new(ConsistentHashShard::new(
                self.shard_resolver.clone(),
                self.version_for(context),
            )),
            "HASHRANGEBUCKET" => Box::new(HashRangeBucket::new(
                self.bucket_resolver(),
                self.config.routing.unsupported_types,
            )),
            "JUMPCONSISTENTHASH" => Box::new(JumpConsistentHash),
            _ => return Err(FunctionError::UnknownFunction(name.to_string())),
        };
        Ok(function)
    }
}
