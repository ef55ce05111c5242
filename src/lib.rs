pub mod batch;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod functions;
pub mod scalar;
pub mod sharding;

pub use batch::{Column, RowBatch};
pub use config::{RouterConfig, UnsupportedTypePolicy};
pub use dictionary::{Dictionary, DictionaryRegistry, MappingLookup};
pub use error::{BatchError, DictionaryError, FunctionError, LookupContext, RoutingError};
pub use functions::{FunctionFactory, QueryContext, ScalarFunction};
pub use scalar::{DataType, ScalarValue};
pub use sharding::{BucketBoundaryTable, BucketResolver, MappingVersion, RoutingKey, ShardId, ShardResolver};
