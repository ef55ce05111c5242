use super::ScalarFunction;
use crate::batch::RowBatch;
use crate::config::UnsupportedTypePolicy;
use crate::error::{FunctionError, FunctionResult};
use crate::scalar::DataType;
use crate::sharding::bucket::{is_hashable, BucketResolver};

/// `HashRangeBucket(v1, v2, ...) -> UInt32`
///
/// Bucket id of the sharding-key tuple, in argument order.
pub struct HashRangeBucket {
    resolver: BucketResolver,
    policy: UnsupportedTypePolicy,
}

impl HashRangeBucket {
    pub const NAME: &'static str = "HashRangeBucket";

    pub fn new(resolver: BucketResolver, policy: UnsupportedTypePolicy) -> Self {
        Self { resolver, policy }
    }
}

impl ScalarFunction for HashRangeBucket {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_variadic(&self) -> bool {
        true
    }

    fn number_of_arguments(&self) -> usize {
        0
    }

    fn return_type(&self, arguments: &[DataType]) -> FunctionResult<DataType> {
        if arguments.is_empty() {
            return Err(FunctionError::ArgumentCount {
                function: Self::NAME.to_string(),
                passed: 0,
                expected: "at least 1".to_string(),
            });
        }

        if self.policy == UnsupportedTypePolicy::Reject {
            if let Some(position) = arguments.iter().position(|t| !is_hashable(t)) {
                return Err(FunctionError::ArgumentType {
                    function: Self::NAME.to_string(),
                    position,
                    expected: "UInt8, Int8, Int64 or String".to_string(),
                    found: arguments[position].clone(),
                });
            }
        }

        Ok(DataType::UInt32)
    }

    fn bind(&self, arguments: &[DataType]) -> FunctionResult<DataType> {
        let return_type = self.return_type(arguments)?;
        for (position, data_type) in arguments.iter().enumerate() {
            if !is_hashable(data_type) {
                tracing::warn!(
                    position,
                    data_type = %data_type,
                    "{} argument does not contribute to the bucket hash",
                    Self::NAME
                );
            }
        }
        Ok(return_type)
    }

    fn execute_row(&self, batch: &RowBatch, arguments: &[usize], row: usize) -> FunctionResult<u32> {
        let mut values = Vec::with_capacity(arguments.len());
        for position in arguments {
            values.push(batch.column(*position)?.read_scalar(row)?);
        }
        Ok(self.resolver.resolve(&values))
    }
}
