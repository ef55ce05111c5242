use super::{check_arity, check_type, ScalarFunction};
use crate::batch::RowBatch;
use crate::error::{FunctionError, FunctionResult};
use crate::scalar::DataType;
use crate::sharding::jump::{jump_consistent_hash, jump_str};

/// `JumpConsistentHash(key UInt64|String, buckets UInt32) -> UInt32`
///
/// Returns a 0-based bucket; string keys are hashed with seahash first.
pub struct JumpConsistentHash;

impl JumpConsistentHash {
    pub const NAME: &'static str = "JumpConsistentHash";
}

impl ScalarFunction for JumpConsistentHash {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn number_of_arguments(&self) -> usize {
        2
    }

    fn return_type(&self, arguments: &[DataType]) -> FunctionResult<DataType> {
        check_arity(Self::NAME, arguments, 2)?;
        if !matches!(arguments[0], DataType::UInt64 | DataType::String) {
            return Err(FunctionError::ArgumentType {
                function: Self::NAME.to_string(),
                position: 0,
                expected: "UInt64 or String".to_string(),
                found: arguments[0].clone(),
            });
        }
        check_type(Self::NAME, arguments, 1, DataType::UInt32)?;
        Ok(DataType::UInt32)
    }

    fn execute_row(&self, batch: &RowBatch, arguments: &[usize], row: usize) -> FunctionResult<u32> {
        let buckets = batch.column(arguments[1])?.read_u32(row)?;
        if buckets == 0 {
            return Err(FunctionError::InvalidArgument {
                function: Self::NAME.to_string(),
                reason: "number of buckets must be at least 1".to_string(),
            });
        }

        let key = batch.column(arguments[0])?;
        let bucket = match key.data_type() {
            DataType::String => jump_str(key.read_string(row)?, buckets),
            _ => jump_consistent_hash(key.read_u64(row)?, buckets),
        };
        Ok(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Column;
    use crate::functions::evaluate;
    use crate::scalar::ScalarValue;

    #[test]
    fn test_bind() {
        let f = JumpConsistentHash;
        assert!(f.bind(&[DataType::UInt64, DataType::UInt32]).is_ok());
        assert!(f.bind(&[DataType::String, DataType::UInt32]).is_ok());
        assert!(matches!(
            f.bind(&[DataType::Int64, DataType::UInt32]),
            Err(FunctionError::ArgumentType { position: 0, .. })
        ));
        assert!(matches!(
            f.bind(&[DataType::UInt64]),
            Err(FunctionError::ArgumentCount { .. })
        ));
    }

    #[test]
    fn test_execute() {
        let batch = RowBatch::new()
            .with_column("key", Column::UInt64(vec![1, 2, 3]))
            .unwrap()
            .with_column("buckets", Column::constant(ScalarValue::UInt32(1), 3))
            .unwrap();
        assert_eq!(
            JumpConsistentHash.execute(&batch, &[0, 1]).unwrap(),
            Column::UInt32(vec![0, 0, 0])
        );
    }

    #[test]
    fn test_string_key_matches_seahash() {
        let value = evaluate(
            &JumpConsistentHash,
            &[ScalarValue::String("orders".to_string()), ScalarValue::UInt32(8)],
        )
        .unwrap();
        assert_eq!(value, jump_str("orders", 8));
    }

    #[test]
    fn test_zero_buckets() {
        let err = evaluate(&JumpConsistentHash, &[ScalarValue::UInt64(1), ScalarValue::UInt32(0)])
            .unwrap_err();
        assert!(matches!(err, FunctionError::InvalidArgument { .. }));
    }
}
