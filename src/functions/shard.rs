use super::{check_arity, check_type, ScalarFunction};
use crate::batch::RowBatch;
use crate::error::FunctionResult;
use crate::scalar::DataType;
use crate::sharding::{MappingVersion, ShardResolver};

/// `ConsistentHashShard(table String, date UInt32, range_id UInt32) -> UInt32`
///
/// Looks the shard up in the partition map under the mapping version fixed
/// when the function was created for the query.
pub struct ConsistentHashShard {
    resolver: ShardResolver,
    version: MappingVersion,
}

impl ConsistentHashShard {
    pub const NAME: &'static str = "ConsistentHashShard";

    pub fn new(resolver: ShardResolver, version: MappingVersion) -> Self {
        Self { resolver, version }
    }

    pub fn version(&self) -> &MappingVersion {
        &self.version
    }
}

impl ScalarFunction for ConsistentHashShard {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn number_of_arguments(&self) -> usize {
        3
    }

    fn return_type(&self, arguments: &[DataType]) -> FunctionResult<DataType> {
        check_arity(Self::NAME, arguments, 3)?;
        check_type(Self::NAME, arguments, 0, DataType::String)?;
        check_type(Self::NAME, arguments, 1, DataType::UInt32)?;
        check_type(Self::NAME, arguments, 2, DataType::UInt32)?;
        Ok(DataType::UInt32)
    }

    fn execute_row(&self, batch: &RowBatch, arguments: &[usize], row: usize) -> FunctionResult<u32> {
        let table = batch.column(arguments[0])?.read_string(row)?;
        let date = batch.column(arguments[1])?.read_u32(row)?;
        let range_id = batch.column(arguments[2])?.read_u32(row)?;

        tracing::debug!(table, date, range_id, version = %self.version, "Resolving shard");
        Ok(self.resolver.resolve(table, date, range_id, &self.version)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Column;
    use crate::dictionary::{ComplexKeyHashedDictionary, DictionaryRegistry};
    use crate::error::{FunctionError, RoutingError};
    use crate::scalar::ScalarValue;
    use crate::sharding::{DictionaryKey, DEFAULT_DICTIONARY};
    use std::sync::Arc;

    fn function(version: &str) -> ConsistentHashShard {
        let mut dict =
            ComplexKeyHashedDictionary::new(DEFAULT_DICTIONARY, vec!["A".to_string(), "B".to_string()]);
        for range_id in 1..=4 {
            let key = DictionaryKey::new("orders", "20230101", range_id);
            dict.insert(key.clone(), "A", (range_id % 2).to_string()).unwrap();
            dict.insert(key, "B", (range_id + 10).to_string()).unwrap();
        }
        let registry = Arc::new(DictionaryRegistry::new());
        registry.insert(Arc::new(dict));
        ConsistentHashShard::new(ShardResolver::new(registry), version.into())
    }

    fn batch(range_ids: Vec<u32>) -> RowBatch {
        let rows = range_ids.len();
        RowBatch::new()
            .with_column("table", Column::constant(ScalarValue::String("orders".to_string()), rows))
            .unwrap()
            .with_column("date", Column::UInt32(vec![20230101; rows]))
            .unwrap()
            .with_column("range_id", Column::UInt32(range_ids))
            .unwrap()
    }

    #[test]
    fn test_bind_checks_arity() {
        let f = function("A");
        let err = f.bind(&[DataType::String, DataType::UInt32]).unwrap_err();
        assert!(matches!(err, FunctionError::ArgumentCount { passed: 2, .. }));
    }

    #[test]
    fn test_bind_checks_types() {
        let f = function("A");
        let err = f
            .bind(&[DataType::UInt32, DataType::UInt32, DataType::UInt32])
            .unwrap_err();
        assert!(matches!(err, FunctionError::ArgumentType { position: 0, .. }));

        let err = f
            .bind(&[DataType::String, DataType::Other("Date".to_string()), DataType::UInt32])
            .unwrap_err();
        assert!(matches!(err, FunctionError::ArgumentType { position: 1, .. }));

        let err = f
            .bind(&[DataType::String, DataType::UInt32, DataType::UInt8])
            .unwrap_err();
        assert!(matches!(err, FunctionError::ArgumentType { position: 2, .. }));

        assert_eq!(
            f.bind(&[DataType::String, DataType::UInt32, DataType::UInt32]).unwrap(),
            DataType::UInt32
        );
    }

    #[test]
    fn test_execute_every_row() {
        let f = function("A");
        let column = f.execute(&batch(vec![1, 2, 3, 4]), &[0, 1, 2]).unwrap();
        assert_eq!(column, Column::UInt32(vec![1, 0, 1, 0]));

        let f = function("B");
        let column = f.execute(&batch(vec![4, 1]), &[0, 1, 2]).unwrap();
        assert_eq!(column, Column::UInt32(vec![14, 11]));
    }

    #[test]
    fn test_execute_fails_whole_batch_on_missing_shard() {
        let f = function("A");
        let err = f.execute(&batch(vec![1, 9]), &[0, 1, 2]).unwrap_err();
        assert!(matches!(
            err,
            FunctionError::Routing(RoutingError::ShardNotFound { .. })
        ));
    }
}
