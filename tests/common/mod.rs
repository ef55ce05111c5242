//! Common test utilities for routing tests
//!
//! Provides shared helper functions for:
//! - Writing partition map CSV files
//! - Building a registry and function factory over them

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use reshard::dictionary::CsvMappingSource;
use reshard::sharding::DEFAULT_DICTIONARY;
use reshard::{DictionaryRegistry, FunctionFactory, RouterConfig};
use tempfile::NamedTempFile;

/// Two versions of the `orders` table for 2023-01-01; range 9 is unmapped,
/// range 7 is only mapped in version B.
pub const PARTITION_MAP: &str = "\
table,date,range_id,A,B
orders,20230101,1,0,10
orders,20230101,2,1,11
orders,20230101,3,1,11
orders,20230101,4,2,12
orders,20230101,5,3,13
orders,20230101,6,3,14
orders,20230101,7,,15
users,20230101,5,8,8
";

pub fn write_partition_map(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write partition map");
    file.flush().expect("Failed to flush partition map");
    file
}

pub fn create_registry(file: &NamedTempFile) -> Arc<DictionaryRegistry> {
    let registry = Arc::new(DictionaryRegistry::new());
    registry.register(DEFAULT_DICTIONARY, Arc::new(CsvMappingSource::new(file.path())));
    registry
}

/// Factory over the default partition map; keep the file alive for the test
pub fn create_test_factory() -> (FunctionFactory, Arc<DictionaryRegistry>, NamedTempFile) {
    let file = write_partition_map(PARTITION_MAP);
    let registry = create_registry(&file);
    let factory = FunctionFactory::new(RouterConfig::default(), registry.clone())
        .expect("Failed to create function factory");
    (factory, registry, file)
}
