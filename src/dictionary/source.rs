//! Mapping sources the registry (re)loads dictionaries from.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use super::{ComplexKeyHashedDictionary, Dictionary};
use crate::error::{DictionaryError, DictionaryResult};
use crate::sharding::table::DictionaryKey;

const KEY_COLUMNS: [&str; 3] = ["table", "date", "range_id"];

/// Something that can produce a fresh generation of a dictionary
pub trait DictionarySource: Send + Sync {
    fn load(&self, name: &str) -> DictionaryResult<Arc<dyn Dictionary>>;

    /// Human readable origin, for logs
    fn describe(&self) -> String;
}

/// CSV partition map.
///
/// Header is `table,date,range_id,<version>...`; every column after the key
/// columns is a mapping version. An empty cell means no shard for that version.
#[derive(Debug, Clone)]
pub struct CsvMappingSource {
    path: PathBuf,
}

impl CsvMappingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a partition map from any reader
    pub fn parse<R: Read>(name: &str, reader: R) -> DictionaryResult<ComplexKeyHashedDictionary> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let load_error = |reason: String| DictionaryError::Load {
            name: name.to_string(),
            reason,
        };

        if headers.len() <= KEY_COLUMNS.len() {
            return Err(load_error(format!(
                "expected columns {} followed by at least one version column",
                KEY_COLUMNS.join(",")
            )));
        }
        for (idx, expected) in KEY_COLUMNS.iter().enumerate() {
            if !headers[idx].eq_ignore_ascii_case(expected) {
                return Err(load_error(format!(
                    "column {} must be '{}', found '{}'",
                    idx + 1,
                    expected,
                    &headers[idx]
                )));
            }
        }

        let versions: Vec<String> = headers
            .iter()
            .skip(KEY_COLUMNS.len())
            .map(str::to_string)
            .collect();
        let mut dictionary = ComplexKeyHashedDictionary::new(name, versions);

        for record in csv_reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();

            let range_id: u32 = record[2].parse().map_err(|_| {
                load_error(format!(
                    "line {}: range_id '{}' is not an unsigned integer",
                    line, &record[2]
                ))
            })?;
            let key = DictionaryKey::new(&record[0], &record[1], range_id);

            let values = record
                .iter()
                .skip(KEY_COLUMNS.len())
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect();

            if dictionary.insert_row(key.clone(), values) {
                tracing::warn!(dictionary = name, line, key = %key, "Duplicate mapping key, last row wins");
            }
        }

        Ok(dictionary)
    }
}

impl DictionarySource for CsvMappingSource {
    fn load(&self, name: &str) -> DictionaryResult<Arc<dyn Dictionary>> {
        let file = std::fs::File::open(&self.path)?;
        let dictionary = Self::parse(name, file)?;
        tracing::debug!(
            dictionary = name,
            path = %self.path.display(),
            rows = dictionary.len(),
            "Parsed partition map"
        );
        Ok(Arc::new(dictionary))
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "\
table,date,range_id,A,B
orders,20230101,5,3,4
orders,20230101,6,3,
# retired rows are commented out
users,20230101,1,,2
";

    #[test]
    fn test_parse_partition_map() {
        let dict = CsvMappingSource::parse("maps", MAP.as_bytes()).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.attributes(), &["A".to_string(), "B".to_string()]);

        let key = DictionaryKey::new("orders", "20230101", 5);
        assert_eq!(dict.get_string("A", &key).unwrap(), Some("3".to_string()));
        assert_eq!(dict.get_string("B", &key).unwrap(), Some("4".to_string()));

        let key = DictionaryKey::new("orders", "20230101", 6);
        assert_eq!(dict.get_string("B", &key).unwrap(), None);

        let key = DictionaryKey::new("users", "20230101", 1);
        assert_eq!(dict.get_string("A", &key).unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_bad_header() {
        let err = CsvMappingSource::parse("maps", "table,day,range_id,A\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("column 2 must be 'date'"));

        let err = CsvMappingSource::parse("maps", "table,date,range_id\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DictionaryError::Load { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_range_id() {
        let data = "table,date,range_id,A\norders,20230101,five,3\n";
        let err = CsvMappingSource::parse("maps", data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("range_id 'five'"));
    }

    #[test]
    fn test_duplicate_key_last_row_wins() {
        let data = "table,date,range_id,A\no,1,1,3\no,1,1,8\n";
        let dict = CsvMappingSource::parse("maps", data.as_bytes()).unwrap();
        let key = DictionaryKey::new("o", "1", 1);
        assert_eq!(dict.get_string("A", &key).unwrap(), Some("8".to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let source = CsvMappingSource::new("/nonexistent/partition_map.csv");
        assert!(matches!(source.load("maps"), Err(DictionaryError::Io(_))));
        assert_eq!(source.describe(), "csv:/nonexistent/partition_map.csv");
    }
}
