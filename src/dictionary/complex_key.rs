use std::collections::HashMap;

use super::{Dictionary, DictionaryLayout};
use crate::error::{DictionaryError, DictionaryResult};
use crate::sharding::table::DictionaryKey;

/// In-memory dictionary keyed by `(table, date, range_id)`.
///
/// Each mapping version is one string attribute column.
#[derive(Debug, Clone)]
pub struct ComplexKeyHashedDictionary {
    name: String,
    attributes: Vec<String>,
    rows: HashMap<DictionaryKey, Vec<Option<String>>>,
}

impl ComplexKeyHashedDictionary {
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            attributes,
            rows: HashMap::new(),
        }
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn attribute_index(&self, attribute: &str) -> DictionaryResult<usize> {
        self.attributes
            .iter()
            .position(|a| a == attribute)
            .ok_or_else(|| DictionaryError::UnknownAttribute {
                dictionary: self.name.clone(),
                attribute: attribute.to_string(),
            })
    }

    /// Set one attribute of a key, creating the row if needed.
    pub fn insert(
        &mut self,
        key: DictionaryKey,
        attribute: &str,
        value: impl Into<String>,
    ) -> DictionaryResult<()> {
        let idx = self.attribute_index(attribute)?;
        let width = self.attributes.len();
        let row = self.rows.entry(key).or_insert_with(|| vec![None; width]);
        row[idx] = Some(value.into());
        Ok(())
    }

    /// Replace a whole row. Returns true if the key was already present.
    pub fn insert_row(&mut self, key: DictionaryKey, mut values: Vec<Option<String>>) -> bool {
        values.resize(self.attributes.len(), None);
        self.rows.insert(key, values).is_some()
    }
}

impl Dictionary for ComplexKeyHashedDictionary {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> DictionaryLayout {
        DictionaryLayout::ComplexKeyHashed
    }

    fn get_string(&self, attribute: &str, key: &DictionaryKey) -> DictionaryResult<Option<String>> {
        let idx = self.attribute_index(attribute)?;
        Ok(self.rows.get(key).and_then(|row| row[idx].clone()))
    }
}
