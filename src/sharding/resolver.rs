//! Version-aware shard lookup against the external partition map.

use std::sync::Arc;

use super::table::{MappingVersion, RoutingKey, ShardId};
use crate::dictionary::{DictionaryLayout, MappingLookup};
use crate::error::{LookupContext, RoutingError, RoutingResult};

/// Name of the partition map dictionary when none is configured
pub const DEFAULT_DICTIONARY: &str = "default.partition_map_dict";

/// Resolves `(table, date, range_id)` to the shard owning it under a mapping version.
///
/// Holds no mutable state; every call performs a fresh lookup and nothing is cached.
#[derive(Clone)]
pub struct ShardResolver {
    lookup: Arc<dyn MappingLookup>,
    dictionary: String,
}

impl ShardResolver {
    pub fn new(lookup: Arc<dyn MappingLookup>) -> Self {
        Self::with_dictionary(lookup, DEFAULT_DICTIONARY)
    }

    pub fn with_dictionary(lookup: Arc<dyn MappingLookup>, dictionary: impl Into<String>) -> Self {
        Self {
            lookup,
            dictionary: dictionary.into(),
        }
    }

    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    pub fn resolve(
        &self,
        table: &str,
        date: u32,
        range_id: u32,
        version: &MappingVersion,
    ) -> RoutingResult<ShardId> {
        self.resolve_key(&RoutingKey::new(table, date, range_id), version)
    }

    pub fn resolve_key(&self, key: &RoutingKey, version: &MappingVersion) -> RoutingResult<ShardId> {
        let context = LookupContext {
            table: key.table.clone(),
            date: key.date,
            range_id: key.range_id,
            version: version.to_string(),
        };

        if key.table.is_empty() {
            tracing::debug!(%context, "Empty table name, no shard can own it");
            return Err(self.not_found(context));
        }

        let dictionary = match self.lookup.get_dictionary(&self.dictionary) {
            Ok(dictionary) => dictionary,
            Err(e) => {
                tracing::debug!(dictionary = %self.dictionary, %context, error = %e, "Mapping dictionary unavailable");
                return Err(RoutingError::MappingUnavailable {
                    dictionary: self.dictionary.clone(),
                    context,
                    reason: e.to_string(),
                });
            }
        };

        if dictionary.layout() != DictionaryLayout::ComplexKeyHashed {
            tracing::debug!(%context, layout = ?dictionary.layout(), "Mapping dictionary has wrong layout");
            return Err(self.malformed(
                context,
                format!("expected a complex key hashed dictionary, found {:?}", dictionary.layout()),
            ));
        }

        let dict_key = key.dictionary_key();
        let shard = match dictionary.get_string(version.as_str(), &dict_key) {
            Ok(Some(shard)) if !shard.is_empty() => shard,
            Ok(_) => {
                tracing::debug!(%context, "No shard mapped");
                return Err(self.not_found(context));
            }
            Err(e) => {
                tracing::debug!(%context, error = %e, "Mapping attribute lookup failed");
                return Err(self.malformed(context, e.to_string()));
            }
        };

        let shard_id: ShardId = shard.trim().parse().map_err(|_| {
            tracing::debug!(%context, shard = %shard, "Mapped shard id is not numeric");
            self.malformed(
                context.clone(),
                format!("shard id '{}' is not an unsigned integer", shard),
            )
        })?;

        tracing::debug!(
            table = %key.table,
            date = key.date,
            range_id = key.range_id,
            version = %version,
            shard = shard_id,
            "Found shard"
        );
        Ok(shard_id)
    }

    fn not_found(&self, context: LookupContext) -> RoutingError {
        RoutingError::ShardNotFound {
            dictionary: self.dictionary.clone(),
            context,
        }
    }

    fn malformed(&self, context: LookupContext, reason: String) -> RoutingError {
        RoutingError::MappingMalformed {
            dictionary: self.dictionary.clone(),
            context,
            reason,
        }
    }
}
