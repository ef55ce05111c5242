use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use super::{Dictionary, DictionarySource, MappingLookup};
use crate::error::{DictionaryError, DictionaryResult};

/// A never-loaded dictionary is not re-read on access for this long after a
/// failed load. Explicit `reload` calls always hit the source.
const LAZY_RETRY_INTERVAL: Duration = Duration::from_secs(1);

struct Entry {
    source: Option<Arc<dyn DictionarySource>>,
    current: Option<Arc<dyn Dictionary>>,
    generation: u64,
    loaded_at: Option<SystemTime>,
    last_error: Option<String>,
    failed_at: Option<Instant>,
    // Held for the whole load; one load per dictionary at a time.
    load_lock: Arc<Mutex<()>>,
}

impl Entry {
    fn new(source: Option<Arc<dyn DictionarySource>>, current: Option<Arc<dyn Dictionary>>) -> Self {
        let loaded = current.is_some();
        Self {
            source,
            current,
            generation: u64::from(loaded),
            loaded_at: loaded.then(SystemTime::now),
            last_error: None,
            failed_at: None,
            load_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Load state of one registered dictionary
#[derive(Debug, Clone, Serialize)]
pub struct DictionaryStatus {
    pub name: String,
    pub source: Option<String>,
    pub loaded: bool,
    pub generation: u64,
    pub loaded_at: Option<SystemTime>,
    pub last_error: Option<String>,
}

/// Named dictionaries with reload semantics.
///
/// A reload swaps the `Arc` of the dictionary, so lookups already holding the
/// previous generation finish against it. A failed reload keeps the previous
/// generation in place. Loads of the same dictionary never overlap: concurrent
/// first accesses wait for a single load and share its result.
#[derive(Default)]
pub struct DictionaryRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl DictionaryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dictionary loaded lazily from `source` on first access
    pub fn register(&self, name: impl Into<String>, source: Arc<dyn DictionarySource>) {
        let name = name.into();
        tracing::info!(dictionary = %name, source = %source.describe(), "Registered dictionary");
        self.entries.write().insert(name, Entry::new(Some(source), None));
    }

    /// Register an already built dictionary under its own name
    pub fn insert(&self, dictionary: Arc<dyn Dictionary>) {
        let name = dictionary.name().to_string();
        self.entries.write().insert(name, Entry::new(None, Some(dictionary)));
    }

    pub fn remove(&self, name: &str) -> bool {
        self.entries.write().remove(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Load a new generation of `name` from its source.
    ///
    /// Dictionaries inserted without a source are left untouched.
    pub fn reload(&self, name: &str) -> DictionaryResult<()> {
        let (source, load_lock) = {
            let entries = self.entries.read();
            let entry = entries
                .get(name)
                .ok_or_else(|| DictionaryError::NotFound(name.to_string()))?;
            match &entry.source {
                Some(source) => (source.clone(), entry.load_lock.clone()),
                None => return Ok(()),
            }
        };

        let _loading = load_lock.lock();
        self.load_from(name, source.as_ref())
    }

    /// Reload every dictionary that has a source
    pub fn reload_all(&self) -> Vec<(String, DictionaryResult<()>)> {
        self.names()
            .into_iter()
            .map(|name| {
                let result = self.reload(&name);
                (name, result)
            })
            .collect()
    }

    pub fn status(&self) -> Vec<DictionaryStatus> {
        let entries = self.entries.read();
        let mut status: Vec<DictionaryStatus> = entries
            .iter()
            .map(|(name, entry)| DictionaryStatus {
                name: name.clone(),
                source: entry.source.as_ref().map(|s| s.describe()),
                loaded: entry.current.is_some(),
                generation: entry.generation,
                loaded_at: entry.loaded_at,
                last_error: entry.last_error.clone(),
            })
            .collect();
        status.sort_by(|a, b| a.name.cmp(&b.name));
        status
    }

    /// Read the source and swap the result in. Callers hold the entry's load lock.
    fn load_from(&self, name: &str, source: &dyn DictionarySource) -> DictionaryResult<()> {
        // Load outside the map lock; readers keep the current generation meanwhile.
        let loaded = source.load(name);

        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| DictionaryError::NotFound(name.to_string()))?;

        match loaded {
            Ok(dictionary) => {
                entry.current = Some(dictionary);
                entry.generation += 1;
                entry.loaded_at = Some(SystemTime::now());
                entry.last_error = None;
                entry.failed_at = None;
                tracing::info!(dictionary = name, generation = entry.generation, "Loaded dictionary");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                entry.last_error = Some(reason.clone());
                entry.failed_at = Some(Instant::now());
                if entry.current.is_some() {
                    tracing::warn!(
                        dictionary = name,
                        error = %reason,
                        generation = entry.generation,
                        "Dictionary reload failed, keeping previous generation"
                    );
                } else {
                    tracing::warn!(dictionary = name, error = %reason, "Dictionary load failed");
                }
                Err(DictionaryError::Load {
                    name: name.to_string(),
                    reason,
                })
            }
        }
    }

    /// Current generation, or the error of a recent failed load
    fn current_or_recent_failure(&self, name: &str) -> DictionaryResult<Option<Arc<dyn Dictionary>>> {
        let entries = self.entries.read();
        let entry = entries
            .get(name)
            .ok_or_else(|| DictionaryError::NotFound(name.to_string()))?;

        if let Some(dictionary) = &entry.current {
            return Ok(Some(dictionary.clone()));
        }
        if entry.failed_at.is_some_and(|at| at.elapsed() < LAZY_RETRY_INTERVAL) {
            return Err(DictionaryError::Load {
                name: name.to_string(),
                reason: entry.last_error.clone().unwrap_or_default(),
            });
        }
        Ok(None)
    }
}

impl MappingLookup for DictionaryRegistry {
    fn get_dictionary(&self, name: &str) -> DictionaryResult<Arc<dyn Dictionary>> {
        if let Some(dictionary) = self.current_or_recent_failure(name)? {
            return Ok(dictionary);
        }

        let (source, load_lock) = {
            let entries = self.entries.read();
            let entry = entries
                .get(name)
                .ok_or_else(|| DictionaryError::NotFound(name.to_string()))?;
            match &entry.source {
                Some(source) => (source.clone(), entry.load_lock.clone()),
                None => {
                    return Err(DictionaryError::Load {
                        name: name.to_string(),
                        reason: "dictionary has no source".to_string(),
                    })
                }
            }
        };

        // Never loaded yet: the first caller loads, the others wait and reuse it.
        let _loading = load_lock.lock();
        if let Some(dictionary) = self.current_or_recent_failure(name)? {
            return Ok(dictionary);
        }
        self.load_from(name, source.as_ref())?;
        self.current_or_recent_failure(name)?.ok_or_else(|| DictionaryError::Load {
            name: name.to_string(),
            reason: "dictionary vanished after load".to_string(),
        })
    }
}
