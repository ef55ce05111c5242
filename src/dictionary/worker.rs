use std::sync::Arc;
use std::time::Duration;

use super::DictionaryRegistry;

/// Reload Worker - background task that periodically re-reads every
/// registered dictionary from its source
pub struct ReloadWorker {
    registry: Arc<DictionaryRegistry>,
    interval_secs: u64,
}

impl ReloadWorker {
    pub fn new(registry: Arc<DictionaryRegistry>, interval_secs: u64) -> Self {
        Self {
            registry,
            // A zero interval would spin.
            interval_secs: interval_secs.max(1),
        }
    }

    /// Run the reload loop
    pub async fn start(self: Arc<Self>) {
        tracing::info!("Starting dictionary reload worker (interval: {}s)", self.interval_secs);
        loop {
            tokio::time::sleep(Duration::from_secs(self.interval_secs)).await;
            self.reload_once().await;
        }
    }

    /// Reload all dictionaries once, returning how many failed
    pub async fn reload_once(&self) -> usize {
        let registry = self.registry.clone();
        // File reads block, keep them off the async threads
        match tokio::task::spawn_blocking(move || registry.reload_all()).await {
            Ok(results) => {
                let failed = results.iter().filter(|(_, r)| r.is_err()).count();
                if failed > 0 {
                    tracing::warn!(
                        "Dictionary reload cycle: {} of {} dictionaries failed",
                        failed,
                        results.len()
                    );
                } else {
                    tracing::debug!("Dictionary reload cycle complete: {} reloaded", results.len());
                }
                failed
            }
            Err(e) => {
                tracing::error!("Dictionary reload task panicked: {}", e);
                self.registry.names().len()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{CsvMappingSource, Dictionary, MappingLookup};
    use crate::sharding::table::DictionaryKey;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reload_worker_new() {
        let worker = ReloadWorker::new(Arc::new(DictionaryRegistry::new()), 0);
        assert_eq!(worker.interval_secs, 1);
    }

    #[tokio::test]
    async fn test_reload_once_empty_registry() {
        let worker = ReloadWorker::new(Arc::new(DictionaryRegistry::new()), 60);
        assert_eq!(worker.reload_once().await, 0);
    }

    #[tokio::test]
    async fn test_reload_once_picks_up_file_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "table,date,range_id,A\norders,20230101,5,3").unwrap();
        file.flush().unwrap();

        let registry = Arc::new(DictionaryRegistry::new());
        registry.register("maps", Arc::new(CsvMappingSource::new(file.path())));
        let worker = ReloadWorker::new(registry.clone(), 60);
        assert_eq!(worker.reload_once().await, 0);

        std::fs::write(file.path(), "table,date,range_id,A\norders,20230101,5,4\n").unwrap();
        assert_eq!(worker.reload_once().await, 0);

        let dict = registry.get_dictionary("maps").unwrap();
        let key = DictionaryKey::new("orders", "20230101", 5);
        assert_eq!(dict.get_string("A", &key).unwrap(), Some("4".to_string()));
        assert_eq!(registry.status()[0].generation, 2);
    }

    #[tokio::test]
    async fn test_reload_once_counts_failures() {
        let registry = Arc::new(DictionaryRegistry::new());
        registry.register("maps", Arc::new(CsvMappingSource::new("/nonexistent/map.csv")));
        let worker = ReloadWorker::new(registry, 60);
        assert_eq!(worker.reload_once().await, 1);
    }
}
