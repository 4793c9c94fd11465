use crate::{
    config::{DEFAULT_HISTORY_CAPACITY, HISTORY_STORAGE_KEY},
    error::Result,
    models::GenerationResult,
    storage::KeyValueStore,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fixed-capacity list, newest first. Pushing onto a full list evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistory {
    entries: VecDeque<GenerationResult>,
    capacity: usize,
}

impl BoundedHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Keeps the first `capacity` entries of a newest-first list.
    pub fn from_newest_first(entries: Vec<GenerationResult>, capacity: usize) -> Self {
        let mut entries = VecDeque::from(entries);
        entries.truncate(capacity);
        Self { entries, capacity }
    }

    /// Returns the evicted entry, if any.
    pub fn push_front(&mut self, result: GenerationResult) -> Option<GenerationResult> {
        if self.capacity == 0 {
            return Some(result);
        }
        self.entries.push_front(result);
        if self.entries.len() > self.capacity {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &GenerationResult> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<GenerationResult> {
        self.entries.iter().cloned().collect()
    }
}

/// Past generations mirrored into durable storage under a single key.
///
/// The persisted list is loaded on first use, so `record` never overwrites
/// entries that were saved by an earlier run.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
    entries: Mutex<Option<BoundedHistory>>,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(storage, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(storage: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            storage,
            key: HISTORY_STORAGE_KEY.to_string(),
            capacity,
            entries: Mutex::new(None),
        }
    }

    /// Loads the persisted list. Missing or corrupt data yields an empty list.
    pub async fn initialize(&self) -> Vec<GenerationResult> {
        let mut entries = self.entries.lock().await;
        let loaded = self.load().await;
        let list = loaded.to_vec();
        *entries = Some(loaded);
        list
    }

    /// Prepends `result`, evicts beyond capacity and writes the full list back.
    pub async fn record(&self, result: GenerationResult) -> Result<Vec<GenerationResult>> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await);
        }
        let entries = guard.get_or_insert_with(|| BoundedHistory::new(self.capacity));

        log::debug!("Recording generation {} in history", result.id);
        if let Some(evicted) = entries.push_front(result) {
            log::debug!("Evicted oldest history entry {}", evicted.id);
        }

        let list = entries.to_vec();
        let serialized = serde_json::to_string(&list)?;
        self.storage.set(&self.key, &serialized).await?;

        Ok(list)
    }

    pub async fn entries(&self) -> Vec<GenerationResult> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await);
        }
        guard.as_ref().map(BoundedHistory::to_vec).unwrap_or_default()
    }

    async fn load(&self) -> BoundedHistory {
        let loaded = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<GenerationResult>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("Discarding unreadable history under '{}': {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!(
                    "Could not read history from {} storage: {}",
                    self.storage.name(),
                    e
                );
                Vec::new()
            }
        };

        let history = BoundedHistory::from_newest_first(loaded, self.capacity);
        log::debug!("Loaded {} history entries", history.len());
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageinatorError;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;

    struct UnreadableStore;

    #[async_trait]
    impl KeyValueStore for UnreadableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(ImageinatorError::StorageError("disk on fire".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "unreadable"
        }
    }

    fn result(id: usize) -> GenerationResult {
        GenerationResult {
            id: id.to_string(),
            timestamp: Utc::now(),
            prompt: format!("prompt {}", id),
            openai_image_url: Some(format!("http://x/{}.png", id)),
            anthropic_image_url: None,
        }
    }

    #[test]
    fn test_bounded_history_evicts_oldest() {
        let mut history = BoundedHistory::new(3);
        for id in 0..3 {
            assert_eq!(history.push_front(result(id)), None);
        }
        let evicted = history.push_front(result(3)).unwrap();
        assert_eq!(evicted.id, "0");
        let ids: Vec<_> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(history.len(), history.capacity());
    }

    #[tokio::test]
    async fn test_length_is_min_of_records_and_capacity() {
        let store = HistoryStore::new(Arc::new(MemoryStore::new()));
        store.initialize().await;

        for n in 1..=25 {
            let list = store.record(result(n)).await.unwrap();
            assert_eq!(list.len(), n.min(20));
            assert_eq!(list[0].id, n.to_string());
        }
    }

    #[tokio::test]
    async fn test_survives_reinitialize() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let first = HistoryStore::new(Arc::clone(&storage));
        first.initialize().await;
        let recorded = result(7);
        first.record(recorded.clone()).await.unwrap();

        let second = HistoryStore::new(storage);
        assert_eq!(second.initialize().await, vec![recorded]);
    }

    #[tokio::test]
    async fn test_corrupt_storage_yields_empty_list() {
        let storage = MemoryStore::with_entry(HISTORY_STORAGE_KEY, "not json at all");
        let store = HistoryStore::new(Arc::new(storage));
        assert!(store.initialize().await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_persisted_list_is_truncated() {
        let list: Vec<_> = (0..30).map(result).collect();
        let storage =
            MemoryStore::with_entry(HISTORY_STORAGE_KEY, serde_json::to_string(&list).unwrap());
        let store = HistoryStore::new(Arc::new(storage));

        let loaded = store.initialize().await;
        assert_eq!(loaded.len(), 20);
        assert_eq!(loaded[0].id, "0");
        assert_eq!(loaded[19].id, "19");
    }

    #[tokio::test]
    async fn test_read_error_yields_empty_list() {
        let store = HistoryStore::new(Arc::new(UnreadableStore));
        assert!(store.initialize().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_without_initialize_keeps_saved_entries() {
        let saved: Vec<_> = (0..3).map(result).collect();
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::with_entry(
            HISTORY_STORAGE_KEY,
            serde_json::to_string(&saved).unwrap(),
        ));

        let store = HistoryStore::new(Arc::clone(&storage));
        let list = store.record(result(9)).await.unwrap();
        assert_eq!(list.len(), 4);

        let reloaded = HistoryStore::new(storage).initialize().await;
        let ids: Vec<_> = reloaded.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["9", "0", "1", "2"]);
    }

    #[tokio::test]
    async fn test_entries_reads_storage_before_initialize() {
        let saved = vec![result(4)];
        let storage = MemoryStore::with_entry(
            HISTORY_STORAGE_KEY,
            serde_json::to_string(&saved).unwrap(),
        );
        let store = HistoryStore::new(Arc::new(storage));
        assert_eq!(store.entries().await, saved);
    }
}
