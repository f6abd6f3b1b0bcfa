//! On-disk embedding cache and the cache-only provider.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use gradekit_core::model::ProviderKind;
use gradekit_core::traits::{EmbeddingProvider, EmbeddingVector};
use gradekit_core::ProviderError;

#[derive(Serialize, Deserialize, Default)]
struct CacheFile {
    model: String,
    #[serde(default)]
    entries: HashMap<String, EmbeddingVector>,
}

/// Entry limit used unless the configuration sets another.
pub const DEFAULT_CAPACITY: usize = 50_000;

/// Text → vector cache for one model, backed by a JSON file.
///
/// Inserts stay in memory until [`EmbeddingCache::flush`]. Once `capacity`
/// entries are held, new texts are no longer recorded.
pub struct EmbeddingCache {
    path: PathBuf,
    model: String,
    capacity: usize,
    entries: Mutex<HashMap<String, EmbeddingVector>>,
    dirty: AtomicBool,
}

impl EmbeddingCache {
    /// Location of the cache file for `model` under `cache_dir`.
    pub fn path_for(cache_dir: &Path, model: &str) -> PathBuf {
        let file_name: String = model
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        cache_dir.join(format!("{file_name}.json"))
    }

    /// Open the cache, starting empty if the file does not exist yet.
    pub async fn open(cache_dir: &Path, model: &str) -> Result<Self, ProviderError> {
        let path = Self::path_for(cache_dir, model);
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse(&path, &content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(ProviderError::Cache(format!(
                    "failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        Ok(Self::with_entries(path, model, entries))
    }

    /// Open a cache that must already hold at least one vector.
    pub async fn open_existing(cache_dir: &Path, model: &str) -> Result<Self, ProviderError> {
        let path = Self::path_for(cache_dir, model);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ProviderError::Cache(format!("no cached embeddings at {}: {e}", path.display()))
        })?;
        let entries = parse(&path, &content)?;
        if entries.is_empty() {
            return Err(ProviderError::Cache(format!(
                "cache {} is empty",
                path.display()
            )));
        }
        Ok(Self::with_entries(path, model, entries))
    }

    fn with_entries(path: PathBuf, model: &str, entries: HashMap<String, EmbeddingVector>) -> Self {
        Self {
            path,
            model: model.to_string(),
            capacity: DEFAULT_CAPACITY,
            entries: Mutex::new(entries),
            dirty: AtomicBool::new(false),
        }
    }

    /// Limit the number of entries this cache will hold.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, text: &str) -> Option<EmbeddingVector> {
        self.lock().get(text).cloned()
    }

    /// Record `vector` for `text`. Returns `false` if the cache is full and
    /// `text` was not already present.
    pub fn insert(&self, text: String, vector: EmbeddingVector) -> bool {
        let mut entries = self.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&text) {
            return false;
        }
        entries.insert(text, vector);
        self.dirty.store(true, Ordering::Relaxed);
        true
    }

    /// Persist if anything was inserted since the last flush.
    pub async fn flush(&self) -> Result<(), ProviderError> {
        if !self.dirty.swap(false, Ordering::Relaxed) {
            return Ok(());
        }
        if let Err(e) = self.persist().await {
            self.dirty.store(true, Ordering::Relaxed);
            return Err(e);
        }
        tracing::debug!(path = %self.path().display(), entries = self.len(), "embedding cache written");
        Ok(())
    }

    /// Write the cache to disk, creating the directory if needed.
    pub async fn persist(&self) -> Result<(), ProviderError> {
        let json = {
            let entries = self.lock();
            let file = CacheFile {
                model: self.model.clone(),
                entries: entries.clone(),
            };
            serde_json::to_string(&file)
                .map_err(|e| ProviderError::Cache(format!("failed to serialize cache: {e}")))?
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ProviderError::Cache(format!("failed to create {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ProviderError::Cache(format!("failed to write {}: {e}", self.path.display())))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, EmbeddingVector>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse(path: &Path, content: &str) -> Result<HashMap<String, EmbeddingVector>, ProviderError> {
    serde_json::from_str::<CacheFile>(content)
        .map(|file| file.entries)
        .map_err(|e| ProviderError::Cache(format!("corrupt cache {}: {e}", path.display())))
}

/// Serves embeddings from the cache only; never touches the network.
pub struct CachedProvider {
    model: String,
    cache: EmbeddingCache,
}

impl CachedProvider {
    pub fn new(cache: EmbeddingCache) -> Self {
        Self {
            model: cache.model.clone(),
            cache,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for CachedProvider {
    fn name(&self) -> &str {
        "cache"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Real
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, ProviderError> {
        texts
            .iter()
            .map(|text| {
                let hit = self.cache.get(text);
                if hit.is_some() {
                    tracing::debug!(model = %self.model, "embedding cache hit");
                }
                hit.ok_or_else(|| ProviderError::CacheMiss(preview(text)))
            })
            .collect()
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 40;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
