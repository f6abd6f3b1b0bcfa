//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use gradekit_core::model::ProviderKind;
use gradekit_core::traits::{EmbeddingProvider, EmbeddingVector};
use gradekit_core::ProviderError;

/// A mock embedding provider for exercising the grading service and the
/// fallback cascade without a model.
///
/// Returns configured vectors by exact text match, or a default vector.
pub struct MockProvider {
    /// Map of text → vector.
    vectors: HashMap<String, EmbeddingVector>,
    /// Vector for texts not in the map.
    default_vector: EmbeddingVector,
    /// When set, every `encode` fails with a network error.
    failing: bool,
    kind: ProviderKind,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last batch received.
    last_batch: Mutex<Option<Vec<String>>>,
}

impl MockProvider {
    /// Create a new mock provider with the given text→vector mappings.
    pub fn new(vectors: HashMap<String, EmbeddingVector>) -> Self {
        Self {
            vectors,
            default_vector: vec![1.0, 0.0, 0.0],
            failing: false,
            kind: ProviderKind::Real,
            call_count: AtomicU32::new(0),
            last_batch: Mutex::new(None),
        }
    }

    /// Create a mock that returns the same vector for every text.
    pub fn with_fixed_vector(vector: EmbeddingVector) -> Self {
        Self {
            default_vector: vector,
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock whose every call fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new(HashMap::new())
        }
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last batch passed to `encode`.
    pub fn last_batch(&self) -> Option<Vec<String>> {
        self.last_batch
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl EmbeddingProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, ProviderError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_batch.lock().unwrap_or_else(|e| e.into_inner()) = Some(texts.to_vec());

        if self.failing {
            return Err(ProviderError::NetworkError("mock provider offline".into()));
        }

        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| self.default_vector.clone())
            })
            .collect())
    }
}
