//! Core trait definition for embedding providers.
//!
//! Implemented by the `gradekit-providers` crate.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::ProviderKind;

/// A fixed-length embedding of one text.
pub type EmbeddingVector = Vec<f32>;

/// Trait for backends that turn texts into embedding vectors.
///
/// Vectors returned by one `encode` call are comparable with cosine
/// similarity. Vectors from different variants are not interchangeable.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Human-readable provider name (e.g. "ollama").
    fn name(&self) -> &str;

    /// Model identifier the vectors come from.
    fn model(&self) -> &str;

    /// Which variant this provider represents.
    fn kind(&self) -> ProviderKind;

    /// Encode every text, returning one vector per input in order.
    async fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, ProviderError>;

    /// Write any buffered state (such as new cache entries) to durable
    /// storage. Providers without such state keep the default no-op.
    async fn flush(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
