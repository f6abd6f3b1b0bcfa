//! Embedding provider error types.
//!
//! Defined in `gradekit-core` so the grading service can recover from
//! per-call failures and the fallback coordinator can record why each
//! initialization strategy was abandoned.

use thiserror::Error;

use crate::model::InitStrategy;

/// Errors that can occur when constructing or calling an embedding provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested embedding model is not available on the endpoint.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The endpoint returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The endpoint answered but the body was not usable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A cache-only provider was asked for a text it has never seen.
    #[error("embedding cache miss for {0:?}")]
    CacheMiss(String),

    /// The on-disk embedding cache could not be read or written.
    #[error("embedding cache error: {0}")]
    Cache(String),

    /// The provider could not be built from its settings (bad TLS bundle,
    /// unbuildable HTTP client).
    #[error("invalid provider configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Returns `true` if this error came from the transport layer rather
    /// than from the model or the cache.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ProviderError::NetworkError(_) | ProviderError::Timeout(_)
        )
    }
}

/// A single failed initialization attempt.
#[derive(Debug, Clone)]
pub struct StrategyFailure {
    pub strategy: InitStrategy,
    pub message: String,
}

/// No embedding provider could be constructed and the dummy fallback is
/// disabled. Carries every attempt in the order it was made.
#[derive(Debug, Clone, Error)]
#[error("{}", describe_attempts(.attempts))]
pub struct InitializationError {
    pub attempts: Vec<StrategyFailure>,
}

fn describe_attempts(attempts: &[StrategyFailure]) -> String {
    if attempts.is_empty() {
        return "no embedding provider strategy is enabled (dummy fallback disabled)".into();
    }
    let mut text = String::from("failed to initialize an embedding provider");
    for attempt in attempts {
        text.push_str(&format!("; {}: {}", attempt.strategy, attempt.message));
    }
    text
}
