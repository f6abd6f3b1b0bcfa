//! gradekit-providers: embedding provider integrations.
//!
//! Implements the `EmbeddingProvider` trait for an Ollama-compatible HTTP
//! endpoint, an on-disk cache, and an offline TF-IDF stand-in, and chains
//! them into the initialization fallback cascade.

pub mod cache;
pub mod config;
pub mod dummy;
pub mod fallback;
pub mod mock;
pub mod ollama;

pub use config::{load_config_from, GradekitConfig};
pub use fallback::{initialize_grader, ActiveProvider, FallbackCoordinator, ProviderFactory};
pub use gradekit_core::error::ProviderError;
