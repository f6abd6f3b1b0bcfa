//! Embedding-provider initialization cascade.
//!
//! Strategies run in a fixed order (primary, cache-only, no-SSL-verify,
//! dummy), each attempted at most once, falling through immediately on
//! failure. The first strategy that yields a provider fixes the provider for
//! the rest of the session.

use std::sync::Arc;

use async_trait::async_trait;

use gradekit_core::model::{InitStrategy, ModelState};
use gradekit_core::traits::EmbeddingProvider;
use gradekit_core::{Grader, InitializationError, ProviderError, StrategyFailure};

use crate::cache::{CachedProvider, EmbeddingCache};
use crate::config::GradekitConfig;
use crate::dummy::DummyProvider;
use crate::ollama::{HttpOptions, OllamaProvider};

/// Builds the provider for one strategy.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    async fn build(
        &self,
        strategy: InitStrategy,
    ) -> Result<Arc<dyn EmbeddingProvider>, ProviderError>;
}

/// The provider chosen by the cascade and how it was reached.
pub struct ActiveProvider {
    pub provider: Arc<dyn EmbeddingProvider>,
    pub state: ModelState,
}

impl ActiveProvider {
    pub fn into_grader(self) -> Grader {
        Grader::new(self.provider, self.state)
    }
}

/// Ordered strategy list for a configuration.
///
/// Offline and local-files-only modes drop the network strategies. With
/// verification already off the no-SSL-verify retry would repeat the primary
/// attempt, so it is dropped. The dummy strategy is present only when
/// allowed.
pub fn plan(config: &GradekitConfig) -> Vec<InitStrategy> {
    let network = config.model.network_allowed();
    let mut strategies = Vec::with_capacity(4);
    if network {
        strategies.push(InitStrategy::Primary);
    }
    strategies.push(InitStrategy::CacheOnly);
    if network && config.ssl.verify_ssl {
        strategies.push(InitStrategy::NoSslVerify);
    }
    if config.model.fallback_to_dummy {
        strategies.push(InitStrategy::Dummy);
    }
    strategies
}

/// Runs the strategy plan against a factory.
pub struct FallbackCoordinator {
    strategies: Vec<InitStrategy>,
    model_name: String,
    factory: Box<dyn ProviderFactory>,
}

impl FallbackCoordinator {
    /// Coordinator for `config`, building real providers over HTTP.
    pub fn from_config(config: &GradekitConfig) -> Self {
        Self::new(
            plan(config),
            config.model.name.clone(),
            Box::new(ConfiguredFactory::new(config.clone())),
        )
    }

    pub fn new(
        strategies: Vec<InitStrategy>,
        model_name: impl Into<String>,
        factory: Box<dyn ProviderFactory>,
    ) -> Self {
        Self {
            strategies,
            model_name: model_name.into(),
            factory,
        }
    }

    pub fn strategies(&self) -> &[InitStrategy] {
        &self.strategies
    }

    /// Try each strategy once, in order, returning the first provider built.
    pub async fn initialize(&self) -> Result<ActiveProvider, InitializationError> {
        let mut attempts = Vec::new();

        for &strategy in &self.strategies {
            match self.factory.build(strategy).await {
                Ok(provider) => {
                    let state = ModelState {
                        kind: provider.kind(),
                        model_name: self.model_name.clone(),
                        strategy,
                        fallback_used: strategy != InitStrategy::Primary,
                    };
                    tracing::info!(
                        provider = provider.name(),
                        kind = %state.kind,
                        %strategy,
                        fallback = state.fallback_used,
                        "embedding provider ready"
                    );
                    return Ok(ActiveProvider { provider, state });
                }
                Err(e) => {
                    tracing::warn!(
                        %strategy,
                        network = e.is_network(),
                        "embedding provider strategy failed: {e}"
                    );
                    attempts.push(StrategyFailure {
                        strategy,
                        message: e.to_string(),
                    });
                }
            }
        }

        Err(InitializationError { attempts })
    }
}

/// Run the cascade for `config` and wrap the result in a grading service.
pub async fn initialize_grader(config: &GradekitConfig) -> Result<Grader, InitializationError> {
    let coordinator = FallbackCoordinator::from_config(config);
    tracing::debug!(plan = ?coordinator.strategies(), "embedding provider plan");
    let active = coordinator.initialize().await?;
    Ok(active.into_grader())
}

/// Builds providers from the loaded configuration.
pub struct ConfiguredFactory {
    config: GradekitConfig,
}

impl ConfiguredFactory {
    pub fn new(config: GradekitConfig) -> Self {
        Self { config }
    }

    async fn http_provider(&self, options: HttpOptions) -> Result<OllamaProvider, ProviderError> {
        let model = &self.config.model;
        let provider = OllamaProvider::new(&model.endpoint, &model.name, &options)?;
        provider.probe().await?;

        match EmbeddingCache::open(&model.cache_dir, &model.name).await {
            Ok(cache) => Ok(provider.with_cache(cache.with_capacity(model.cache_max_entries))),
            Err(e) => {
                tracing::warn!("embedding cache unavailable, continuing without it: {e}");
                Ok(provider)
            }
        }
    }
}

#[async_trait]
impl ProviderFactory for ConfiguredFactory {
    async fn build(
        &self,
        strategy: InitStrategy,
    ) -> Result<Arc<dyn EmbeddingProvider>, ProviderError> {
        let model = &self.config.model;
        match strategy {
            InitStrategy::Primary => {
                let options = HttpOptions {
                    verify_ssl: self.config.ssl.verify_ssl,
                    ca_bundle: self.config.ssl.ca_bundle.clone(),
                    timeout_secs: model.timeout_secs,
                };
                Ok(Arc::new(self.http_provider(options).await?))
            }
            InitStrategy::CacheOnly => {
                let cache = EmbeddingCache::open_existing(&model.cache_dir, &model.name).await?;
                Ok(Arc::new(CachedProvider::new(cache)))
            }
            InitStrategy::NoSslVerify => {
                let options = HttpOptions {
                    verify_ssl: false,
                    ca_bundle: None,
                    timeout_secs: model.timeout_secs,
                };
                Ok(Arc::new(self.http_provider(options).await?))
            }
            InitStrategy::Dummy => Ok(Arc::new(DummyProvider::new(model.name.clone()))),
        }
    }
}
