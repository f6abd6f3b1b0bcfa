//! Ollama-compatible HTTP embedding provider.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use gradekit_core::model::ProviderKind;
use gradekit_core::traits::{EmbeddingProvider, EmbeddingVector};
use gradekit_core::ProviderError;

use crate::cache::EmbeddingCache;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const PROBE_TEXT: &str = "gradekit connectivity probe";

/// Transport settings for [`OllamaProvider`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub verify_ssl: bool,
    pub ca_bundle: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            ca_bundle: None,
            timeout_secs: 30,
        }
    }
}

/// Embeddings from a sentence-embedding model served over HTTP.
pub struct OllamaProvider {
    base_url: String,
    model: String,
    timeout_secs: u64,
    client: reqwest::Client,
    cache: Option<EmbeddingCache>,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, options: &HttpOptions) -> Result<Self, ProviderError> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .danger_accept_invalid_certs(!options.verify_ssl);

        if let Some(bundle) = &options.ca_bundle {
            let pem = std::fs::read(bundle).map_err(|e| {
                ProviderError::Config(format!("failed to read CA bundle {}: {e}", bundle.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ProviderError::Config(format!("invalid CA bundle {}: {e}", bundle.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout_secs: options.timeout_secs,
            client,
            cache: None,
        })
    }

    /// Serve repeated texts from `cache` and record new vectors in it.
    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Check that the endpoint is reachable and serves the model.
    pub async fn probe(&self) -> Result<(), ProviderError> {
        let vectors = self.request(&[PROBE_TEXT.to_string()]).await?;
        match vectors.first() {
            Some(v) if !v.is_empty() => Ok(()),
            _ => Err(ProviderError::InvalidResponse(
                "probe returned an empty embedding".into(),
            )),
        }
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn request(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, ProviderError> {
        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    ProviderError::NetworkError(format!(
                        "embedding endpoint not reachable at {}: {e}",
                        self.base_url
                    ))
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 404 {
            return Err(ProviderError::ModelNotFound(format!(
                "model '{}' is not available at {}",
                self.model, self.base_url
            )));
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status, message });
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse response: {e}")))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }
        Ok(parsed.embeddings)
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<EmbeddingVector>,
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Real
    }

    async fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, ProviderError> {
        let Some(cache) = &self.cache else {
            return self.request(texts).await;
        };

        let mut found: HashMap<String, EmbeddingVector> = HashMap::new();
        let mut misses: Vec<String> = Vec::new();
        for text in texts {
            if found.contains_key(text) || misses.contains(text) {
                continue;
            }
            match cache.get(text) {
                Some(vector) => {
                    found.insert(text.clone(), vector);
                }
                None => misses.push(text.clone()),
            }
        }

        if misses.is_empty() {
            tracing::debug!(model = %self.model, "all embeddings served from cache");
        } else {
            let fetched = self.request(&misses).await?;
            for (text, vector) in misses.into_iter().zip(fetched) {
                if !cache.insert(text.clone(), vector.clone()) {
                    tracing::debug!(model = %self.model, "embedding cache full, not recording");
                }
                found.insert(text, vector);
            }
        }

        texts
            .iter()
            .map(|text| {
                found
                    .get(text)
                    .cloned()
                    .ok_or_else(|| ProviderError::CacheMiss(text.clone()))
            })
            .collect()
    }

    async fn flush(&self) -> Result<(), ProviderError> {
        match &self.cache {
            Some(cache) => cache.flush().await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn successful_encoding() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .and(body_partial_json(serde_json::json!({"model": "all-minilm"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "all-minilm",
                "embeddings": [[0.1, 0.2, 0.3], [0.3, 0.2, 0.1]]
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&server.uri(), "all-minilm", &HttpOptions::default())
            .unwrap();
        let vectors = provider.encode(&texts(&["a", "b"])).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1], vec![0.3, 0.2, 0.1]);
    }

    #[tokio::test]
    async fn model_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let provider =
            OllamaProvider::new(&server.uri(), "missing", &HttpOptions::default()).unwrap();
        let err = provider.probe().await.unwrap_err();
        assert!(matches!(err, ProviderError::ModelNotFound(_)));
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider =
            OllamaProvider::new(&server.uri(), "all-minilm", &HttpOptions::default()).unwrap();
        let err = provider.encode(&texts(&["a"])).await.unwrap_err();
        assert!(matches!(err, ProviderError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn wrong_embedding_count_is_invalid() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[1.0]]})),
            )
            .mount(&server)
            .await;

        let provider =
            OllamaProvider::new(&server.uri(), "all-minilm", &HttpOptions::default()).unwrap();
        let err = provider.encode(&texts(&["a", "b"])).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_network_error() {
        // Port 9 (discard) is essentially never serving HTTP.
        let provider = OllamaProvider::new(
            "http://127.0.0.1:9",
            "all-minilm",
            &HttpOptions {
                timeout_secs: 2,
                ..HttpOptions::default()
            },
        )
        .unwrap();
        let err = provider.probe().await.unwrap_err();
        assert!(err.is_network(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn cache_avoids_repeat_requests() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[1.0, 0.0], [0.0, 1.0]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::open(dir.path(), "all-minilm").await.unwrap();
        let provider = OllamaProvider::new(&server.uri(), "all-minilm", &HttpOptions::default())
            .unwrap()
            .with_cache(cache);

        let first = provider.encode(&texts(&["x", "y"])).await.unwrap();
        let second = provider.encode(&texts(&["y", "x"])).await.unwrap();
        assert_eq!(first[0], second[1]);
        assert_eq!(first[1], second[0]);

        // nothing is written until the provider is flushed
        assert!(EmbeddingCache::open_existing(dir.path(), "all-minilm")
            .await
            .is_err());
        provider.flush().await.unwrap();

        let on_disk = EmbeddingCache::open_existing(dir.path(), "all-minilm")
            .await
            .unwrap();
        assert_eq!(on_disk.len(), 2);
    }

    #[tokio::test]
    async fn full_cache_still_returns_fetched_vectors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[1.0, 0.0], [0.0, 1.0]]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = EmbeddingCache::open(dir.path(), "all-minilm")
            .await
            .unwrap()
            .with_capacity(1);
        let provider = OllamaProvider::new(&server.uri(), "all-minilm", &HttpOptions::default())
            .unwrap()
            .with_cache(cache);

        let vectors = provider.encode(&texts(&["x", "y"])).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn flush_without_cache_is_a_no_op() {
        let provider =
            OllamaProvider::new("http://127.0.0.1:9", "all-minilm", &HttpOptions::default())
                .unwrap();
        provider.flush().await.unwrap();
    }

    #[test]
    fn missing_ca_bundle_is_config_error() {
        let result = OllamaProvider::new(
            "http://localhost:11434",
            "all-minilm",
            &HttpOptions {
                ca_bundle: Some(PathBuf::from("/no/such/bundle.pem")),
                ..HttpOptions::default()
            },
        );
        assert!(matches!(result, Err(ProviderError::Config(_))));
    }
}
