//! Configuration loading.
//!
//! Read once at startup. The coordinator consumes the resulting
//! [`GradekitConfig`] and never looks at the environment again.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_MODEL: &str = "all-minilm";
const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Top-level gradekit configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GradekitConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub ssl: SslConfig,
}

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Embedding model identifier on the endpoint.
    pub name: String,
    /// Base URL of the Ollama-compatible embedding endpoint.
    pub endpoint: String,
    /// Never touch the network.
    pub offline_mode: bool,
    /// Only use previously cached embeddings.
    pub local_files_only: bool,
    /// Allow the TF-IDF dummy provider as the last resort.
    pub fallback_to_dummy: bool,
    /// Directory holding per-model embedding caches.
    pub cache_dir: PathBuf,
    /// Most texts one model's cache will record.
    pub cache_max_entries: usize,
    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            offline_mode: false,
            local_files_only: false,
            fallback_to_dummy: true,
            cache_dir: default_cache_dir(),
            cache_max_entries: crate::cache::DEFAULT_CAPACITY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ModelConfig {
    /// Whether any network strategy may run.
    pub fn network_allowed(&self) -> bool {
        !(self.offline_mode || self.local_files_only)
    }
}

/// TLS settings for the embedding endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub verify_ssl: bool,
    /// Extra PEM root certificate to trust.
    pub ca_bundle: Option<PathBuf>,
}

impl Default for SslConfig {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            ca_bundle: None,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".cache")
            .join("gradekit")
            .join("models"),
        Err(_) => PathBuf::from(".gradekit-cache"),
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Single pass over the input: substituted values are not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without an explicit path:
/// 1. `gradekit.toml` in the current directory
/// 2. `~/.config/gradekit/config.toml`
///
/// `GRADEKIT_*` environment variables override file values.
pub fn load_config_from(path: Option<&Path>) -> Result<GradekitConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradekit.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GradekitConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GradekitConfig::default(),
    };

    let mut config = apply_env_overrides(config, |key| std::env::var(key).ok());

    config.model.name = resolve_env_vars(&config.model.name);
    config.model.endpoint = resolve_env_vars(&config.model.endpoint);
    config.model.cache_dir = resolve_path(&config.model.cache_dir);
    config.ssl.ca_bundle = config.ssl.ca_bundle.as_deref().map(resolve_path);

    Ok(config)
}

/// Apply `GRADEKIT_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides(
    mut config: GradekitConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> GradekitConfig {
    if let Some(name) = lookup("GRADEKIT_MODEL_NAME") {
        config.model.name = name;
    }
    if let Some(endpoint) = lookup("GRADEKIT_ENDPOINT") {
        config.model.endpoint = endpoint;
    }
    if let Some(dir) = lookup("GRADEKIT_CACHE_DIR") {
        config.model.cache_dir = PathBuf::from(dir);
    }

    let flags: [(&str, &mut bool); 4] = [
        ("GRADEKIT_OFFLINE_MODE", &mut config.model.offline_mode),
        ("GRADEKIT_LOCAL_FILES_ONLY", &mut config.model.local_files_only),
        ("GRADEKIT_FALLBACK_DUMMY", &mut config.model.fallback_to_dummy),
        ("GRADEKIT_VERIFY_SSL", &mut config.ssl.verify_ssl),
    ];
    for (key, slot) in flags {
        let Some(raw) = lookup(key) else { continue };
        match parse_bool(&raw) {
            Some(value) => *slot = value,
            None => tracing::warn!("ignoring {key}={raw:?}: expected true or false"),
        }
    }

    config
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradekit"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn resolve_env_vars_does_not_reexpand_values() {
        std::env::set_var("_GRADEKIT_SELF_REF", "${_GRADEKIT_SELF_REF}");
        assert_eq!(
            resolve_env_vars("a/${_GRADEKIT_SELF_REF}/b"),
            "a/${_GRADEKIT_SELF_REF}/b"
        );
        std::env::remove_var("_GRADEKIT_SELF_REF");
        assert_eq!(resolve_env_vars("${UNTERMINATED"), "${UNTERMINATED");
    }

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GRADEKIT_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GRADEKIT_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GRADEKIT_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_GRADEKIT_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = GradekitConfig::default();
        assert_eq!(config.model.name, "all-minilm");
        assert!(config.model.fallback_to_dummy);
        assert!(!config.model.offline_mode);
        assert!(config.ssl.verify_ssl);
        assert!(config.model.network_allowed());
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
[model]
name = "nomic-embed-text"
offline_mode = true

[ssl]
verify_ssl = false
"#;
        let config: GradekitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.name, "nomic-embed-text");
        assert!(config.model.offline_mode);
        assert!(config.model.fallback_to_dummy);
        assert_eq!(config.model.endpoint, "http://localhost:11434");
        assert!(!config.ssl.verify_ssl);
        assert!(!config.model.network_allowed());
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("GRADEKIT_MODEL_NAME", "mxbai-embed-large"),
            ("GRADEKIT_OFFLINE_MODE", "TRUE"),
            ("GRADEKIT_FALLBACK_DUMMY", "false"),
            ("GRADEKIT_VERIFY_SSL", "maybe"),
            ("GRADEKIT_CACHE_DIR", "/tmp/gk-cache"),
        ]
        .into_iter()
        .collect();
        let config = apply_env_overrides(GradekitConfig::default(), |k| {
            env.get(k).map(|v| v.to_string())
        });
        assert_eq!(config.model.name, "mxbai-embed-large");
        assert!(config.model.offline_mode);
        assert!(!config.model.fallback_to_dummy);
        // invalid boolean keeps the previous value
        assert!(config.ssl.verify_ssl);
        assert_eq!(config.model.cache_dir, PathBuf::from("/tmp/gk-cache"));
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradekit.toml");
        std::fs::write(&path, "[model]\nendpoint = \"http://embed.internal:8080\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert!(config.model.endpoint.starts_with("http://embed.internal"));
    }
}
