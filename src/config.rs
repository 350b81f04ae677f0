//! Runtime configuration, read once from the environment and passed in.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DOCVAULT_DB` | `./docvault.db` |
//! | `DOCVAULT_EMBEDDING_PROVIDER` | `hashing` (`hashing`, `charstats`, `openai`, `noop`) |
//! | `DOCVAULT_EMBEDDING_DIMENSION` | `256`, hashing provider only |
//! | `DOCVAULT_EMBEDDING_API_KEY` | empty |
//! | `DOCVAULT_EMBEDDING_MODEL` | provider default |
//! | `DOCVAULT_EMBEDDING_BASE_URL` | `https://api.openai.com` |
//! | `DOCVAULT_EMBEDDING_TIMEOUT_SECS` | `30` |
//! | `DOCVAULT_PREVIEW_CHARS` | `400` |

use crate::domain::error::DomainError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "./docvault.db";
pub const DEFAULT_PREVIEW_CHARS: usize = 400;
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    Hashing,
    CharStats,
    OpenAi,
    Noop,
}

impl fmt::Display for EmbeddingProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingProviderKind::Hashing => write!(f, "hashing"),
            EmbeddingProviderKind::CharStats => write!(f, "charstats"),
            EmbeddingProviderKind::OpenAi => write!(f, "openai"),
            EmbeddingProviderKind::Noop => write!(f, "noop"),
        }
    }
}

impl FromStr for EmbeddingProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashing" => Ok(EmbeddingProviderKind::Hashing),
            "charstats" => Ok(EmbeddingProviderKind::CharStats),
            "openai" => Ok(EmbeddingProviderKind::OpenAi),
            "noop" => Ok(EmbeddingProviderKind::Noop),
            _ => Err(format!("Unknown embedding provider: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub dimension: usize,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderKind::Hashing,
            dimension: crate::infrastructure::embeddings::hashing::DEFAULT_DIMENSION,
            api_key: String::new(),
            model: None,
            base_url: None,
        }
    }
}

/// Knobs for the search service itself.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub embedding_timeout: Duration,
    /// Characters of document text returned with each hit.
    pub preview_chars: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub embedding: EmbeddingConfig,
    pub service: ServiceOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            embedding: EmbeddingConfig::default(),
            service: ServiceOptions::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let defaults = Config::default();

        let provider = match lookup("DOCVAULT_EMBEDDING_PROVIDER") {
            Some(p) => p.parse::<EmbeddingProviderKind>().map_err(DomainError::Config)?,
            None => defaults.embedding.provider,
        };
        let dimension = parse_var(&lookup, "DOCVAULT_EMBEDDING_DIMENSION")?.unwrap_or(defaults.embedding.dimension);
        let timeout_secs: Option<u64> = parse_var(&lookup, "DOCVAULT_EMBEDDING_TIMEOUT_SECS")?;
        let preview_chars = parse_var(&lookup, "DOCVAULT_PREVIEW_CHARS")?.unwrap_or(defaults.service.preview_chars);

        Ok(Config {
            db_path: lookup("DOCVAULT_DB").unwrap_or(defaults.db_path),
            embedding: EmbeddingConfig {
                provider,
                dimension,
                api_key: lookup("DOCVAULT_EMBEDDING_API_KEY").unwrap_or_default(),
                model: lookup("DOCVAULT_EMBEDDING_MODEL").filter(|m| !m.is_empty()),
                base_url: lookup("DOCVAULT_EMBEDDING_BASE_URL").filter(|u| !u.is_empty()),
            },
            service: ServiceOptions {
                embedding_timeout: timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.service.embedding_timeout),
                preview_chars,
            },
        })
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, DomainError>
where
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| DomainError::Config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::Hashing);
        assert_eq!(config.embedding.dimension, 256);
        assert_eq!(config.service.preview_chars, 400);
        assert_eq!(config.service.embedding_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("DOCVAULT_DB", "/tmp/x.db"),
            ("DOCVAULT_EMBEDDING_PROVIDER", "OpenAI"),
            ("DOCVAULT_EMBEDDING_MODEL", "text-embedding-3-large"),
            ("DOCVAULT_EMBEDDING_TIMEOUT_SECS", "5"),
            ("DOCVAULT_PREVIEW_CHARS", "80"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, "/tmp/x.db");
        assert_eq!(config.embedding.provider, EmbeddingProviderKind::OpenAi);
        assert_eq!(config.embedding.model.as_deref(), Some("text-embedding-3-large"));
        assert_eq!(config.service.embedding_timeout, Duration::from_secs(5));
        assert_eq!(config.service.preview_chars, 80);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let bad_provider = Config::from_lookup(lookup_from(&[("DOCVAULT_EMBEDDING_PROVIDER", "bert")]));
        assert!(matches!(bad_provider, Err(DomainError::Config(_))));

        let bad_number = Config::from_lookup(lookup_from(&[("DOCVAULT_PREVIEW_CHARS", "many")]));
        assert!(matches!(bad_number, Err(DomainError::Config(_))));
    }
}
