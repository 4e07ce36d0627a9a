//! Client configuration.
//!
//! Loaded from the environment:
//!
//! | variable | default |
//! |----------|---------|
//! | `ELASTICSEARCH_URL` | `http://localhost:9200` |
//! | `ELASTICSEARCH_USERNAME` / `ELASTICSEARCH_PASSWORD` | unset (no auth) |
//! | `ELASTICSEARCH_VERSION` | unset (probe the cluster) |
//! | `ELASTICSEARCH_TIMEOUT_SECS` | `30` |
//! | `ELASTICSEARCH_MAX_RETRIES` | `2` |

use std::time::Duration;

use esrole_core::{ProviderError, ProviderResult};

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Skips probing when set (e.g. `"7"` or `"6.8.23"`).
    pub version: Option<String>,
    pub timeout: Duration,
    /// Retries for requests that never reached the cluster. HTTP statuses are never retried.
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            username: None,
            password: None,
            version: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> ProviderResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> ProviderResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("ELASTICSEARCH_URL").unwrap_or_else(|| {
            tracing::info!(url = DEFAULT_URL, "ELASTICSEARCH_URL not set; using default");
            DEFAULT_URL.to_string()
        });

        let timeout = match get("ELASTICSEARCH_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().map_err(|e| {
                ProviderError::config(format!("ELASTICSEARCH_TIMEOUT_SECS '{raw}': {e}"))
            })?),
            None => DEFAULT_TIMEOUT,
        };

        let max_retries = match get("ELASTICSEARCH_MAX_RETRIES") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ProviderError::config(format!("ELASTICSEARCH_MAX_RETRIES '{raw}': {e}"))
            })?,
            None => DEFAULT_MAX_RETRIES,
        };

        let config = Self {
            url,
            username: get("ELASTICSEARCH_USERNAME"),
            password: get("ELASTICSEARCH_PASSWORD"),
            version: get("ELASTICSEARCH_VERSION"),
            timeout,
            max_retries,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ProviderResult<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ProviderError::config(format!(
                "url '{}' must start with http:// or https://",
                self.url
            )));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ProviderError::config("password set without username"));
        }
        if self.username.is_some() && self.url.starts_with("http://") {
            tracing::warn!(url = %self.url, "credentials will be sent over plain http");
        }
        Ok(())
    }

    pub fn credentials(&self) -> Option<(&str, Option<&str>)> {
        self.username
            .as_deref()
            .map(|user| (user, self.password.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ELASTICSEARCH_URL", "https://es.internal:9200"),
            ("ELASTICSEARCH_USERNAME", "elastic"),
            ("ELASTICSEARCH_PASSWORD", "changeme"),
            ("ELASTICSEARCH_VERSION", "6.8.23"),
            ("ELASTICSEARCH_TIMEOUT_SECS", "5"),
            ("ELASTICSEARCH_MAX_RETRIES", "0"),
        ]))
        .unwrap();

        assert_eq!(config.url, "https://es.internal:9200");
        assert_eq!(config.credentials(), Some(("elastic", Some("changeme"))));
        assert_eq!(config.version.as_deref(), Some("6.8.23"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = ClientConfig::from_lookup(lookup(&[("ELASTICSEARCH_VERSION", "  ")])).unwrap();
        assert_eq!(config.version, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("ELASTICSEARCH_URL", "localhost:9200")])),
            Err(ProviderError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("ELASTICSEARCH_TIMEOUT_SECS", "soon")])),
            Err(ProviderError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("ELASTICSEARCH_PASSWORD", "x")])),
            Err(ProviderError::Config(_))
        ));
    }
}
