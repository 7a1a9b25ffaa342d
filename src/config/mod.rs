use crate::provider::CHAT_COMPLETIONS_PATH;
use crate::provider::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Overall request timeout when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Client settings. Embeddable in a host's config file; loading that file is
/// the host's job.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_key: String,
    /// Provider root, e.g. `https://api.deepseek.com`.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Whole-exchange timeout in milliseconds, body included. Default: 300 s.
    pub timeout_ms: Option<u64>,
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            model: String::new(),
            timeout_ms: None,
            transport: TransportConfig::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("transport", &self.transport)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.timeout_ms = Some(millis.max(1));
        self
    }

    #[must_use]
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_ms
            .filter(|&ms| ms > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis)
    }

    /// Chat completions URL: base URL without trailing `/`, plus `/v1/chat/completions`.
    pub fn endpoint(&self) -> String {
        format!(
            "{}{CHAT_COMPLETIONS_PATH}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// Check required fields before a client is built.
    pub fn validate(&self) -> Result<(), Error> {
        if self.api_key.is_empty() {
            return Err(Error::Config("API key is required".into()));
        }
        if self.base_url.is_empty() {
            return Err(Error::Config("base URL is required".into()));
        }
        if self.model.is_empty() {
            return Err(Error::Config("model name is required".into()));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }
}

/// Connection pool tuning for the client's own transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub connect_timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 10,
            pool_idle_timeout_secs: 90,
        }
    }
}

impl TransportConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_fields() {
        let cases = [
            ClientConfig::new("", "https://api.deepseek.com", "deepseek-chat"),
            ClientConfig::new("sk-test", "", "deepseek-chat"),
            ClientConfig::new("sk-test", "https://api.deepseek.com", ""),
        ];
        for config in cases {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_validate_base_url() {
        let config = ClientConfig::new("sk-test", "not a url", "m");
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ClientConfig::new("sk-test", "ftp://example.com", "m");
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = ClientConfig::new("sk-test", "http://localhost:8000", "m");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_timeout() {
        let config = ClientConfig::new("k", "https://api.openai.com", "gpt-4o");
        assert_eq!(config.timeout(), Duration::from_secs(300));

        let config = config.with_timeout(Duration::from_secs(30));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_sub_second_timeout_kept() {
        let config = ClientConfig::new("k", "https://api.openai.com", "gpt-4o");
        for millis in [500, 1500, 2250] {
            let timeout = Duration::from_millis(millis);
            assert_eq!(config.clone().with_timeout(timeout).timeout(), timeout);
        }

        let config = config.with_timeout(Duration::from_micros(10));
        assert_eq!(config.timeout(), Duration::from_millis(1));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("sk-secret", "https://api.openai.com", "gpt-4o");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            api_key = "sk-test"
            base_url = "https://api.deepseek.com"
            model = "deepseek-chat"
            timeout_ms = 120000

            [transport]
            pool_max_idle_per_host = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "deepseek-chat");
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert_eq!(config.transport.pool_max_idle_per_host, 4);
        // Unset fields keep their defaults
        assert_eq!(config.transport.pool_idle_timeout_secs, 90);
        assert_eq!(config.transport.connect_timeout_secs, 10);
    }
}
