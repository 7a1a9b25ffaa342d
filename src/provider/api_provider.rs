//! Named provider presets.

use crate::config::ClientConfig;
use crate::provider::error::Error;

/// Hosted providers with known endpoints.
///
/// Self-hosted servers need no preset: build a [`ClientConfig`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    DeepSeek,
    OpenAI,
}

impl Provider {
    pub const ALL: &'static [Provider] = &[Provider::DeepSeek, Provider::OpenAI];

    /// Lowercase ID for config storage.
    pub fn id(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "deepseek",
            Provider::OpenAI => "openai",
        }
    }

    /// Parse provider from ID string.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "deepseek" => Some(Provider::DeepSeek),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    /// Display name for the provider.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "DeepSeek",
            Provider::OpenAI => "OpenAI",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }

    /// Model used when the caller names none. `OpenAI` has no default.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Provider::DeepSeek => Some("deepseek-chat"),
            Provider::OpenAI => None,
        }
    }

    /// Build a validated config, filling in this provider's defaults.
    pub fn client_config(
        &self,
        api_key: impl Into<String>,
        model: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<ClientConfig, Error> {
        let model = model
            .filter(|m| !m.is_empty())
            .or(self.default_model())
            .ok_or_else(|| Error::Config(format!("model name is required for {}", self.name())))?;
        let base_url = base_url
            .filter(|u| !u.is_empty())
            .unwrap_or(self.default_base_url());

        let config = ClientConfig::new(api_key, base_url, model);
        config.validate()?;
        Ok(config)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
