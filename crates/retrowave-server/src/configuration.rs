use crate::error::{missing_field, to_env_var, ConfigError};
use config::{Config, Environment};
use retrowave::providers::configs::{
    OpenAiProviderConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};
use retrowave::tools::{ToolConfig, DEFAULT_OEMBED_HOST, DEFAULT_SEARCH_HOST};
use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Any OpenAI-compatible chat completions gateway
#[derive(Debug, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ProviderSettings {
    pub fn into_config(self) -> OpenAiProviderConfig {
        OpenAiProviderConfig {
            base_url: self.base_url,
            api_key: self.api_key,
            model: self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolSettings {
    #[serde(default)]
    pub serpapi_key: Option<String>,
    #[serde(default = "default_search_host")]
    pub search_host: String,
    #[serde(default = "default_oembed_host")]
    pub oembed_host: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            search_host: default_search_host(),
            oembed_host: default_oembed_host(),
        }
    }
}

impl ToolSettings {
    pub fn into_config(self) -> ToolConfig {
        ToolConfig {
            serpapi_key: self.serpapi_key.filter(|key| !key.is_empty()),
            search_host: self.search_host,
            oembed_host: self.oembed_host,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    #[serde(default)]
    pub tools: ToolSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Server defaults
            .set_default("server.host", default_host())?
            .set_default("server.port", default_port())?
            // Provider defaults
            .set_default("provider.base_url", default_base_url())?
            .set_default("provider.model", default_model())?
            .set_default("provider.max_tokens", DEFAULT_MAX_TOKENS)?
            // Tool defaults
            .set_default("tools.search_host", default_search_host())?
            .set_default("tools.oembed_host", default_oembed_host())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("RETROWAVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = match config.try_deserialize() {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                let error_str = err.to_string();
                if let Some(field) = missing_field(&error_str) {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(&field),
                    });
                } else if let config::ConfigError::NotFound(field) = &err {
                    return Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    });
                }
                return Err(ConfigError::Other(err));
            }
        };

        if settings.provider.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("provider.api_key"),
            });
        }

        Ok(settings)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_search_host() -> String {
    DEFAULT_SEARCH_HOST.to_string()
}

fn default_oembed_host() -> String {
    DEFAULT_OEMBED_HOST.to_string()
}
