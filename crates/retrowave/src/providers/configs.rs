pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: i32 = 4096;

/// Settings for any endpoint speaking the OpenAI chat-completions protocol,
/// including AI gateways that proxy it
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    /// Base URL up to and including the API version, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    /// Overall request timeout; the HTTP client default applies when unset
    pub request_timeout_secs: Option<u64>,
}

impl OpenAiProviderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_tokens: Some(DEFAULT_MAX_TOKENS),
            request_timeout_secs: None,
        }
    }
}
