use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted config key to the environment variable that sets it
pub fn to_env_var(field: &str) -> String {
    format!("RETROWAVE_{}", field.replace('.', "__").to_uppercase())
}

/// The dotted path named by a serde "missing field `x`" message
pub(crate) fn missing_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("missing field `")?;
    let (field, rest) = rest.split_once('`')?;
    match rest
        .trim()
        .strip_prefix("for key `")
        .and_then(|key| key.split('`').next())
    {
        Some(key) => Some(format!("{}.{}", key, field)),
        None => Some(field.to_string()),
    }
}
